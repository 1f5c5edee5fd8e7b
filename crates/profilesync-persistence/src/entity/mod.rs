//! SeaORM entity definitions
//!
//! `service_profile` is the synchronized aggregate; the remaining tables form
//! the minimal directory it references (organizations, network-servers and
//! organization memberships).

pub mod prelude;

pub mod network_server;
pub mod organization;
pub mod organization_user;
pub mod service_profile;
pub mod user;
