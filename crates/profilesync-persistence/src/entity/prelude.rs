pub use super::network_server::Entity as NetworkServer;
pub use super::organization::Entity as Organization;
pub use super::organization_user::Entity as OrganizationUser;
pub use super::service_profile::Entity as ServiceProfile;
pub use super::user::Entity as User;
