//! Command line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use profilesync_common::DEFAULT_PAGE_LIMIT;
use uuid::Uuid;

pub const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";

/// Keep local service profiles and network-server policies in step
#[derive(Debug, Parser)]
#[command(name = "profilesync-server", version)]
pub struct Cli {
    /// Configuration file
    #[arg(short = 'c', long = "config", global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,
    /// Persistence mode: external_db or embedded
    #[arg(short = 'm', long = "mode", global = true)]
    pub mode: Option<String>,
    #[arg(long = "db-url", env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,
    /// RocksDB directory for embedded mode
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,
    /// Network-server gRPC address
    #[arg(long = "ns-addr", global = true)]
    pub network_server_addr: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply pending schema migrations (external_db mode)
    Migrate,
    /// Create a service profile from a JSON document
    Create(InputArgs),
    /// Read a service profile, policy included
    Get { id: Uuid },
    /// Replace the name and policy of a service profile
    Update {
        id: Uuid,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Delete a service profile
    Delete { id: Uuid },
    /// List service profiles
    List {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u64,
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
    /// Count service profiles
    Count {
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Manage organizations, network-servers and users
    #[command(subcommand)]
    Directory(DirectoryCommand),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// JSON file holding the profile, `-` for stdin
    #[arg(short = 'i', long = "input", default_value = "-")]
    pub input: String,
}

#[derive(Debug, Args)]
pub struct ScopeArgs {
    #[arg(long = "organization-id", conflicts_with = "username")]
    pub organization_id: Option<i64>,
    /// Profiles of every organization the user belongs to
    #[arg(long)]
    pub username: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum DirectoryCommand {
    Organization {
        #[arg(long)]
        name: String,
    },
    NetworkServer {
        #[arg(long)]
        name: String,
        #[arg(long)]
        server: String,
    },
    User {
        #[arg(long)]
        username: String,
    },
    /// Add a user to an organization
    Member {
        #[arg(long = "organization-id")]
        organization_id: i64,
        #[arg(long = "user-id")]
        user_id: i64,
        #[arg(long)]
        admin: bool,
    },
}
