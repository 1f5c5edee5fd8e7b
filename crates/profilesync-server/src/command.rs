//! Command execution against an opened [`AppContext`]

use profilesync_api::{PolicyDocument, ServiceProfile, validate_service_profile};
use profilesync_common::error::{
    CONSTRAINT_VIOLATION, DATA_ACCESS_ERROR, PARAMETER_VALIDATE_ERROR, RESOURCE_NOT_FOUND,
};
use profilesync_common::{ErrorCode, ProfileSyncError};
use profilesync_persistence::{DirectoryPersistence, StoreError};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::AsyncReadExt;
use tracing::warn;
use validator::ValidationErrors;

use crate::cli::{Command, DirectoryCommand, ScopeArgs};
use crate::model::Result;
use crate::startup::AppContext;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("invalid input: {0}")]
    Input(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Sync(#[from] ProfileSyncError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CommandError {
    fn error_code(&self) -> ErrorCode<'static> {
        match self {
            CommandError::Input(_) | CommandError::Validation(_) => PARAMETER_VALIDATE_ERROR,
            CommandError::Sync(e) => e.error_code(),
            CommandError::Store(StoreError::NotFound) => RESOURCE_NOT_FOUND,
            CommandError::Store(StoreError::ConstraintViolation(_)) => CONSTRAINT_VIOLATION,
            CommandError::Store(_) => DATA_ACCESS_ERROR,
        }
    }

    pub fn to_result(&self) -> Result<String> {
        Result::from_code(self.error_code(), self)
    }

    /// 2 for bad input, 3 when the two stores diverged, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Input(_) | CommandError::Validation(_) => 2,
            CommandError::Sync(e) if e.is_partial_commit() => 3,
            _ => 1,
        }
    }
}

/// Service-profile document accepted by `create` and `update`.
///
/// On update, omitted `organizationId`/`networkServerId` keep the stored values.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub organization_id: Option<i64>,
    pub network_server_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub policy: PolicyDocument,
}

impl ProfileInput {
    pub fn parse(raw: &str) -> std::result::Result<Self, CommandError> {
        serde_json::from_str(raw).map_err(|e| CommandError::Input(e.to_string()))
    }

    pub fn into_new_profile(self) -> ServiceProfile {
        ServiceProfile::new(
            self.organization_id.unwrap_or_default(),
            self.network_server_id.unwrap_or_default(),
            self.name,
            self.policy,
        )
    }

    pub fn apply_to(self, profile: &mut ServiceProfile) {
        if let Some(id) = self.organization_id {
            profile.organization_id = id;
        }
        if let Some(id) = self.network_server_id {
            profile.network_server_id = id;
        }
        profile.name = self.name;
        profile.policy = self.policy;
    }
}

async fn read_input(source: &str) -> std::result::Result<ProfileInput, CommandError> {
    let raw = if source == "-" {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .map_err(|e| CommandError::Input(format!("stdin: {}", e)))?;
        raw
    } else {
        tokio::fs::read_to_string(source)
            .await
            .map_err(|e| CommandError::Input(format!("{}: {}", source, e)))?
    };
    ProfileInput::parse(&raw)
}

pub async fn create(
    ctx: &AppContext,
    input: ProfileInput,
) -> std::result::Result<ServiceProfile, CommandError> {
    let mut profile = input.into_new_profile();
    validate_service_profile(&profile)?;
    ctx.service.create(&mut profile).await?;
    Ok(profile)
}

/// Read-for-update, apply the input, write back under the same row lock
pub async fn update(
    ctx: &AppContext,
    id: uuid::Uuid,
    input: ProfileInput,
) -> std::result::Result<ServiceProfile, CommandError> {
    let locked = ctx.service.get_for_update(id).await?;

    let mut profile = locked.profile().clone();
    input.apply_to(&mut profile);
    if let Err(e) = validate_service_profile(&profile) {
        if let Err(release_err) = locked.release().await {
            warn!(profile_id = %id, error = %release_err, "Releasing row lock failed");
        }
        return Err(e.into());
    }

    ctx.service.update_locked(locked, &mut profile).await?;
    Ok(profile)
}

pub async fn execute(ctx: &AppContext, command: Command) -> std::result::Result<Value, CommandError> {
    let output = match command {
        Command::Migrate => {
            return Err(CommandError::Input(
                "migrate runs before any store is opened".to_string(),
            ));
        }
        Command::Create(args) => {
            let input = read_input(&args.input).await?;
            json!(create(ctx, input).await?)
        }
        Command::Get { id } => json!(ctx.service.get(id).await?),
        Command::Update { id, input } => {
            let input = read_input(&input.input).await?;
            json!(update(ctx, id, input).await?)
        }
        Command::Delete { id } => {
            ctx.service.delete(id).await?;
            json!({ "id": id })
        }
        Command::List {
            scope,
            limit,
            offset,
        } => json!(list(ctx, scope, limit, offset).await?),
        Command::Count { scope: args } => json!(count(ctx, args).await?),
        Command::Directory(command) => directory(ctx, command).await?,
    };
    Ok(output)
}

async fn list(
    ctx: &AppContext,
    args: ScopeArgs,
    limit: u64,
    offset: u64,
) -> std::result::Result<Vec<ServiceProfile>, CommandError> {
    Ok(match (args.organization_id, args.username) {
        (Some(id), _) => ctx.query.list_for_organization(id, limit, offset).await?,
        (None, Some(username)) => ctx.query.list_for_user(&username, limit, offset).await?,
        (None, None) => ctx.query.list_all(limit, offset).await?,
    })
}

async fn count(ctx: &AppContext, args: ScopeArgs) -> std::result::Result<u64, CommandError> {
    Ok(match (args.organization_id, args.username) {
        (Some(id), _) => ctx.query.count_for_organization(id).await?,
        (None, Some(username)) => ctx.query.count_for_user(&username).await?,
        (None, None) => ctx.query.count_all().await?,
    })
}

async fn directory(
    ctx: &AppContext,
    command: DirectoryCommand,
) -> std::result::Result<Value, CommandError> {
    let store = &ctx.store;
    Ok(match command {
        DirectoryCommand::Organization { name } => json!(store.organization_create(&name).await?),
        DirectoryCommand::NetworkServer { name, server } => {
            json!(store.network_server_create(&name, &server).await?)
        }
        DirectoryCommand::User { username } => json!(store.user_create(&username).await?),
        DirectoryCommand::Member {
            organization_id,
            user_id,
            admin,
        } => {
            store
                .organization_user_create(organization_id, user_id, admin)
                .await?;
            json!({ "organizationId": organization_id, "userId": user_id, "isAdmin": admin })
        }
    })
}
