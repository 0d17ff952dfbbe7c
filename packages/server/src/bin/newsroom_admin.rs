//! Operator CLI for user administration.
//!
//! Acts directly on the database with operator authority, so it can bootstrap
//! the first administrator. Output is one JSON object per invocation.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use newsroom_core::common::ProfileId;
use newsroom_core::config::Config;
use newsroom_core::domains::auth::JwtService;
use newsroom_core::domains::profiles::actions::attach_roles;
use newsroom_core::domains::profiles::{Role, UserWithRoles};
use newsroom_core::kernel::{BaseContentStore, PostgresContentStore};

#[derive(Parser)]
#[command(name = "newsroom_admin")]
#[command(about = "Newsroom user administration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    User,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::User => Role::User,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Grant a role to an existing user
    GrantRole {
        #[arg(long)]
        user: Uuid,
        #[arg(long, value_enum)]
        role: RoleArg,
    },

    /// Revoke a role from a user
    RevokeRole {
        #[arg(long)]
        user: Uuid,
        #[arg(long, value_enum)]
        role: RoleArg,
    },

    /// List users with their roles
    ListUsers,

    /// Mint a bearer token signed with JWT_SECRET (development)
    MintToken {
        #[arg(long)]
        user: Option<Uuid>,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
    },
}

// ============================================================================
// JSON Response Types
// ============================================================================

#[derive(Serialize)]
struct UserInfo {
    id: Uuid,
    display_name: String,
    email: String,
    roles: Vec<String>,
}

impl From<UserWithRoles> for UserInfo {
    fn from(user: UserWithRoles) -> Self {
        Self {
            id: user.profile.id.into_uuid(),
            display_name: user.profile.display_name,
            email: user.profile.email,
            roles: user.roles.iter().map(|r| r.to_string()).collect(),
        }
    }
}

#[derive(Serialize)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    users: Option<Vec<UserInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl Response {
    fn ok() -> Self {
        Self {
            success: true,
            message: None,
            user: None,
            users: None,
            token: None,
        }
    }
}

fn output(resp: Response) -> Result<()> {
    println!("{}", serde_json::to_string(&resp)?);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::GrantRole { user, role } => cmd_grant(&config, user, role.into()).await,
        Commands::RevokeRole { user, role } => cmd_revoke(&config, user, role.into()).await,
        Commands::ListUsers => cmd_list(&config).await,
        Commands::MintToken { user, email, name } => {
            cmd_mint(&config, user.unwrap_or_else(Uuid::now_v7), &email, name.as_deref())
        }
    }
}

async fn get_store(config: &Config) -> Result<PostgresContentStore> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(config.request_timeout)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    Ok(PostgresContentStore::new(pool))
}

async fn load_user(store: &PostgresContentStore, id: ProfileId) -> Result<UserWithRoles> {
    let Some(profile) = store.find_profile(id).await? else {
        bail!("no user with id {} (users appear after their first sign-in)", id);
    };
    let roles = store.roles_for(id).await?;
    Ok(UserWithRoles { profile, roles })
}

async fn cmd_grant(config: &Config, user: Uuid, role: Role) -> Result<()> {
    let store = get_store(config).await?;
    let id = ProfileId::from_uuid(user);
    load_user(&store, id).await?;

    store.grant_role(id, role).await?;
    tracing::info!(profile_id = %id, %role, "Granted role from CLI");

    output(Response {
        message: Some(format!("granted {}", role)),
        user: Some(load_user(&store, id).await?.into()),
        ..Response::ok()
    })
}

async fn cmd_revoke(config: &Config, user: Uuid, role: Role) -> Result<()> {
    let store = get_store(config).await?;
    let id = ProfileId::from_uuid(user);
    load_user(&store, id).await?;

    let removed = store.revoke_role(id, role).await?;
    tracing::info!(profile_id = %id, %role, removed, "Revoked role from CLI");

    output(Response {
        message: Some(if removed {
            format!("revoked {}", role)
        } else {
            format!("user did not hold {}", role)
        }),
        user: Some(load_user(&store, id).await?.into()),
        ..Response::ok()
    })
}

async fn cmd_list(config: &Config) -> Result<()> {
    let store = get_store(config).await?;
    let (profiles, assignments) =
        tokio::try_join!(store.list_profiles(), store.list_role_assignments())?;

    output(Response {
        users: Some(
            attach_roles(profiles, assignments)
                .into_iter()
                .map(UserInfo::from)
                .collect(),
        ),
        ..Response::ok()
    })
}

fn cmd_mint(config: &Config, user: Uuid, email: &str, name: Option<&str>) -> Result<()> {
    let jwt = JwtService::new(&config.jwt_secret, config.jwt_issuer.clone());
    let token = jwt.create_token(user, email, name)?;

    output(Response {
        message: Some(format!("token for {} valid for 24h", user)),
        token: Some(token),
        ..Response::ok()
    })
}
