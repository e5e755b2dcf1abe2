//! `workflow-sharing` CLI entry-point.
//!
//! Available sub-commands:
//! - `migrate` — run pending database migrations.
//! - `cloud`   — query the cloud admin service (plan, usage, login code).
//! - `sharing` — inspect owner sharings or hand them to the instance owner.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cloud::{CloudClientConfig, CloudPlansClient, RestApiContext};
use db::pool::PoolConfig;
use db::repository::{roles, shared_workflows, users};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "workflow-sharing",
    about = "Workflow sharing and cloud plan administration",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run pending database migrations.
    Migrate {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Query the cloud admin service and print the JSON body.
    Cloud {
        /// REST root of the instance, e.g. `https://acme.example.cloud/rest`.
        #[arg(long, env = "CLOUD_BASE_URL")]
        base_url: String,
        /// Value for the `push-ref` header.
        #[arg(long)]
        push_ref: Option<String>,
        /// Request timeout in seconds.
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
        #[command(subcommand)]
        query: CloudQuery,
    },
    /// Inspect and transfer workflow sharings.
    Sharing {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
        #[command(subcommand)]
        action: SharingAction,
    },
}

#[derive(Subcommand)]
enum CloudQuery {
    /// Current plan (`/admin/cloud-plan`).
    Plan,
    /// Current usage against the plan limits (`/cloud/limits`).
    Usage,
    /// One-time dashboard login code (`/admin/auth/login/code`).
    LoginCode,
}

#[derive(Subcommand)]
enum SharingAction {
    /// List the owner sharing of each given workflow.
    Owners {
        #[arg(required = true)]
        workflow_ids: Vec<Uuid>,
    },
    /// Reassign every workflow owned by someone else to the instance owner.
    TransferToOwner,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Migrate { database_url } => {
            let pool_config = PoolConfig { max_connections: 2, ..Default::default() };
            let pool = db::pool::create_pool(&database_url, &pool_config)
                .await
                .context("failed to connect to database")?;
            db::pool::run_migrations(&pool).await.context("migration failed")?;
            info!("Migrations applied successfully");
        }
        Command::Cloud { base_url, push_ref, timeout_secs, query } => {
            let config = CloudClientConfig::default()
                .with_timeout(std::time::Duration::from_secs(timeout_secs));
            let client = CloudPlansClient::new(&config)?;
            let mut ctx = RestApiContext::new(base_url);
            if let Some(push_ref) = push_ref {
                ctx = ctx.with_push_ref(push_ref);
            }

            let body = match query {
                CloudQuery::Plan => serde_json::to_value(client.get_current_plan(&ctx).await?)?,
                CloudQuery::Usage => serde_json::to_value(client.get_current_usage(&ctx).await?)?,
                CloudQuery::LoginCode => serde_json::to_value(client.get_login_code(&ctx).await?)?,
            };
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Command::Sharing { database_url, action } => {
            let pool_config = PoolConfig { max_connections: 2, ..Default::default() };
            let pool = db::pool::create_pool(&database_url, &pool_config)
                .await
                .context("failed to connect to database")?;

            match action {
                SharingAction::Owners { workflow_ids } => {
                    let owners =
                        shared_workflows::find_owner_sharings_by_workflow_ids(&pool, &workflow_ids).await?;
                    println!("{}", serde_json::to_string_pretty(&owners)?);
                }
                SharingAction::TransferToOwner => {
                    let owner = users::get_instance_owner(&pool)
                        .await
                        .context("no instance owner found")?;
                    let role = roles::get_workflow_owner_role(&pool)
                        .await
                        .context("workflow owner role missing; run `migrate` first")?;
                    let moved = shared_workflows::reassign_ownership(&pool, &owner, &role).await?;
                    info!(user_id = %owner.id, moved, "Transferred workflow ownership");
                }
            }
        }
    }

    Ok(())
}
