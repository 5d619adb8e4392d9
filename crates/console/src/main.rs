//! Console inspector: access decisions and session upkeep from the command line.
//!
//! ```bash
//! stockroom-console route /admin/products /seller/cart
//! stockroom-console permissions seller_tt --json
//! stockroom-console watch
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use stockroom_auth::{Role, describe_role};
use stockroom_console::routing::{decide, require_login, require_permission};
use stockroom_console::{ConsoleConfig, RouteDecision, SessionStatus, build_session, watch_until};

#[derive(Parser)]
#[command(
    name = "stockroom-console",
    about = "Inspect Stockroom console access decisions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore the stored session and show the guard decision for each path
    Route {
        /// Paths to check, e.g. /admin/products
        #[arg(required = true)]
        paths: Vec<String>,

        /// Also require this permission key on every path
        #[arg(long)]
        permission: Option<String>,
    },

    /// List the permissions held by a role
    Permissions {
        /// Role name, e.g. seller or seller_tt
        role: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Keep the stored session under the inactivity watchdog until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ConsoleConfig::from_env().context("invalid console configuration")?;
    stockroom_observability::init(&config.log);

    match cli.command {
        Commands::Route { paths, permission } => route(&config, &paths, permission.as_deref()).await,
        Commands::Permissions { role, json } => permissions(&role, json),
        Commands::Watch => watch(&config).await,
    }
}

async fn watch(config: &ConsoleConfig) -> anyhow::Result<()> {
    let session = Arc::new(build_session(config));
    session.initialize().await;

    if let Some(user) = session.user() {
        println!(
            "session: {} (signs out after {}s idle, checked every {}s)",
            user.username,
            config.inactivity_timeout.as_secs(),
            config.session_check_interval.as_secs()
        );
    }

    let stop = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "cannot listen for Ctrl-C; watching until the session ends");
            std::future::pending::<()>().await;
        }
    };

    match watch_until(session, config.session_check_interval, stop).await {
        SessionStatus::Unauthenticated => println!("session: signed out"),
        SessionStatus::Expired => println!("session: expired and signed out"),
        SessionStatus::Active => println!("session: still active"),
    }
    Ok(())
}

async fn route(config: &ConsoleConfig, paths: &[String], permission: Option<&str>) -> anyhow::Result<()> {
    let session = build_session(config);
    session.initialize().await;

    let snapshot = session.snapshot();
    match &snapshot.user {
        Some(user) => println!(
            "session: {} ({})",
            user.username,
            user.role.map_or("no role", |r| r.as_str())
        ),
        None => println!("session: signed out"),
    }

    for path in paths {
        let decision = require_login(&snapshot, path)
            .and_then(|| decide(&snapshot, path))
            .and_then(|| permission.map_or(RouteDecision::Allow, |p| require_permission(&snapshot, p)));

        match decision {
            RouteDecision::Allow => println!("{path}\tallow"),
            RouteDecision::RedirectTo(to) => println!("{path}\tredirect -> {to}"),
        }
    }

    Ok(())
}

fn permissions(role: &str, json: bool) -> anyhow::Result<()> {
    let role: Role = role.parse().with_context(|| {
        let known: Vec<_> = Role::ALL.iter().map(Role::as_str).collect();
        format!("known roles: {}", known.join(", "))
    })?;
    let definition = describe_role(role);

    if json {
        let out = serde_json::to_string_pretty(&definition).context("serialize role definition")?;
        println!("{out}");
        return Ok(());
    }

    println!("{} - {}", definition.role, definition.description);
    for perm in &definition.permissions {
        println!(
            "  {:<24} {}",
            perm.name,
            perm.description.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
