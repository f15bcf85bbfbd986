use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cdl_stats::api::{build_router, state::AppState};
use cdl_stats::config::AppConfig;
use cdl_stats::db::Database;

#[derive(Parser)]
#[command(name = "cdl-stats")]
#[command(about = "Read-only statistics API for a competitive esports league")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address, overriding the configured host
        #[arg(long)]
        host: Option<String>,

        /// Port number, overriding the configured port
        #[arg(long)]
        port: Option<u16>,

        /// Directory holding the built front-end
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Apply database migrations and exit
    Migrate,

    /// Run the data consistency checks and print the report as JSON
    Validate,

    /// Print the effective configuration as TOML
    Config,
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if static_dir.is_some() {
                config.server.static_dir = static_dir;
            }
            config.validate()?;

            tracing::info!("Starting cdl-stats v{}", env!("CARGO_PKG_VERSION"));
            let db = Database::connect(&config.database).await?;
            db.migrate().await?;

            let addr = config.server.bind_addr();
            let app = build_router(AppState::new(db, config));
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {addr}"))?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await?;
        }
        Commands::Migrate => {
            let db = Database::connect(&config.database).await?;
            db.migrate().await?;
        }
        Commands::Validate => {
            let db = Database::connect(&config.database).await?;
            let report = db.validate().await?;
            for issue in report.issues() {
                tracing::warn!("{}", issue);
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
