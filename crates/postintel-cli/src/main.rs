mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "postintel-cli")]
#[command(about = "Competitor post intelligence command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Bulk-scrape a competitor's most recent posts.
    Scrape {
        #[arg(long)]
        username: String,
        #[arg(long, default_value_t = 10)]
        count: u32,
    },
    /// Run a keyword search and ingest the discovered posts.
    Search {
        #[arg(long)]
        keyword: String,
        #[arg(long, default_value_t = 10)]
        count: u32,
    },
    /// Incrementally refresh one competitor, or all of them.
    Refresh {
        #[arg(long)]
        username: Option<String>,
    },
    /// Analyze one stored post and persist the extraction.
    Analyze {
        #[arg(long)]
        external_id: String,
        #[arg(long, default_value_t = 1)]
        user_id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = postintel_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = postintel_db::PoolConfig::from_app_config(&config);
    let pool = postintel_db::connect_pool(&config.database_url, pool_config).await?;
    postintel_db::run_migrations(&pool).await?;

    let keys = postintel_core::KeyStore::new(postintel_core::ApiKeys::from_env());
    postintel_db::reload_keys(&pool, &keys).await?;

    match cli.command {
        Commands::Scrape { username, count } => {
            commands::run_scrape(&pool, &config, &keys, &username, count).await
        }
        Commands::Search { keyword, count } => {
            commands::run_search(&pool, &config, &keys, &keyword, count).await
        }
        Commands::Refresh { username } => {
            commands::run_refresh(&pool, &config, &keys, username.as_deref()).await
        }
        Commands::Analyze {
            external_id,
            user_id,
        } => commands::run_analyze(&pool, &config, &keys, &external_id, user_id).await,
    }
}
