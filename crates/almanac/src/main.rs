//! Almanac binary: Discord calendar bot plus HTTP surface.
//!
//! `almanac serve` runs everything; the HTTP server starts even when no
//! Discord token is configured so deployment health checks pass before the
//! bot is fully set up.

use almanac_database::{
    establish_connection, run_migrations, EventRepository, ReminderRepository, UserRepository,
};
use almanac_gcal::CalendarClient;
use almanac_security::{RateLimit, RateLimiter, TokenCipher};
use almanac_server::{create_router, serve, AppState, OAuthBroker, ReminderScheduler, ServiceMetrics};
use almanac_social::{AlmanacBot, BotContext};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "almanac", version, about = "Discord calendar bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot and HTTP server (default)
    Serve,
    /// Print a fresh base64 AES key for TOKEN_KEY
    GenerateKey,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run(AppConfig::from_env()?).await,
        Commands::GenerateKey => {
            println!("{}", TokenCipher::generate_key());
            Ok(())
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = establish_connection(&config.database_url)?;
    run_migrations(&mut conn)?;
    let conn = Arc::new(tokio::sync::Mutex::new(conn));

    let cipher = Arc::new(TokenCipher::from_base64_key(&config.token_key)?);
    info!(key = %cipher.key_fingerprint(), "token cipher ready");
    let metrics = ServiceMetrics::new();

    let state = AppState {
        users: UserRepository::from_arc(conn.clone()),
        conn: conn.clone(),
        cipher: cipher.clone(),
        broker: Arc::new(OAuthBroker::new()),
        metrics: metrics.clone(),
        base_url: config.base_url.clone(),
        supabase_url: config.supabase_url.clone(),
        supabase_anon_key: config.supabase_anon_key.clone(),
    };
    let router = create_router(state);
    let http = serve(router, &config.http_host, config.http_port);

    let Some(token) = config.discord_token else {
        warn!("DISCORD_TOKEN not set; running HTTP surface only");
        return Ok(http.await?);
    };

    let context = Arc::new(BotContext::new(
        conn.clone(),
        CalendarClient::new(),
        cipher,
        RateLimiter::new(RateLimit::default()),
        metrics.clone(),
        config.base_url,
        config.default_tz,
    ));
    let mut bot = AlmanacBot::new(token, context).await?;

    let scheduler = ReminderScheduler::new(
        bot.http(),
        ReminderRepository::from_arc(conn.clone()),
        EventRepository::from_arc(conn.clone()),
        UserRepository::from_arc(conn),
        metrics,
        config.default_tz,
    );
    tokio::spawn(scheduler.run());

    tokio::select! {
        result = bot.start() => Ok(result?),
        result = http => Ok(result?),
    }
}
