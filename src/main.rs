use std::path::PathBuf;

use clap::Parser;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

use kaspaclash_select::driver::bus::EventBus;
use kaspaclash_select::driver::SelectionDriver;
use kaspaclash_select::engine::bot::BotOpponent;
use kaspaclash_select::engine::config::{load_config, load_default_config};
use kaspaclash_select::engine::models::{Outbound, Role, SelectionPhase};
use kaspaclash_select::engine::session::MatchSetup;
use kaspaclash_select::roster::CharacterCatalog;

#[derive(Parser)]
#[command(name = "kaspaclash-select", about = "Run one ban/pick session against the bot opponent")]
struct Cli {
    /// Path to selection.toml (default: auto-discover)
    #[arg(long, env = "KASPACLASH_SELECTION_CONFIG")]
    config: Option<PathBuf>,

    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Local seat: player1 or player2
    #[arg(long, default_value = "player1")]
    role: String,

    /// Comma-separated owned character ids (default: starter set)
    #[arg(long, value_delimiter = ',')]
    owned: Vec<String>,

    /// Character to ban as soon as banning opens. Left to the deadline when absent.
    #[arg(long)]
    ban: Option<String>,

    /// Character to pick as soon as picking opens. Left to the deadline when absent.
    #[arg(long)]
    pick: Option<String>,

    /// Multiplier for cosmetic pauses and bot delays
    #[arg(long, default_value = "1.0")]
    time_scale: f64,

    #[arg(long)]
    ban_timeout_ms: Option<u64>,

    #[arg(long)]
    pick_timeout_ms: Option<u64>,

    #[arg(long, default_value = "local-match")]
    match_id: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => load_config(path).map_err(|e| format!("Failed to load config: {}", e))?,
        None => load_default_config(),
    };
    if cli.seed.is_some() {
        config.random_seed = cli.seed;
    }
    if let Some(ms) = cli.ban_timeout_ms {
        config.timing.ban_timeout_ms = ms;
    }
    if let Some(ms) = cli.pick_timeout_ms {
        config.timing.pick_timeout_ms = ms;
    }

    let role = Role::parse(&cli.role).ok_or_else(|| format!("Unknown role: {}", cli.role))?;
    let catalog = CharacterCatalog::builtin();
    let owned = if cli.owned.is_empty() {
        catalog.starter_ids()
    } else {
        cli.owned.iter().cloned().collect()
    };
    let setup = MatchSetup::new(cli.match_id.clone(), role).with_owned(owned).against_bot();

    let bot_seed = config.random_seed.map(|s| s.wrapping_add(1));
    let bot = BotOpponent::from_config(&config.bot, bot_seed)?;

    let mut handle = SelectionDriver::spawn(
        setup,
        &config,
        catalog,
        EventBus::new(),
        Box::new(bot),
        cli.time_scale,
    )?;
    let mut events = handle.events().ok_or("event stream already taken")?;

    while let Some(event) = events.next().await {
        println!("{}", serde_json::to_string(&event)?);
        if let Outbound::PhaseChanged { phase } = event {
            let choice = match phase {
                SelectionPhase::Banning => cli.ban.as_ref(),
                SelectionPhase::Picking => cli.pick.as_ref(),
                _ => None,
            };
            if let Some(id) = choice {
                if let Err(e) = handle.select(id.clone()).and_then(|_| handle.confirm(id.clone())) {
                    tracing::warn!(%phase, error = %e, "could not submit decision");
                }
            }
        }
    }

    let summary = handle.join().await?;
    tracing::info!(
        local_pick = ?summary.local_pick,
        opponent_pick = ?summary.opponent_pick,
        banned = ?summary.banned,
        auto_selections = summary.auto_selections,
        "selection finished"
    );
    Ok(())
}
