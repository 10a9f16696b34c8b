mod catalog;
mod gateway;

use catalog::{Catalog, Screen, ScreenId};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use zanbot_channels::telegram::TelegramChannel;
use zanbot_core::{
    config::{self, Config, HostingMode},
    language::Language,
    session::MemorySessions,
};
use zanbot_translate::{GoogleTranslate, Translator};

#[derive(Parser)]
#[command(
    name = "zanbot",
    version,
    about = "ZanCoin Telegram assistant with on-the-fly translation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot (long polling, or webhook when WEBHOOK_URL is set).
    Start,
    /// Show the resolved configuration without contacting Telegram.
    Status,
    /// Render one screen to stdout in a given language.
    Preview {
        /// Screen identifier (e.g. main_menu, explain, language_select), or `all`.
        screen: String,
        /// Target language code or locale tag.
        #[arg(short, long, default_value = "en")]
        lang: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load(&cli.config)?;
    cfg.apply_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.bot.log_level)),
        )
        .init();

    match cli.command {
        Commands::Start => {
            cfg.validate()?;

            let translator = build_translator(&cfg)?;
            let mode = cfg.hosting_mode();
            let transport = TelegramChannel::new(&cfg.telegram, cfg.webhook.clone(), mode.clone());

            info!("{} starting in {} mode", cfg.bot.name, mode.name());
            let gw = gateway::Gateway::new(
                Arc::new(transport),
                translator,
                Arc::new(MemorySessions::new()),
                Arc::new(Catalog::zancoin()),
            );
            Arc::new(gw).run().await?;
        }
        Commands::Status => {
            println!("{} - Status\n", cfg.bot.name);
            println!("Config: {}", cli.config);
            println!(
                "  telegram token: {}",
                if cfg.telegram.bot_token.trim().is_empty() {
                    "missing"
                } else {
                    "configured"
                }
            );
            match cfg.hosting_mode() {
                HostingMode::Polling => println!("  hosting: long polling"),
                HostingMode::Webhook { url, listen } => {
                    println!("  hosting: webhook {url} (listening on {listen})");
                    println!(
                        "  webhook secret: {}",
                        if cfg.webhook.secret_token.is_empty() {
                            "unset"
                        } else {
                            "set"
                        }
                    );
                }
            }
            println!(
                "  translation: {}",
                if cfg.translation.enabled {
                    format!(
                        "{} (timeout {}s)",
                        cfg.translation.base_url, cfg.translation.timeout_secs
                    )
                } else {
                    "disabled".to_string()
                }
            );
            if let Err(e) = cfg.validate() {
                println!("\n  not ready: {e}");
            }
        }
        Commands::Preview { screen, lang } => {
            let catalog = Catalog::zancoin();
            let selected: Vec<&Screen> = if screen == "all" {
                catalog.screens().collect()
            } else {
                let Some(id) = ScreenId::from_id(&screen) else {
                    let known: Vec<&str> = ScreenId::ALL.iter().map(|s| s.id()).collect();
                    anyhow::bail!(
                        "unknown screen '{screen}'. Known screens: all, {}",
                        known.join(", ")
                    );
                };
                vec![catalog.screen(id)]
            };

            let lang = Language::normalize(Some(lang.as_str()));
            let translator = build_translator(&cfg)?;
            for screen in selected {
                let rendered =
                    gateway::render::render_screen(&translator, screen.text, &screen.rows, lang)
                        .await;
                println!("== {} ({lang}) ==", screen.id);
                println!("{}\n", gateway::render::describe(&rendered));
            }
        }
    }

    Ok(())
}

/// Build the translator, or a pass-through one when translation is disabled.
fn build_translator(cfg: &Config) -> anyhow::Result<Translator> {
    if !cfg.translation.enabled {
        return Ok(Translator::disabled());
    }
    let timeout = Duration::from_secs(cfg.translation.timeout_secs);
    let backend = GoogleTranslate::from_config(cfg.translation.base_url.clone(), timeout)?;
    Ok(Translator::new(Arc::new(backend), Some(timeout)))
}
