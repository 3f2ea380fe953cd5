use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use practice_turkish::broadcast::{print_summary, send_word_of_the_day, BroadcastConfig};
use practice_turkish::config::{Config, Task};
use practice_turkish::morphology::{Morphology, RemoteAnalyzer};
use practice_turkish::server::{serve, AppState};
use practice_turkish::telegram::TelegramBot;
use practice_turkish::translate::http::build_client;
use practice_turkish::translate::Translator;
use practice_turkish::wotd::WordOfTheDaySource;
use practice_turkish::{detect_language, get_translation, lowercase};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "practice-turkish")]
#[command(version, about = "Translation and morphology service for learning Turkish")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Port to listen on (overrides the configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Translate text with every registered service
    Translate {
        /// Text in Turkish, Russian or English
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Show the morphological analysis of a Turkish word
    Analyze {
        word: String,
    },
    /// Print today's word, optionally sending it to chats
    WordOfTheDay {
        /// Chat ids to send the word to
        #[arg(long = "chat")]
        chats: Vec<i64>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn check_config(config: &Config, task: Task) -> Result<()> {
    config
        .validate(task)
        .with_context(|| format!("Configuration is incomplete for {}", task))
}

/// Whitespace collapsed and lowered the way the chat front-end sends queries.
fn normalize(words: &[String]) -> String {
    let text = words.join(" ").split_whitespace().collect::<Vec<_>>().join(" ");
    lowercase(&text, detect_language(&text))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Command::Serve { port } => {
            check_config(&config, Task::Serve)?;
            let state = AppState::from_config(&config).context("Failed to build service state")?;
            info!(
                "Registered services: {}",
                state
                    .translator
                    .services()
                    .iter()
                    .map(|s| s.service_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            serve(state, port.unwrap_or(config.port)).await?;
        }
        Command::Translate { text } => {
            check_config(&config, Task::Translate)?;
            let translator = Translator::from_config(&config)?;
            let text = normalize(&text);
            let translation = get_translation(&translator, &text).await;
            println!("{}", translation.translation);
        }
        Command::Analyze { word } => {
            let url = config
                .morphology_url
                .clone()
                .context("MORPHOLOGY_URL not set")?;
            let client = build_client(config.api_timeout())?;
            let morphology = Morphology::new(Arc::new(RemoteAnalyzer::new(client, url)));
            let word = lowercase(&word, detect_language(&word));
            if !Morphology::is_candidate(&word) {
                println!("{} {} is not a single Turkish word", style("!").yellow(), word);
                return Ok(());
            }
            let analysis = morphology.analyze(&word).await?;
            if analysis.is_empty() {
                println!("{} No parses for {}", style("!").yellow(), word);
            } else {
                println!("{}", analysis);
            }
        }
        Command::WordOfTheDay { chats } => {
            let client = build_client(config.api_timeout())?;
            let source = WordOfTheDaySource::new(client.clone());
            if chats.is_empty() {
                println!("{}", source.message().await?);
                return Ok(());
            }

            check_config(&config, Task::Broadcast)?;
            let token = config
                .telegram_bot_token
                .as_deref()
                .context("TELEGRAM_BOT_TOKEN not set")?;
            let bot = TelegramBot::new(client, token);
            let broadcast_config = BroadcastConfig {
                pause: config.broadcast_pause(),
                show_progress: true,
            };
            let result = send_word_of_the_day(&source, &chats, &bot, broadcast_config).await?;
            println!("{} Sent word of the day", style("✓").green());
            print_summary(&result);
        }
    }

    Ok(())
}
