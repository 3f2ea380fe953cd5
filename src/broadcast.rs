use crate::error::{PracticeError, Result};
use crate::registry::UserRegistry;
use crate::telegram::TelegramBot;
use crate::wotd::WordOfTheDaySource;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Configuration for a word-of-the-day broadcast.
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Pause between two chats.
    pub pause: Duration,
    /// Show a progress bar.
    pub show_progress: bool,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            pause: Duration::from_secs(1),
            show_progress: true,
        }
    }
}

/// Statistics from one broadcast.
#[derive(Debug, Clone)]
pub struct BroadcastStats {
    pub subscribers: usize,
    pub delivered: usize,
    pub failed: usize,
    pub total_time: Duration,
}

#[derive(Debug)]
pub struct BroadcastResult {
    /// The message that was sent.
    pub message: String,
    /// Chats that did not receive it.
    pub failed_chats: Vec<i64>,
    pub stats: BroadcastStats,
}

/// Sends today's word to every subscriber of the registry.
///
/// The message and the subscriber list are fetched concurrently; chats are
/// then served one at a time with a pause in between.
pub async fn broadcast_word_of_the_day(
    source: &WordOfTheDaySource,
    registry: &UserRegistry,
    bot: &TelegramBot,
    config: BroadcastConfig,
) -> Result<BroadcastResult> {
    let start_time = Instant::now();
    let (message, subscribers) =
        futures::try_join!(source.message(), registry.subscribers_unchecked())?;
    deliver(message, &subscribers, bot, &config, start_time).await
}

/// Sends today's word to an explicit list of chats.
pub async fn send_word_of_the_day(
    source: &WordOfTheDaySource,
    chat_ids: &[i64],
    bot: &TelegramBot,
    config: BroadcastConfig,
) -> Result<BroadcastResult> {
    let start_time = Instant::now();
    let message = source.message().await?;
    deliver(message, chat_ids, bot, &config, start_time).await
}

async fn deliver(
    message: String,
    chat_ids: &[i64],
    bot: &TelegramBot,
    config: &BroadcastConfig,
    start_time: Instant,
) -> Result<BroadcastResult> {
    if chat_ids.is_empty() {
        warn!("No recipients, nothing to send");
    }
    info!("Sending word of the day to {} chats", chat_ids.len());

    let spinner = if config.show_progress && !chat_ids.is_empty() {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Sending to {} chats", chat_ids.len()));
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let deliveries = bot.send_out(chat_ids, &message, config.pause).await;
    let failed_chats: Vec<i64> = deliveries
        .iter()
        .filter(|d| !d.is_ok())
        .map(|d| d.chat_id)
        .collect();

    if let Some(pb) = spinner {
        pb.finish_with_message("Broadcast complete");
    }

    if !chat_ids.is_empty() && failed_chats.len() == chat_ids.len() {
        return Err(PracticeError::Api(format!(
            "All {} deliveries failed",
            chat_ids.len()
        )));
    }

    let stats = BroadcastStats {
        subscribers: chat_ids.len(),
        delivered: chat_ids.len() - failed_chats.len(),
        failed: failed_chats.len(),
        total_time: start_time.elapsed(),
    };

    info!(
        "Broadcast complete: {}/{} delivered in {:.2}s",
        stats.delivered,
        stats.subscribers,
        stats.total_time.as_secs_f64()
    );

    Ok(BroadcastResult {
        message,
        failed_chats,
        stats,
    })
}

/// Print a summary of a broadcast.
pub fn print_summary(result: &BroadcastResult) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                    Word of the Day Broadcast                  ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Subscribers: {}", result.stats.subscribers);
    println!("  Delivered:   {}", result.stats.delivered);
    println!("  Failed:      {}", result.stats.failed);
    println!("  Total:       {:.2}s", result.stats.total_time.as_secs_f64());
    if !result.failed_chats.is_empty() {
        println!();
        println!("  Failed chats: {:?}", result.failed_chats);
    }
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_config_default() {
        let config = BroadcastConfig::default();
        assert_eq!(config.pause, Duration::from_secs(1));
        assert!(config.show_progress);
    }
}
