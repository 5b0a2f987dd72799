//! Chat command parsing and reply rendering.
//!
//! The reply wording follows the original bot dialog: a welcome with the
//! command list, a live status view, a statistics view, and subscription
//! management.
use crate::alerting::templates::format_duration;
use crate::monitor::{SiteStatus, StatsSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Status,
    Stats,
    Subscribe,
    Unsubscribe,
    Help,
    Greeting,
    Farewell,
    Unknown,
}

const GREETINGS: &[&str] = &["привет", "hello", "hi", "здравствуй"];
const FAREWELLS: &[&str] = &["пока", "до свидания", "bye", "goodbye"];

pub fn parse(text: &str) -> Command {
    let trimmed = text.trim();
    // Commands may arrive as "/cmd@botname"; the suffix is irrelevant here.
    let first_token = trimmed.split_whitespace().next().unwrap_or("");
    let command = first_token.split('@').next().unwrap_or("");

    match command {
        "/start" => Command::Start,
        "/status" => Command::Status,
        "/stats" => Command::Stats,
        "/subscribe" => Command::Subscribe,
        "/unsubscribe" => Command::Unsubscribe,
        "/help" => Command::Help,
        _ => {
            let lowered = trimmed.to_lowercase();
            if GREETINGS.contains(&lowered.as_str()) {
                Command::Greeting
            } else if FAREWELLS.contains(&lowered.as_str()) {
                Command::Farewell
            } else {
                Command::Unknown
            }
        }
    }
}

pub fn welcome_text(check_url: &str, interval_seconds: u64) -> String {
    format!(
        "Site monitoring is active!\n\n\
         Watched site: {check_url}\n\n\
         Available commands:\n\
         /status - current site status\n\
         /stats - detailed statistics\n\
         /subscribe - subscribe to notifications\n\
         /unsubscribe - unsubscribe from notifications\n\
         /help - command reference\n\n\
         The site is checked every {interval_seconds} seconds."
    )
}

pub fn help_text(check_url: &str) -> String {
    format!(
        "Command reference:\n\n\
         /start - getting started\n\
         /status - current site status\n\
         /stats - detailed monitoring statistics\n\
         /subscribe - subscribe to notifications\n\
         /unsubscribe - unsubscribe from notifications\n\
         /help - this reference\n\n\
         Notifications are sent when the site goes down and when it recovers.\n\
         Watched site: {check_url}"
    )
}

fn status_line(snapshot: &StatsSnapshot, threshold: u32) -> &'static str {
    match snapshot.status {
        SiteStatus::Up => "Site is up and stable.",
        SiteStatus::Down if snapshot.consecutive_errors >= threshold => {
            "CRITICAL: site is down, intervention required!"
        }
        SiteStatus::Down => "Site availability is degraded.",
        SiteStatus::Unknown => "No checks completed yet.",
    }
}

fn status_word(status: SiteStatus) -> &'static str {
    match status {
        SiteStatus::Up => "up",
        SiteStatus::Down => "down",
        SiteStatus::Unknown => "unknown",
    }
}

pub fn status_text(snapshot: &StatsSnapshot, threshold: u32, check_url: &str) -> String {
    let last_check = snapshot
        .last_check
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    format!(
        "Current site status:\n\n\
         Site: {check_url}\n\
         Status: {}\n\
         Last check: {last_check}\n\
         Consecutive errors: {}\n\n\
         {}",
        status_word(snapshot.status),
        snapshot.consecutive_errors,
        status_line(snapshot, threshold)
    )
}

pub fn stats_text(snapshot: &StatsSnapshot, check_url: &str, subscriber_count: i64) -> String {
    let last_down = snapshot
        .last_down_time
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "none".to_string());

    format!(
        "Monitoring statistics:\n\n\
         Site: {check_url}\n\
         Running for: {}\n\
         Total checks: {}\n\
         Successful: {}\n\
         Failed: {}\n\
         Availability: {:.2}%\n\
         Subscribers: {subscriber_count}\n\n\
         Last outage: {last_down}\n\
         Monitoring since: {}",
        format_duration(snapshot.running_seconds),
        snapshot.total_checks,
        snapshot.successful_checks,
        snapshot.failed_checks,
        snapshot.uptime_percentage,
        snapshot.started_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

pub fn subscribed_text(already_subscribed: bool) -> String {
    if already_subscribed {
        "You are already subscribed to notifications!".to_string()
    } else {
        "You are now subscribed to notifications!\n\n\
         You will receive a message when the site has problems and when it recovers."
            .to_string()
    }
}

pub fn unsubscribed_text(was_subscribed: bool) -> String {
    if was_subscribed {
        "You have unsubscribed from notifications.\n\n\
         You will no longer receive messages about site problems."
            .to_string()
    } else {
        "You are not subscribed to notifications!".to_string()
    }
}

pub fn greeting_text(check_url: &str) -> String {
    format!(
        "Hi! I am a site monitoring bot.\n\n\
         I watch the availability of {check_url}.\n\n\
         Send /help for the command list or /status for the current state."
    )
}

pub fn farewell_text() -> String {
    "Goodbye! Check the site status anytime with /status.".to_string()
}

pub fn fallback_text() -> String {
    "I did not understand that message.\n\n\
     Try one of the commands:\n\
     /start - getting started\n\
     /status - site status\n\
     /stats - statistics\n\
     /help - reference"
        .to_string()
}
