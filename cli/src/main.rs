//! wikistreams CLI: watch Wikimedia change events from the terminal.
//!
//! Usage:
//! ```bash
//! # Every change on every wiki
//! wikistreams tail
//!
//! # Only Wikipedias, as JSON, stop after 20 events
//! wikistreams tail --origin '*.wikipedia.org' --json --limit 20
//!
//! # Keep going across disconnects, resuming from the last event seen
//! wikistreams tail --reconnect --since 2023-01-01T00:00:00Z
//!
//! # Show the request URL without connecting
//! wikistreams url --since 2023-01-01T00:00:00Z
//! ```
//!
//! `WIKISTREAMS_ENDPOINT`, `WIKISTREAMS_SINCE` and `WIKISTREAMS_ORIGIN`
//! provide defaults for the matching flags.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wikistreams::{
    RecentChangesEvent, RecentChangesStream, SseClientConfig, SseTransport, StreamConfig,
};

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(
    name = "wikistreams",
    about = "Tail the Wikimedia recent-changes event stream",
    version
)]
struct Cli {
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print recent changes as they happen
    Tail(TailArgs),
    /// Print the request URL that `tail` would connect to
    Url(StreamArgs),
}

#[derive(Args)]
struct StreamArgs {
    /// Base URL of the EventStreams service
    #[arg(long)]
    endpoint: Option<String>,
    /// Only show events from matching domains, e.g. "*.wikipedia.org"
    #[arg(long)]
    origin: Option<String>,
    /// Start from this ISO 8601 timestamp
    #[arg(long)]
    since: Option<String>,
}

impl StreamArgs {
    fn to_config(&self) -> StreamConfig {
        let mut config = StreamConfig::from_env();
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(origin) = &self.origin {
            config.origin_filter = Some(origin.clone());
        }
        if let Some(since) = &self.since {
            config.since = Some(since.clone());
        }
        config
    }
}

#[derive(Args)]
struct TailArgs {
    #[command(flatten)]
    stream: StreamArgs,
    /// Print each event as a JSON line
    #[arg(long)]
    json: bool,
    /// Reconnect after errors, resuming from the last event received
    #[arg(long)]
    reconnect: bool,
    /// Exit after this many events
    #[arg(long)]
    limit: Option<u64>,
    /// User-Agent sent to the server
    #[arg(long)]
    user_agent: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Tail(args) => cmd_tail(args).await,
        Commands::Url(args) => cmd_url(&args),
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn cmd_url(args: &StreamArgs) -> Result<()> {
    let stream = RecentChangesStream::from_config(&args.to_config())
        .context("invalid stream configuration")?;
    println!("{}", stream.request_url());
    Ok(())
}

async fn cmd_tail(args: TailArgs) -> Result<()> {
    let config = args.stream.to_config();
    let mut sse = SseClientConfig::default();
    if let Some(ua) = &args.user_agent {
        sse = sse.with_user_agent(ua.as_str());
    }
    let mut stream =
        RecentChangesStream::from_config_with_transport(&config, SseTransport::new(sse))
            .context("invalid stream configuration")?;

    let done = Notify::new();
    let mut delivered = 0u64;
    let mut last_dt = config.since.clone();
    let mut backoff = INITIAL_BACKOFF;

    loop {
        if let Some(dt) = &last_dt {
            stream.resume_since(dt.as_str());
        }
        info!(url = %stream.request_url(), "tailing recent changes");

        let mut received = 0u64;
        let result = tokio::select! {
            r = stream.run(
                |ev| {
                    if args.limit.is_some_and(|n| delivered >= n) {
                        return;
                    }
                    print_event(ev, args.json);
                    delivered += 1;
                    received += 1;
                    last_dt = Some(ev.meta.dt.clone());
                    if args.limit.is_some_and(|n| delivered >= n) {
                        done.notify_one();
                    }
                },
                |err| eprintln!("{err}"),
            ) => r,
            _ = done.notified() => return Ok(()),
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                return Ok(());
            }
        };

        if received > 0 {
            backoff = INITIAL_BACKOFF;
        }
        match result {
            Ok(()) if !args.reconnect => return Ok(()),
            Ok(()) => warn!("server closed the stream, reconnecting in {backoff:?}"),
            Err(e) if !args.reconnect => return Err(e.into()),
            Err(e) if !e.is_retryable() => bail!("giving up: {e}"),
            Err(e) => warn!(error = %e, "stream failed, reconnecting in {backoff:?}"),
        }
        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

fn print_event(ev: &RecentChangesEvent, json: bool) {
    if json {
        match serde_json::to_string(ev) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("failed to encode event: {e}"),
        }
    } else {
        println!("{}", summarize(ev));
    }
}

/// One-line human-readable summary of an event.
fn summarize(ev: &RecentChangesEvent) -> String {
    let mut line = format!("[{}] {} {} \"{}\" by {}", ev.meta.dt, ev.meta.domain, ev.kind, ev.title, ev.user);
    if !ev.log_type.is_empty() {
        line.push_str(&format!(" ({})", ev.log_type));
    }
    if ev.kind == "edit" || ev.kind == "new" {
        line.push_str(&format!(" {:+}", ev.length_delta()));
    }
    if ev.bot {
        line.push_str(" [bot]");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikistreams::Metadata;

    fn edit() -> RecentChangesEvent {
        RecentChangesEvent {
            meta: Metadata {
                domain: "en.wikipedia.org".into(),
                dt: "2023-01-01T00:00:00Z".into(),
                ..Default::default()
            },
            kind: "edit".into(),
            title: "Main Page".into(),
            user: "Alice".into(),
            length: wikistreams::NewOld { new: 90, old: 100 },
            ..Default::default()
        }
    }

    #[test]
    fn summary_of_edit_shows_delta() {
        assert_eq!(
            summarize(&edit()),
            "[2023-01-01T00:00:00Z] en.wikipedia.org edit \"Main Page\" by Alice -10"
        );
    }

    #[test]
    fn summary_of_bot_log_action() {
        let ev = RecentChangesEvent {
            kind: "log".into(),
            log_type: "block".into(),
            bot: true,
            ..edit()
        };
        assert_eq!(
            summarize(&ev),
            "[2023-01-01T00:00:00Z] en.wikipedia.org log \"Main Page\" by Alice (block) [bot]"
        );
    }

    #[test]
    fn flags_override_config() {
        let args = StreamArgs {
            endpoint: Some("http://localhost:1/".into()),
            origin: Some("*.wikiquote.org".into()),
            since: None,
        };
        let config = args.to_config();
        assert_eq!(config.endpoint, "http://localhost:1/");
        assert_eq!(config.origin_filter.as_deref(), Some("*.wikiquote.org"));
    }
}
