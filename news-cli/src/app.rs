use std::time::Duration;

use chrono::Local;
use news_core::{FeedHandle, SyncHealth};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

const HELP: &str = "commands: pin <n> | del <n> | list | quit";

enum Command {
    Pin(usize),
    Delete(usize),
    List,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?;
    let index = parts.next().and_then(|n| n.parse::<usize>().ok());
    let command = match (verb, index) {
        ("pin" | "p", Some(n)) => Command::Pin(n),
        ("del" | "d", Some(n)) => Command::Delete(n),
        ("list" | "l", _) => Command::List,
        ("quit" | "q", _) => Command::Quit,
        _ => Command::Unknown(line.trim().to_owned()),
    };
    Some(command)
}

/// Plain-text front end: prints the ordered view whenever it changes and
/// applies pin/delete commands read from stdin.
pub struct TextApp {
    feed: FeedHandle,
    refresh: Duration,
    last_keys: Option<Vec<String>>,
}

impl TextApp {
    pub fn new(feed: FeedHandle, refresh: Duration) -> Self {
        Self {
            feed,
            refresh,
            last_keys: None,
        }
    }

    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut ticker = tokio::time::interval(self.refresh);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        println!("{HELP}");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupt received");
                    break;
                }
                _ = ticker.tick() => self.render(false).await,
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("stdin closed, running until interrupted");
                        tokio::signal::ctrl_c().await?;
                        break;
                    };
                    match parse_command(&line) {
                        Some(Command::Quit) => break,
                        Some(command) => self.apply(command).await,
                        None => {}
                    }
                }
            }
        }
        Ok(())
    }

    async fn apply(&mut self, command: Command) {
        match command {
            Command::Pin(index) => match self.feed.toggle_pin(index).await {
                Some(pinned) => info!(index, pinned, "toggled pin"),
                None => println!("no article at position {index}"),
            },
            Command::Delete(index) => match self.feed.delete_at(index).await {
                Some(article) => info!(index, title = %article.title, "deleted article"),
                None => println!("no article at position {index}"),
            },
            Command::List => {}
            Command::Unknown(input) => {
                println!("unknown command {input:?}; {HELP}");
                return;
            }
            Command::Quit => return,
        }
        self.render(true).await;
    }

    async fn render(&mut self, force: bool) {
        if self.feed.is_loading().await {
            println!("Top News: loading...");
            return;
        }

        let view = self.feed.keyed_view().await;
        let keys: Vec<String> = view.iter().map(|(key, _)| key.clone()).collect();
        if !force && self.last_keys.as_ref() == Some(&keys) {
            return;
        }

        println!("\n=== Top News ({}) ===", Local::now().format("%H:%M:%S"));
        match self.feed.health().await {
            SyncHealth::Failing { failures } => {
                println!("!! headlines unavailable ({failures} failed refreshes in a row)")
            }
            SyncHealth::Stale { failures } => {
                println!("(showing cached headlines, {failures} refresh(es) failed)")
            }
            SyncHealth::Pending | SyncHealth::Fresh => {}
        }
        for (position, (_, article)) in view.iter().enumerate() {
            let marker = if article.pinned { "*" } else { " " };
            println!(
                "{marker}{position:>3}. {} [{}]\n       {}",
                article.title,
                article.source_name,
                article.image_or_placeholder()
            );
        }
        self.last_keys = Some(keys);
    }
}
