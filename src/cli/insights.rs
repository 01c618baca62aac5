use super::session::{activity_lines, status_sync};
use super::{render, Context};
use crate::monitor::ActivityCursor;
use crate::stats::{StatsBoard, StatsReport};
use anyhow::Result;
use chrono::Utc;
use std::time::Duration;
use tokio::time::interval;
use tracing::warn;

pub async fn stats(ctx: &Context) -> Result<()> {
    let board = StatsBoard::new(ctx.client.clone());
    // An unreachable backend renders as an empty board
    let report = board.fetch().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to fetch stats");
        StatsReport::default()
    });
    let summary = report.summary(Utc::now().date_naive());
    print!("{}", render::stats_board(&report, &summary));
    Ok(())
}

pub async fn history(ctx: &Context, chat: &str) -> Result<()> {
    let board = StatsBoard::new(ctx.client.clone());
    let messages = board.history(chat).await?;
    print!("{}", render::transcript(chat, &messages));
    Ok(())
}

/// Poll the session and print activity as it is recorded.
pub async fn monitor(ctx: &Context) -> Result<()> {
    let sync = status_sync(ctx);
    let poller = sync.start_polling();
    let mut cursor = ActivityCursor::new();
    let mut printed = 0usize;
    let mut ticker = interval(Duration::from_secs(1));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    println!("Monitoring session {} (Ctrl-C to quit)", sync.session_id());
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                for line in activity_lines(&mut cursor, sync.activity()) {
                    println!("{}", line);
                    printed += 1;
                }
            }
        }
    }

    poller.stop();
    println!("\n{} events shown.", printed);
    Ok(())
}
