//! Session commands: status, watch, init, logout.

use super::{render, Context};
use crate::monitor::{ActivityCursor, ActivityLog};
use crate::qr::QrImage;
use crate::stats::StatsBoard;
use crate::status::{SessionBackend, StatusSync};
use anyhow::Result;
use chrono::Utc;
use inquire::Confirm;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::warn;

pub(crate) fn status_sync(ctx: &Context) -> StatusSync {
    let backend: Arc<dyn SessionBackend> = ctx.client.clone();
    StatusSync::new(backend, &ctx.config, ActivityLog::new(ctx.config.monitor_capacity))
}

/// Status card, plus the pairing panel once the first poll has answered.
pub(crate) async fn session_view(sync: &StatusSync) -> String {
    let snapshot = sync.snapshot().await;
    let loading = sync.is_loading().await;
    let mut out = render::status_card(&snapshot, sync.session_id(), loading);
    if !loading {
        out.push_str(&render::pairing_panel(&snapshot.pairing_view()));
    }
    out
}

pub(crate) fn activity_lines(cursor: &mut ActivityCursor, log: &ActivityLog) -> Vec<String> {
    cursor.drain(log).iter().map(render::activity_line).collect()
}

pub async fn status(ctx: &Context, qr_out: Option<&Path>) -> Result<()> {
    let sync = status_sync(ctx);
    if let Err(e) = sync.fetch_status().await {
        println!("\n  Status unavailable from {}: {}", ctx.config.api_url, e);
    }

    print!("{}", session_view(&sync).await);

    let snapshot = sync.snapshot().await;
    if let Some(path) = qr_out {
        match snapshot.visible_qr() {
            Some(uri) => {
                QrImage::from_data_uri(uri)?.save(path).await?;
                println!("  QR code written to {}\n", path.display());
            }
            None => println!("  No pairing QR to save.\n"),
        }
    }
    Ok(())
}

pub async fn watch(ctx: &Context) -> Result<()> {
    let sync = status_sync(ctx);
    let board = StatsBoard::new(ctx.client.clone());
    let mut changes = sync.subscribe();
    let mut cursor = ActivityCursor::new();

    println!("Watching session {} (Ctrl-C to quit)", sync.session_id());
    print!("{}", session_view(&sync).await);
    let poller = sync.start_polling();

    let mut stats_ticker = interval(ctx.config.stats_interval());
    stats_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut activity_ticker = interval(Duration::from_secs(1));
    activity_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                changes.borrow_and_update();
                print!("{}", session_view(&sync).await);
            }
            _ = activity_ticker.tick() => {
                for line in activity_lines(&mut cursor, sync.activity()) {
                    println!("  {}", line);
                }
            }
            _ = stats_ticker.tick() => {
                match board.fetch().await {
                    Ok(report) => {
                        let summary = report.summary(Utc::now().date_naive());
                        print!("{}", render::stats_board(&report, &summary));
                    }
                    Err(e) => warn!(error = %e, "Failed to fetch stats"),
                }
            }
        }
    }

    poller.stop();
    println!();
    Ok(())
}

pub async fn init(ctx: &Context) -> Result<()> {
    let sync = status_sync(ctx);
    println!("Initializing AI modules...");

    let refresh = sync.handle_init().await?;
    refresh.await?;

    print!("{}", session_view(&sync).await);
    Ok(())
}

pub async fn logout(ctx: &Context, yes: bool) -> Result<()> {
    let sync = status_sync(ctx);
    sync.fetch_status().await?;
    if !sync.snapshot().await.can_logout() {
        println!("Session {} is not connected; nothing to stop.", sync.session_id());
        return Ok(());
    }

    let question = sync.request_logout();
    let confirmed = yes || Confirm::new(question).with_default(false).prompt()?;
    if !confirmed {
        sync.cancel_logout();
        println!("Logout cancelled.");
        return Ok(());
    }

    sync.confirm_logout().await?;
    println!("Bot stopped. Session {} disconnected.", sync.session_id());
    Ok(())
}
