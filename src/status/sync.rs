use super::backend::SessionBackend;
use super::snapshot::StatusSnapshot;
use crate::config::DashboardConfig;
use crate::confirm::ConfirmGate;
use crate::error::{Error, Result};
use crate::monitor::ActivityLog;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

const LOGOUT_PROMPT: &str = "Are you sure you want to stop this bot? The WhatsApp session will be \
                             disconnected and the AI will stop replying.";

#[derive(Debug, Default)]
struct SyncState {
    snapshot: StatusSnapshot,
    loading: bool,
    initializing: bool,
    /// Sequence number of the last status response folded into `snapshot`
    applied_seq: u64,
    /// Bumped on every applied status and on logout; a QR fetch started in
    /// an older epoch may only land while pairing is still on
    epoch: u64,
}

/// Keeps a local view of the backend session in step with the server.
#[derive(Clone)]
pub struct StatusSync {
    backend: Arc<dyn SessionBackend>,
    state: Arc<RwLock<SyncState>>,
    issued_seq: Arc<AtomicU64>,
    notifier: Arc<watch::Sender<StatusSnapshot>>,
    logout_gate: Arc<ConfirmGate<()>>,
    activity: ActivityLog,
    poll_interval: Duration,
    init_refresh_delay: Duration,
}

impl StatusSync {
    pub fn new(backend: Arc<dyn SessionBackend>, config: &DashboardConfig, activity: ActivityLog) -> Self {
        let (notifier, _) = watch::channel(StatusSnapshot::baseline());
        Self {
            backend,
            state: Arc::new(RwLock::new(SyncState {
                loading: true,
                ..Default::default()
            })),
            issued_seq: Arc::new(AtomicU64::new(0)),
            notifier: Arc::new(notifier),
            logout_gate: Arc::new(ConfirmGate::new()),
            activity,
            poll_interval: config.poll_interval(),
            init_refresh_delay: config.init_refresh_delay(),
        }
    }

    pub fn session_id(&self) -> &str {
        self.backend.session_id()
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        self.state.read().await.snapshot.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn is_initializing(&self) -> bool {
        self.state.read().await.initializing
    }

    /// Receiver that sees every applied change.
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.notifier.subscribe()
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Poll the backend once. Failures leave the cached view untouched.
    pub async fn fetch_status(&self) -> Result<StatusSnapshot> {
        let seq = self.issued_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = self.apply_status(seq).await;
        let mut state = self.state.write().await;
        if state.loading {
            state.loading = false;
            // First answer, good or bad, ends the loading view
            self.notifier.send_replace(state.snapshot.clone());
        }
        drop(state);
        outcome
    }

    async fn apply_status(&self, seq: u64) -> Result<StatusSnapshot> {
        let resp = match self.backend.status().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, session = %self.session_id(), "Failed to fetch status");
                self.activity.warn(format!("status poll failed: {}", e));
                return Err(e);
            }
        };

        if !resp.success {
            let reason = resp.error.unwrap_or_else(|| "status unavailable".to_string());
            warn!(%reason, "Backend refused status query");
            return Err(Error::Rejected(reason));
        }

        let needs_qr = {
            let mut state = self.state.write().await;
            if seq <= state.applied_seq {
                debug!(seq, applied = state.applied_seq, "Discarding stale status response");
                return Ok(state.snapshot.clone());
            }
            state.applied_seq = seq;
            state.epoch += 1;

            let previous = state.snapshot.status;
            state.snapshot.merge(&resp);
            if previous != state.snapshot.status {
                info!(from = %previous, to = %state.snapshot.status, "Session status changed");
                self.activity
                    .info(format!("session {} -> {}", previous, state.snapshot.status));
            }
            self.notifier.send_replace(state.snapshot.clone());
            state.snapshot.needs_qr()
        };

        if needs_qr {
            // fetch_qr reports its own failures
            let _ = self.fetch_qr().await;
        }

        Ok(self.snapshot().await)
    }

    /// Fetch the pairing image. Each success overwrites the cached one.
    pub async fn fetch_qr(&self) -> Result<Option<String>> {
        let epoch = self.state.read().await.epoch;

        let resp = match self.backend.qr().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "Failed to fetch QR");
                return Err(e);
            }
        };

        let image = match resp.qr_image {
            Some(image) if resp.success && !image.is_empty() => image,
            _ => {
                debug!(success = resp.success, "QR not available yet");
                return Ok(None);
            }
        };

        let mut state = self.state.write().await;
        if state.epoch != epoch && !state.snapshot.has_qr {
            debug!("Pairing ended while QR was in flight, dropping image");
            return Ok(None);
        }
        let first = state.snapshot.qr_image.is_none();
        state.snapshot.qr_image = Some(image.clone());
        state.snapshot.has_qr = true;
        self.notifier.send_replace(state.snapshot.clone());
        drop(state);

        if first {
            info!("Pairing QR received");
            self.activity.info("pairing QR ready, scan it from WhatsApp > Linked Devices");
        }
        Ok(Some(image))
    }

    /// Ask the backend to bring the session up, then re-poll once after the
    /// configured delay. The returned handle resolves when that refresh ran.
    pub async fn handle_init(&self) -> Result<JoinHandle<()>> {
        self.state.write().await.initializing = true;
        let outcome = self.backend.init().await;
        self.state.write().await.initializing = false;

        match outcome {
            Ok(ack) => {
                if ack.success {
                    info!(session = %self.session_id(), "Session init requested");
                    self.activity.info("initializing AI modules...");
                } else {
                    warn!(reason = %ack.reason(), "Init command reported failure");
                    self.activity.warn(format!("init reported: {}", ack.reason()));
                }
                Ok(self.schedule_refresh(self.init_refresh_delay))
            }
            Err(e) => {
                warn!(error = %e, "Failed to initialize session");
                self.activity.warn(format!("init failed: {}", e));
                Err(e)
            }
        }
    }

    pub fn schedule_refresh(&self, delay: Duration) -> JoinHandle<()> {
        let sync = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sync.fetch_status().await;
        })
    }

    /// First step of a logout: arm the gate and return the question to ask.
    pub fn request_logout(&self) -> &'static str {
        self.logout_gate.arm((), LOGOUT_PROMPT);
        LOGOUT_PROMPT
    }

    pub fn cancel_logout(&self) -> bool {
        self.logout_gate.cancel()
    }

    pub fn logout_pending(&self) -> bool {
        self.logout_gate.is_armed()
    }

    /// Second step of a logout. Without a prior `request_logout` nothing is sent.
    pub async fn confirm_logout(&self) -> Result<()> {
        if self.logout_gate.confirm().is_none() {
            return Err(Error::NotArmed);
        }

        match self.backend.logout().await {
            Ok(ack) => {
                if !ack.success {
                    debug!(reason = %ack.reason(), "Logout acknowledged with failure flag");
                }
                let mut state = self.state.write().await;
                state.snapshot = StatusSnapshot::baseline();
                // Polls issued before the logout must not resurrect the session
                state.applied_seq = self.issued_seq.load(Ordering::SeqCst);
                state.epoch += 1;
                self.notifier.send_replace(state.snapshot.clone());
                drop(state);

                info!(session = %self.session_id(), "Session logged out");
                self.activity.info("bot stopped, session disconnected");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Logout failed");
                self.activity.warn(format!("logout failed: {}", e));
                Err(e)
            }
        }
    }

    /// Poll every `poll_interval` until the handle is stopped or dropped.
    /// The first poll fires immediately; polls may overlap.
    pub fn start_polling(&self) -> PollHandle {
        let sync = self.clone();
        let period = self.poll_interval;
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let sync = sync.clone();
                tokio::spawn(async move {
                    let _ = sync.fetch_status().await;
                });
            }
        });
        debug!(?period, "Status polling started");
        PollHandle { task }
    }
}

/// Owns the polling task; dropping it stops the timer.
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(self) {}

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
