//! Background inactivity check.
//!
//! Polls [`Session::check_session`] on a fixed interval until shut down.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::session::{Session, SessionStatus};

/// Periodic `check_session` driver.
pub struct SessionWatchdog;

/// Handle to a running watchdog. Dropping it stops the task.
#[derive(Debug)]
pub struct WatchdogHandle {
    shutdown: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl SessionWatchdog {
    /// Spawn the watchdog on the current tokio runtime.
    ///
    /// The first check runs immediately; missed ticks are skipped rather than
    /// replayed.
    pub fn spawn(session: Arc<Session>, interval: Duration) -> WatchdogHandle {
        let shutdown = Arc::new(Notify::new());
        let signal = shutdown.clone();

        let task = tokio::spawn(async move {
            tracing::debug!(?interval, "session watchdog started");

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = signal.notified() => break,
                    _ = ticker.tick() => {
                        if session.check_session().await == SessionStatus::Expired {
                            tracing::info!("watchdog signed out an expired session");
                        }
                    }
                }
            }

            tracing::debug!("session watchdog stopped");
        });

        WatchdogHandle {
            shutdown,
            task: Some(task),
        }
    }
}

/// Run a watchdog over `session` until the session ends or `stop` resolves.
///
/// Returns `Unauthenticated` when nobody was signed in to begin with,
/// `Expired` once the session has been signed out, and `Active` when `stop`
/// fired first.
pub async fn watch_until<F>(session: Arc<Session>, interval: Duration, stop: F) -> SessionStatus
where
    F: Future<Output = ()>,
{
    if !session.is_authenticated() {
        return SessionStatus::Unauthenticated;
    }

    let watchdog = SessionWatchdog::spawn(session.clone(), interval);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    tokio::pin!(stop);

    let status = loop {
        tokio::select! {
            _ = &mut stop => break SessionStatus::Active,
            _ = ticker.tick() => {
                if !session.is_authenticated() {
                    break SessionStatus::Expired;
                }
            }
        }
    };

    watchdog.shutdown().await;
    status
}

impl WatchdogHandle {
    /// Stop the watchdog and wait for it to finish its current check.
    pub async fn shutdown(mut self) {
        self.shutdown.notify_one();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "session watchdog ended abnormally");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for WatchdogHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
