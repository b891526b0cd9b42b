use std::fmt;
use std::time::Duration;

use crate::prelude::{println, *};
use colored::Colorize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::list::check_health;
use crate::client::ApiClient;
use crate::config::ApiConfig;

/// Default seconds between reachability checks
pub const DEFAULT_POLL_SECS: u64 = 30;

#[derive(Debug, clap::Args, Clone)]
pub struct HealthOptions {
    /// Keep polling until interrupted
    #[arg(long)]
    pub watch: bool,

    /// Seconds between checks in watch mode
    #[arg(long, default_value_t = DEFAULT_POLL_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,
}

/// Backend reachability as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    /// No check has completed yet
    Checking,
    Connected,
    Disconnected,
}

impl BackendStatus {
    fn from_reachable(reachable: bool) -> Self {
        if reachable {
            BackendStatus::Connected
        } else {
            BackendStatus::Disconnected
        }
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendStatus::Checking => write!(f, "checking"),
            BackendStatus::Connected => write!(f, "connected"),
            BackendStatus::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Periodic backend reachability check running in the background
///
/// The first check runs immediately, then once per interval. Subscribers are
/// only notified when the status actually changes. The polling task stops when
/// the monitor is stopped or dropped.
#[derive(Debug)]
pub struct HealthMonitor {
    status: watch::Receiver<BackendStatus>,
    task: JoinHandle<()>,
}

impl HealthMonitor {
    pub fn spawn(client: ApiClient, interval: Duration) -> Self {
        let (sender, status) = watch::channel(BackendStatus::Checking);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let next = BackendStatus::from_reachable(check_health(&client).await);
                let changed = sender.send_if_modified(|current| {
                    if *current == next {
                        false
                    } else {
                        *current = next;
                        true
                    }
                });

                if changed {
                    log::info!("Backend at {} is {}", client.base_url(), next);
                }
                if sender.is_closed() {
                    break;
                }
            }
        });

        Self { status, task }
    }

    /// Most recently observed status
    #[cfg(test)]
    pub fn status(&self) -> BackendStatus {
        *self.status.borrow()
    }

    /// Receiver notified on every status change
    pub fn subscribe(&self) -> watch::Receiver<BackendStatus> {
        self.status.clone()
    }

    pub fn stop(self) {
        // Drop aborts the task
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub async fn run(options: HealthOptions, global: crate::Global) -> Result<()> {
    let client = ApiClient::new(&ApiConfig::from_global(&global)?)?;

    if !options.watch {
        let status = BackendStatus::from_reachable(check_health(&client).await);
        print_status(client.base_url(), status);
        if status == BackendStatus::Disconnected {
            return Err(eyre!("Backend at {} is unreachable", client.base_url()));
        }
        return Ok(());
    }

    let monitor = HealthMonitor::spawn(client.clone(), Duration::from_secs(options.interval));
    let mut updates = monitor.subscribe();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = *updates.borrow_and_update();
                print_status(client.base_url(), status);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    monitor.stop();
    Ok(())
}

fn print_status(base_url: &str, status: BackendStatus) {
    match status {
        BackendStatus::Connected => {
            println!("{} {}", "●".green(), f!("Connected to {}", base_url));
        }
        BackendStatus::Disconnected => {
            println!("{} {}", "●".red(), f!("Cannot reach {}", base_url));
            println!(
                "  {}",
                "Make sure the backend server is running, or point --api-url at it.".bright_black()
            );
        }
        BackendStatus::Checking => {
            println!("{} {}", "●".yellow(), f!("Checking {}...", base_url));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, question_json};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    const WAIT: Duration = Duration::from_secs(5);

    async fn wait_for(monitor: &HealthMonitor, expected: BackendStatus) {
        let mut updates = monitor.subscribe();
        tokio::time::timeout(WAIT, updates.wait_for(|status| *status == expected))
            .await
            .expect("status change timed out")
            .expect("monitor stopped");
    }

    #[tokio::test]
    async fn test_monitor_reports_connected() {
        let router = Router::new().route(
            "/api/v1/questions",
            get(|| async {
                Json(json!({
                    "questions": [question_json(1)],
                    "pagination": {"total": 1, "page": 1, "limit": 1, "total_pages": 1}
                }))
            }),
        );
        let client = test_support::client(&test_support::spawn(router).await);

        let monitor = HealthMonitor::spawn(client, Duration::from_secs(30));
        wait_for(&monitor, BackendStatus::Connected).await;

        assert_eq!(monitor.status(), BackendStatus::Connected);
    }

    #[tokio::test]
    async fn test_monitor_reports_disconnected() {
        let client = test_support::client(&test_support::unreachable_base_url().await);

        let monitor = HealthMonitor::spawn(client, Duration::from_secs(30));
        assert_eq!(monitor.status(), BackendStatus::Checking);

        wait_for(&monitor, BackendStatus::Disconnected).await;
    }

    #[tokio::test]
    async fn test_stop_ends_polling() {
        let client = test_support::client(&test_support::unreachable_base_url().await);
        let monitor = HealthMonitor::spawn(client, Duration::from_millis(50));
        let mut updates = monitor.subscribe();

        monitor.stop();

        // The sender is dropped with the aborted task, so waiting ends with an error
        let result = tokio::time::timeout(WAIT, async {
            loop {
                if updates.changed().await.is_err() {
                    break;
                }
            }
        })
        .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(BackendStatus::Connected.to_string(), "connected");
        assert_eq!(BackendStatus::Disconnected.to_string(), "disconnected");
    }
}
