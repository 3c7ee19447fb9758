/*
 * One-shot background check deciding whether the download feature can be
 * offered. The probe may take a while (it goes over the network), so it runs
 * on a worker thread. The worker never touches UI state: it hands the
 * outcome to a `ResultSink`, which on Windows posts a message back to the
 * UI thread.
 *
 * A shared "running" flag de-duplicates triggers: while a check is in
 * flight, further triggers are refused. There is no cancellation, retry or
 * timeout of its own.
 */
use crate::error::{PlatformError, Result as PlatformResult};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

/// Decides whether `url` can be downloaded from.
pub trait Probe: Send + 'static {
    fn is_reachable(&self, url: &str) -> bool;
}

impl<F> Probe for F
where
    F: Fn(&str) -> bool + Send + 'static,
{
    fn is_reachable(&self, url: &str) -> bool {
        self(url)
    }
}

/// Receives the outcome on the worker thread and forwards it to its owner.
pub trait ResultSink: Send + 'static {
    fn deliver(&self, available: bool);
}

impl ResultSink for Sender<bool> {
    fn deliver(&self, available: bool) {
        if self.send(available).is_err() {
            log::debug!("DownloadCheck: Result receiver is gone, dropping result");
        }
    }
}

#[derive(Debug)]
pub enum CheckStart {
    /// A worker was spawned; joining is optional.
    Started(JoinHandle<()>),
    AlreadyRunning,
    InvalidUrl,
    PrerequisiteMissing,
}

impl CheckStart {
    pub fn is_started(&self) -> bool {
        matches!(self, CheckStart::Started(_))
    }
}

struct RunningFlag(Arc<AtomicBool>);

impl Drop for RunningFlag {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone)]
pub struct DownloadCheck {
    running: Arc<AtomicBool>,
    allowed_prefix: String,
}

impl DownloadCheck {
    pub fn new(allowed_prefix: impl Into<String>) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            allowed_prefix: allowed_prefix.into(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn is_allowed_url(&self, url: &str) -> bool {
        !self.allowed_prefix.is_empty() && url.starts_with(&self.allowed_prefix)
    }

    /*
     * Starts a check of `url` unless one is already running or the URL is
     * outside the allowed prefix. The flag is cleared before the result is
     * delivered, so the receiver may immediately trigger again.
     */
    pub fn trigger<P, S>(&self, url: &str, probe: P, sink: S) -> PlatformResult<CheckStart>
    where
        P: Probe,
        S: ResultSink,
    {
        if !self.is_allowed_url(url) {
            log::warn!("DownloadCheck: Download script URL {url} is invalid");
            return Ok(CheckStart::InvalidUrl);
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("DownloadCheck: A check is already running");
            return Ok(CheckStart::AlreadyRunning);
        }

        let flag = RunningFlag(self.running.clone());
        let url = url.to_string();
        let spawned = std::thread::Builder::new()
            .name("download-check".to_string())
            .spawn(move || {
                let available = probe.is_reachable(&url);
                log::info!(
                    "DownloadCheck: {url} is {}",
                    if available { "reachable" } else { "not reachable" }
                );
                drop(flag);
                sink.deliver(available);
            });

        match spawned {
            Ok(handle) => Ok(CheckStart::Started(handle)),
            Err(err) => {
                // The closure (and its flag guard) was dropped by the failed spawn.
                log::error!("DownloadCheck: Could not spawn worker: {err}");
                Err(PlatformError::OperationFailed(format!(
                    "could not spawn download check: {err}"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    const PREFIX: &str = "https://github.com/Smu1zel/Whitebar";

    fn join(start: CheckStart) {
        match start {
            CheckStart::Started(handle) => handle.join().expect("worker panicked"),
            other => panic!("expected a started check, got {other:?}"),
        }
    }

    #[test]
    fn result_is_delivered_through_sink_and_flag_cleared() {
        let check = DownloadCheck::new(PREFIX);
        let (tx, rx) = mpsc::channel();

        let start = check
            .trigger(&format!("{PREFIX}/releases/latest/download/Whitebar.ps1"), |_: &str| true, tx)
            .unwrap();
        join(start);

        assert_eq!(rx.recv().unwrap(), true);
        assert!(!check.is_running());
    }

    #[test]
    fn trigger_while_running_is_refused() {
        let check = DownloadCheck::new(PREFIX);
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (tx, rx) = mpsc::channel();
        let url = format!("{PREFIX}/Whitebar.ps1");

        let probe = move |_: &str| {
            release_rx.recv().ok();
            false
        };
        let first = check.trigger(&url, probe, tx.clone()).unwrap();
        assert!(first.is_started());
        assert!(check.is_running());

        let second = check.trigger(&url, |_: &str| true, tx).unwrap();
        assert!(matches!(second, CheckStart::AlreadyRunning));

        release_tx.send(()).unwrap();
        join(first);
        assert_eq!(rx.recv().unwrap(), false);
        assert!(rx.try_recv().is_err(), "refused trigger must not deliver");

        let (tx, rx) = mpsc::channel();
        join(check.trigger(&url, |_: &str| true, tx).unwrap());
        assert_eq!(rx.recv().unwrap(), true);
    }

    #[test]
    fn url_outside_allowed_prefix_is_not_probed() {
        let check = DownloadCheck::new(PREFIX);
        let (tx, rx) = mpsc::channel();
        let start = check
            .trigger("https://example.com/Whitebar.ps1", |_: &str| -> bool { panic!("probed") }, tx)
            .unwrap();
        assert!(matches!(start, CheckStart::InvalidUrl));
        assert!(!check.is_running());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn empty_prefix_allows_nothing() {
        let check = DownloadCheck::new("");
        assert!(!check.is_allowed_url("https://github.com/Smu1zel/Whitebar"));
    }
}
