//! Background discovery and connection.
//!
//! A [`Task`] runs one blocking operation on its own thread. The caller
//! either blocks on it, polls it, or hands it a continuation. Dropping a
//! task abandons it: work that has not started is skipped and a result that
//! arrives later is dropped, which closes any connection it carried.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::{ConnectionType, Device, PrintError, PrinterSession, SessionConfig, transport};

/// The eventual result of background work.
#[must_use = "dropping a task abandons it"]
pub struct Task<T> {
    rx: Receiver<Result<T, PrintError>>,
    abandoned: Arc<AtomicBool>,
    taken: AtomicBool,
}

impl<T: Send + 'static> Task<T> {
    pub(crate) fn spawn<F>(name: String, work: F) -> Self
    where
        F: FnOnce() -> Result<T, PrintError> + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(1);
        let abandoned = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&abandoned);
        let spawned = thread::Builder::new().name(name).spawn(move || {
            if flag.load(Ordering::SeqCst) {
                return;
            }
            let _ = tx.send(work());
        });
        if let Err(e) = spawned {
            warn!(error = %e, "cannot spawn background task");
        }
        Self {
            rx,
            abandoned,
            taken: AtomicBool::new(false),
        }
    }

    /// Block until the work finishes.
    pub fn wait(self) -> Result<T, PrintError> {
        if self.taken.load(Ordering::SeqCst) {
            return Err(PrintError::TaskAborted);
        }
        self.rx.recv().unwrap_or(Err(PrintError::TaskAborted))
    }

    /// Block for at most `timeout`. `None` means still running.
    ///
    /// A result is handed out once; later calls report
    /// [`PrintError::TaskAborted`].
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T, PrintError>> {
        if self.taken.load(Ordering::SeqCst) {
            return Some(Err(PrintError::TaskAborted));
        }
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(self.hand_out(result)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(self.hand_out(Err(PrintError::TaskAborted))),
        }
    }

    /// Take the result if the work has finished. Same hand-out rule as
    /// [`wait_timeout`](Self::wait_timeout).
    pub fn try_take(&self) -> Option<Result<T, PrintError>> {
        if self.taken.load(Ordering::SeqCst) {
            return Some(Err(PrintError::TaskAborted));
        }
        match self.rx.try_recv() {
            Ok(result) => Some(self.hand_out(result)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.hand_out(Err(PrintError::TaskAborted))),
        }
    }

    /// Whether a result has already been handed out.
    pub fn is_taken(&self) -> bool {
        self.taken.load(Ordering::SeqCst)
    }

    fn hand_out(&self, result: Result<T, PrintError>) -> Result<T, PrintError> {
        self.taken.store(true, Ordering::SeqCst);
        result
    }

    /// Run `done` with the result on a helper thread once the work
    /// finishes.
    pub fn then<F>(self, done: F)
    where
        F: FnOnce(Result<T, PrintError>) + Send + 'static,
    {
        let spawned = thread::Builder::new()
            .name("tspl-task-continuation".into())
            .spawn(move || done(self.wait()));
        if let Err(e) = spawned {
            warn!(error = %e, "cannot spawn task continuation");
        }
    }
}

impl<T> Drop for Task<T> {
    fn drop(&mut self) {
        self.abandoned.store(true, Ordering::SeqCst);
    }
}

impl<T> std::fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

/// Discover over several transports in parallel.
///
/// Each transport gets the configured discovery window. Devices from every
/// transport that succeeded are returned; the first error is reported only
/// if all of them failed.
pub fn spawn_discover(kinds: &[ConnectionType], config: &SessionConfig) -> Task<Vec<Device>> {
    let kinds = kinds.to_vec();
    let config = config.clone();
    Task::spawn("tspl-discover".into(), move || discover_all(&kinds, &config))
}

fn discover_all(kinds: &[ConnectionType], config: &SessionConfig) -> Result<Vec<Device>, PrintError> {
    let timeout = config.discovery_timeout;
    let results: Vec<Result<Vec<Device>, PrintError>> = thread::scope(|scope| {
        let workers: Vec<_> = kinds
            .iter()
            .map(|&kind| scope.spawn(move || transport::discover(kind, timeout, config)))
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().unwrap_or(Err(PrintError::TaskAborted)))
            .collect()
    });

    let mut devices: Vec<Device> = Vec::new();
    let mut first_error = None;
    let mut any_ok = kinds.is_empty();
    for result in results {
        match result {
            Ok(found) => {
                any_ok = true;
                for device in found {
                    if !devices
                        .iter()
                        .any(|d| d.kind == device.kind && d.target == device.target)
                    {
                        devices.push(device);
                    }
                }
            }
            Err(e) => {
                debug!(error = %e, "discovery failed for one transport");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) if !any_ok => Err(e),
        _ => Ok(devices),
    }
}

/// Connect `session` to `device` on a background thread.
///
/// The task yields the connected session. Observers subscribed before the
/// call see `Connected` from the background thread.
pub fn spawn_connect(session: PrinterSession, device: Device) -> Task<PrinterSession> {
    Task::spawn(format!("tspl-connect-{}", device.target), move || {
        let mut session = session;
        session.connect(&device)?;
        Ok(session)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventKind, SessionState};
    use std::net::TcpListener;

    #[test]
    fn wait_returns_the_result() {
        let task = Task::spawn("t".into(), || Ok(7));
        assert_eq!(task.wait().unwrap(), 7);
    }

    #[test]
    fn panicking_work_aborts() {
        let task: Task<u8> = Task::spawn("t".into(), || panic!("boom"));
        assert!(matches!(task.wait(), Err(PrintError::TaskAborted)));
    }

    #[test]
    fn wait_timeout_reports_running_work() {
        let (release, gate) = mpsc::channel::<()>();
        let task = Task::spawn("t".into(), move || {
            let _ = gate.recv();
            Ok(1)
        });
        assert!(task.wait_timeout(Duration::from_millis(20)).is_none());
        assert!(task.try_take().is_none());
        release.send(()).unwrap();
        assert_eq!(task.wait_timeout(Duration::from_secs(5)).unwrap().unwrap(), 1);
        assert!(task.is_taken());
        assert!(matches!(task.try_take(), Some(Err(PrintError::TaskAborted))));
        assert!(matches!(
            task.wait_timeout(Duration::from_millis(1)),
            Some(Err(PrintError::TaskAborted))
        ));
    }

    #[test]
    fn polled_result_is_handed_out_once() {
        let task = Task::spawn("t".into(), || Ok(3));
        let mut first = None;
        for _ in 0..500 {
            if let Some(result) = task.try_take() {
                first = Some(result);
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(first.unwrap().unwrap(), 3);
        assert!(matches!(task.try_take(), Some(Err(PrintError::TaskAborted))));
        assert!(matches!(task.wait(), Err(PrintError::TaskAborted)));
    }

    #[test]
    fn continuation_receives_the_result() {
        let (tx, rx) = mpsc::channel();
        Task::spawn("t".into(), || Ok("done")).then(move |r| {
            let _ = tx.send(r.unwrap());
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "done");
    }

    #[test]
    fn network_only_discovery_is_unsupported() {
        let task = spawn_discover(&[ConnectionType::Net], &SessionConfig::default());
        assert!(matches!(task.wait(), Err(PrintError::Unsupported(_))));
    }

    #[test]
    fn discovering_nothing_finds_nothing() {
        let task = spawn_discover(&[], &SessionConfig::default());
        assert!(task.wait().unwrap().is_empty());
    }

    #[test]
    fn background_connect_yields_a_connected_session() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let device = Device::net(listener.local_addr().unwrap().to_string());
        let session = PrinterSession::default();
        let events = session.subscribe();

        let mut session = session.connect_in_background(device).wait().unwrap();
        assert_eq!(session.state(), SessionState::Connected);
        let handle = session.handle().unwrap();
        assert_eq!(
            events.recv_timeout(Duration::from_secs(5)).unwrap().kind,
            EventKind::Connected
        );
        session.disconnect();
        let last = events.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(last.handle, handle);
        assert_eq!(last.kind, EventKind::Disconnected);
    }

    #[test]
    fn background_connect_failure_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let task = spawn_connect(PrinterSession::default(), Device::net(addr.to_string()));
        assert!(matches!(task.wait(), Err(PrintError::ConnectFailed { .. })));
    }
}
