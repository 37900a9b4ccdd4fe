//! Process-wide logging facade.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use mk_core::Segmentation;
use tokio::task::JoinHandle;

use crate::error::{Result, SessionError};
use crate::session::{DEFAULT_HEARTBEAT_INTERVAL, Session};

static GLOBAL: Registry = Registry::new();

/// Holds at most one session for the lifetime of the process.
///
/// Once ended, the registry rejects logging, flushing and ending with
/// [`SessionError::Ended`] and cannot be started again.
pub(crate) struct Registry {
    session: OnceLock<Arc<Session>>,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
    ended: AtomicBool,
}

impl Registry {
    pub(crate) const fn new() -> Self {
        Self {
            session: OnceLock::new(),
            heartbeat: Mutex::new(None),
            ended: AtomicBool::new(false),
        }
    }

    /// Registers the session, starts its heartbeat, then reports its start.
    ///
    /// The session stays registered if the begin request fails, so events
    /// logged afterwards are kept for the next heartbeat or flush.
    pub(crate) async fn start(&self, session: Session) -> Result<()> {
        self.session
            .set(Arc::new(session))
            .map_err(|_| SessionError::AlreadyStarted)?;
        let session = self.get()?;
        let handle = session.spawn_heartbeat(DEFAULT_HEARTBEAT_INTERVAL);
        *self
            .heartbeat
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
        session.begin().await
    }

    /// Stops the heartbeat and ends the session.
    ///
    /// Only the first call reports the end; later calls fail with
    /// [`SessionError::Ended`].
    pub(crate) async fn end(&self) -> Result<()> {
        let session = self.get()?;
        if self.ended.swap(true, Ordering::SeqCst) {
            return Err(SessionError::Ended);
        }
        let handle = self
            .heartbeat
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
        session.end().await
    }

    pub(crate) fn get(&self) -> Result<&Arc<Session>> {
        self.session.get().ok_or(SessionError::NotStarted)
    }

    /// The registered session, unless it has been ended.
    fn active(&self) -> Result<&Arc<Session>> {
        let session = self.get()?;
        if self.ended.load(Ordering::SeqCst) {
            return Err(SessionError::Ended);
        }
        Ok(session)
    }

    pub(crate) fn log(&self, key: &str, segmentation: Segmentation, count: u32) -> Result<()> {
        self.active()?.add_event(key, segmentation, count, None)
    }

    pub(crate) async fn flush(&self) -> Result<usize> {
        self.active()?.flush().await
    }
}

/// Static entry points for starting a session and logging events.
///
/// Logging calls only queue events. Queued events are sent by the heartbeat
/// started with the session (every [`DEFAULT_HEARTBEAT_INTERVAL`]), or right
/// away by [`MetricsKit::flush`] and [`MetricsKit::end`].
///
/// The facade runs one session per process. After [`MetricsKit::end`],
/// logging, flushing and ending again fail with [`SessionError::Ended`].
#[derive(Debug)]
pub struct MetricsKit;

impl MetricsKit {
    /// Starts the process-wide session at `host` with the given app key.
    ///
    /// Fails with [`SessionError::AlreadyStarted`] on a second call, including
    /// after the session has ended.
    pub async fn start_with_app_key(key: &str, host: &str) -> Result<()> {
        GLOBAL.start(Session::new(key, host)?).await
    }

    /// Logs one occurrence of an event.
    pub fn log_event(key: &str) -> Result<()> {
        GLOBAL.log(key, Segmentation::new(), 1)
    }

    /// Logs `count` occurrences of an event.
    pub fn log_event_with_count(key: &str, count: u32) -> Result<()> {
        GLOBAL.log(key, Segmentation::new(), count)
    }

    /// Logs one occurrence of an event with segmentation.
    pub fn log_event_with_segmentation(key: &str, segmentation: Segmentation) -> Result<()> {
        GLOBAL.log(key, segmentation, 1)
    }

    /// Logs `count` occurrences of an event with segmentation.
    pub fn log_event_with_segmentation_and_count(
        key: &str,
        segmentation: Segmentation,
        count: u32,
    ) -> Result<()> {
        GLOBAL.log(key, segmentation, count)
    }

    /// Sends queued events now. Returns how many were sent.
    pub async fn flush() -> Result<usize> {
        GLOBAL.flush().await
    }

    /// Stops the heartbeat, flushes queued events and ends the session.
    pub async fn end() -> Result<()> {
        GLOBAL.end().await
    }

    /// The registered session, if one has been started.
    pub fn session() -> Option<Arc<Session>> {
        GLOBAL.get().ok().cloned()
    }
}
