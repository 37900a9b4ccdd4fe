//! Analytics session: event queue plus HTTP transmission.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use mk_core::{
    AppKey, DeviceId, Event, EventQueue, Host, INGEST_PATH, Metrics, Request, RequestKind,
    Segmentation,
};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, SessionError};

/// Default request timeout for ingestion calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between session duration updates, matching Countly clients.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(60);

/// Builder for a [`Session`] with non-default settings.
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    app_key: String,
    host: String,
    device_id: Option<String>,
    app_version: Option<String>,
    timeout: Duration,
}

impl SessionBuilder {
    /// Reuses an existing device ID instead of generating a random one.
    #[must_use]
    pub fn device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Sets the application version reported when the session begins.
    #[must_use]
    pub fn app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = Some(version.into());
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the app key, host or device ID is invalid, or if
    /// the HTTP client fails to build.
    pub fn build(self) -> Result<Session> {
        let app_key = AppKey::new(self.app_key)?;
        let host = Host::new(self.host)?;
        let device_id = match self.device_id {
            Some(id) => DeviceId::new(id)?,
            None => DeviceId::new(Uuid::new_v4().to_string())?,
        };
        let mut metrics = Metrics::detect();
        if let Some(version) = self.app_version {
            metrics = metrics.with_app_version(version);
        }

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(SessionError::ClientBuild)?;

        Ok(Session {
            http,
            app_key,
            host,
            device_id,
            metrics,
            queue: Mutex::new(EventQueue::new()),
            last_report: Mutex::new(Instant::now()),
        })
    }
}

/// A tracked session against one analytics host.
///
/// # Thread Safety
///
/// `Session` is `Send + Sync`. Events may be added from any thread; the queue
/// lock is never held across a network call.
pub struct Session {
    http: reqwest::Client,
    app_key: AppKey,
    host: Host,
    device_id: DeviceId,
    metrics: Metrics,
    queue: Mutex<EventQueue>,
    last_report: Mutex<Instant>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.host)
            .field("device_id", &self.device_id)
            .field("pending_events", &self.pending_events())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session for the given app key and host with default settings.
    ///
    /// A host without a scheme is assumed to be `https://`.
    pub fn new(app_key: impl Into<String>, host: impl Into<String>) -> Result<Self> {
        Self::builder(app_key, host).build()
    }

    /// Starts building a session for the given app key and host.
    pub fn builder(app_key: impl Into<String>, host: impl Into<String>) -> SessionBuilder {
        SessionBuilder {
            app_key: app_key.into(),
            host: host.into(),
            device_id: None,
            app_version: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub const fn app_key(&self) -> &AppKey {
        &self.app_key
    }

    pub const fn host(&self) -> &Host {
        &self.host
    }

    pub const fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Queues an event for the next flush.
    ///
    /// An event matching a queued one by key and segmentation is merged into
    /// it. Never touches the network.
    pub fn add_event(
        &self,
        key: &str,
        segmentation: Segmentation,
        count: u32,
        sum: Option<f64>,
    ) -> Result<()> {
        let event = Event::new(key, segmentation, count, sum, Utc::now())?;
        let merged = lock(&self.queue).push(event);
        debug!(key, count, merged, "event queued");
        Ok(())
    }

    /// Number of distinct events waiting to be sent.
    pub fn pending_events(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Reports the start of the session along with device metrics.
    pub async fn begin(&self) -> Result<()> {
        *lock(&self.last_report) = Instant::now();
        self.send(RequestKind::BeginSession(self.metrics.clone()))
            .await?;
        info!(host = %self.host, device_id = %self.device_id, "session started");
        Ok(())
    }

    /// Reports the time elapsed since the last report, then flushes events.
    ///
    /// The reported time only counts as sent once the server accepts it, so a
    /// failed update carries its seconds into the next report. Events are
    /// flushed either way; the update error wins.
    pub async fn update(&self) -> Result<()> {
        let duration_secs = self.elapsed_secs();
        let updated = self
            .send(RequestKind::SessionUpdate { duration_secs })
            .await;
        if updated.is_ok() {
            self.mark_reported(duration_secs);
        }
        let flushed = self.flush().await;
        updated?;
        flushed?;
        Ok(())
    }

    /// Sends every queued event in a single request.
    ///
    /// Returns the number of events sent. An empty queue sends nothing. If the
    /// request fails, the drained events are dropped.
    pub async fn flush(&self) -> Result<usize> {
        let events = lock(&self.queue).drain();
        if events.is_empty() {
            return Ok(0);
        }

        let count = events.len();
        debug!(count, "flushing events");
        if let Err(err) = self.send(RequestKind::Events(events)).await {
            warn!(dropped = count, error = %err, "failed to send events");
            return Err(err);
        }
        Ok(count)
    }

    /// Flushes queued events and reports the end of the session.
    ///
    /// The end request is sent even if the flush fails; the first error wins.
    pub async fn end(&self) -> Result<()> {
        let flushed = self.flush().await;
        let duration_secs = self.elapsed_secs();
        let ended = self.send(RequestKind::EndSession { duration_secs }).await;
        if ended.is_ok() {
            self.mark_reported(duration_secs);
        }
        flushed?;
        ended?;
        info!(host = %self.host, "session ended");
        Ok(())
    }

    /// Spawns a task that calls [`Session::update`] every `interval`.
    ///
    /// Failures are logged and the loop keeps going. Abort the returned
    /// handle to stop it.
    pub fn spawn_heartbeat(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                ticker.tick().await;
                if let Err(err) = session.update().await {
                    warn!(error = %err, "session heartbeat failed");
                }
            }
        })
    }

    /// Whole seconds since the last accepted report.
    fn elapsed_secs(&self) -> u64 {
        lock(&self.last_report).elapsed().as_secs()
    }

    /// Moves the last report forward by `secs`; the remainder carries over.
    fn mark_reported(&self, secs: u64) {
        *lock(&self.last_report) += Duration::from_secs(secs);
    }

    async fn send(&self, kind: RequestKind) -> Result<()> {
        let name = kind.name();
        let request = Request {
            app_key: &self.app_key,
            device_id: &self.device_id,
            timestamp: Utc::now(),
            kind,
        };
        let params = request.form_params()?;

        let response = self
            .http
            .post(self.host.endpoint(INGEST_PATH))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SessionError::Server {
                status: status.as_u16(),
                body,
            });
        }

        parse_ingest_response(&body)?;
        debug!(request = name, "request accepted");
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn parse_ingest_response(body: &str) -> Result<()> {
    #[derive(Deserialize)]
    struct Payload {
        result: String,
    }

    let payload: Payload = serde_json::from_str(body)
        .map_err(|err| SessionError::InvalidResponse(format!("{err}: {body}")))?;
    if payload.result != "Success" {
        return Err(SessionError::InvalidResponse(payload.result));
    }
    Ok(())
}
