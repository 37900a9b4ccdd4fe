//! Analytics session client for a Countly-compatible server.
//!
//! Two ways in:
//! - [`MetricsKit`]: a process-wide facade. Start it once with
//!   [`MetricsKit::start_with_app_key`], then log events from anywhere.
//! - [`Session`]: an explicit session object the facade delegates to.
//!
//! Logging only queues events in memory. Nothing reaches the network until
//! [`Session::flush`], [`Session::update`] or [`Session::end`] runs, either
//! directly or from the background task started by
//! [`Session::spawn_heartbeat`].
//!
//! ```no_run
//! use mk_client::{MetricsKit, Segmentation};
//!
//! # async fn demo() -> mk_client::Result<()> {
//! MetricsKit::start_with_app_key("app-key", "stats.example.com").await?;
//!
//! MetricsKit::log_event("launch")?;
//! let mut segmentation = Segmentation::new();
//! segmentation.insert("screen".to_string(), "settings".to_string());
//! MetricsKit::log_event_with_segmentation_and_count("view", segmentation, 2)?;
//!
//! MetricsKit::end().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod facade;
mod session;

pub use error::{Result, SessionError};
pub use facade::MetricsKit;
pub use mk_core::{Event, Metrics, Segmentation};
pub use session::{DEFAULT_HEARTBEAT_INTERVAL, Session, SessionBuilder};
