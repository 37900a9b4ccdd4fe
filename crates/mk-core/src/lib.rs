//! Core domain logic for MetricsKit.
//!
//! This crate contains the I/O-free pieces of the analytics client:
//! - Validated identifiers: app keys, hosts, event keys, device IDs
//! - Events and the aggregating queue they wait in before transmission
//! - Encoding of Countly ingestion requests

pub mod event;
pub mod queue;
pub mod request;
pub mod types;

pub use event::{Event, Segmentation};
pub use queue::EventQueue;
pub use request::{Metrics, Request, RequestKind, INGEST_PATH, SDK_NAME, SDK_VERSION};
pub use types::{AppKey, DeviceId, EventKey, Host, ValidationError};
