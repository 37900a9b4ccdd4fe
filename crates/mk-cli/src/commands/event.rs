//! Event command for sending a single event in its own session.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use mk_client::{Segmentation, Session};

use crate::Config;
use crate::device::DeviceIdentity;

#[derive(Debug, Args)]
pub struct EventArgs {
    /// Event name (e.g., purchase).
    pub key: String,

    /// Number of occurrences.
    #[arg(long, default_value_t = 1)]
    pub count: u32,

    /// Numeric value attached to the event.
    #[arg(long)]
    pub sum: Option<f64>,

    /// Segmentation entry as key=value. Repeatable.
    #[arg(short, long = "segment", value_name = "KEY=VALUE", value_parser = parse_segment)]
    pub segments: Vec<(String, String)>,
}

impl EventArgs {
    fn segmentation(&self) -> Segmentation {
        self.segments.iter().cloned().collect()
    }
}

/// Begins a session, logs the event, and ends the session.
pub async fn run<W: Write>(
    writer: &mut W,
    args: &EventArgs,
    config: &Config,
    device: &DeviceIdentity,
) -> Result<()> {
    let app_key = config
        .app_key
        .as_deref()
        .context("no app_key configured; set it in config.toml or MK_APP_KEY")?;
    let host = config
        .host
        .as_deref()
        .context("no host configured; set it in config.toml or MK_HOST")?;

    let mut builder = Session::builder(app_key, host)
        .device_id(&device.device_id)
        .request_timeout(config.request_timeout());
    if let Some(version) = &config.app_version {
        builder = builder.app_version(version);
    }
    let session = builder.build().context("invalid session settings")?;

    session
        .add_event(&args.key, args.segmentation(), args.count, args.sum)
        .context("invalid event")?;
    session
        .begin()
        .await
        .with_context(|| format!("failed to start session at {}", session.host()))?;
    session
        .end()
        .await
        .with_context(|| format!("failed to send event to {}", session.host()))?;

    write!(writer, "Sent {} (count {}", args.key, args.count)?;
    if let Some(sum) = args.sum {
        write!(writer, ", sum {sum}")?;
    }
    writeln!(writer, ") to {}", session.host())?;
    Ok(())
}

fn parse_segment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("segment key cannot be empty in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
