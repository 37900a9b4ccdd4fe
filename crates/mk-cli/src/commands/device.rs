//! Device command for showing or resetting the device identity.

use std::io::Write;

use anyhow::Result;

use crate::device::{self, DeviceIdentity};

/// Runs the device command.
pub fn run<W: Write>(writer: &mut W, reset: bool) -> Result<()> {
    let identity = if reset {
        device::reset_device()?
    } else {
        device::load_or_init_device()?
    };
    render(writer, &identity)?;
    writeln!(writer, "Saved to:  {}", device::device_json_path()?.display())?;
    Ok(())
}

fn render<W: Write>(writer: &mut W, identity: &DeviceIdentity) -> Result<()> {
    writeln!(writer, "Device ID: {}", identity.device_id)?;
    writeln!(writer, "Label:     {}", identity.label)?;
    Ok(())
}
