use std::time::Duration;

use log::info;

use crate::bus::{self, Bus};
use crate::error::{Error, Result};
use crate::resolver::ResolvedInstrument;

// Full-resolution screens can take several seconds to come across
pub const DEFAULT_CAPTURE_TIMEOUT:Duration = Duration::from_secs(10);

// Opens a fresh session on the resolved instrument and returns the screen bytes untouched
pub fn capture<B: Bus + ?Sized>(bus:&B, resolved:&ResolvedInstrument, timeout:Duration) -> Result<Vec<u8>> {
	info!("Capturing screen of {} ({})", resolved.address, resolved.grabber.name);
	let capture_screen = resolved.grabber.capture_screen;
	let buf = bus::with_instrument(bus, &resolved.address, timeout, |inst| capture_screen(inst))
		.map_err(|source| Error::CaptureFailed{ address: resolved.address.clone(), source })?;
	info!("Captured {} bytes", buf.len());
	Ok(buf)
}
