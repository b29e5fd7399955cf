use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};

use crate::bus::{self, Bus};
use crate::capture;
use crate::config::Config;
use crate::discovery::Discovery;
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::resolver::{ResolvedInstrument, Resolver};
use crate::trigger;

#[derive(Debug, Clone, Default)]
pub struct GrabOptions {
	pub name: Option<String>,
	pub filename: Option<PathBuf>,
	pub auto_view: bool,
	pub wait_trigger: Option<Duration>,
	// Put the scope into single-shot mode before waiting, so the grab shows the triggering acquisition
	pub arm: bool,
}

// Everything one run of the tool works with; the bus is opened by the caller and handed in
pub struct Session<'a, B: Bus + ?Sized> {
	bus: &'a B,
	registry: &'a Registry,
	config: &'a Config,
}

impl<'a, B: Bus + ?Sized> Session<'a, B> {

	pub fn new(bus:&'a B, registry:&'a Registry, config:&'a Config) -> Self { Self{ bus, registry, config } }

	fn resolver(&self) -> Resolver<'a, B> {
		Resolver::new(Discovery::new(self.bus, self.config.identify_timeout()), self.registry)
	}

	pub fn list(&self, name:Option<&str>) -> Result<Vec<ResolvedInstrument>> {
		self.resolver().candidates(name)
	}

	pub fn grab(&self, opts:&GrabOptions) -> Result<PathBuf> {
		let resolved = self.resolver().resolve(opts.name.as_deref())?;

		if let Some(timeout) = opts.wait_trigger {
			let interval = self.config.trigger_poll_interval();
			let arm = opts.arm;
			bus::with_instrument(self.bus, &resolved.address, self.config.identify_timeout(), |inst| {
				if arm {
					info!("Arming {} for a single acquisition", inst.address());
					(resolved.grabber.arm)(inst)?;
				}
				Ok(trigger::wait_for_trigger(inst, &resolved.grabber, timeout, interval))
			}).map_err(|source| Error::TriggerPoll{ address: resolved.address.clone(), source })??;
		}

		let filename = opts.filename.clone().unwrap_or_else(|| self.config.filename.clone());
		info!("Writing screen capture to {}", filename.display());

		let buf = capture::capture(self.bus, &resolved, self.config.capture_timeout())?;
		write_capture(&filename, &buf)?;

		if opts.auto_view {
			view_file(&filename);
		}
		Ok(filename)
	}

}

pub fn render_json(found:&[ResolvedInstrument]) -> Result<String> {
	serde_json::to_string_pretty(found).map_err(Error::Json)
}

pub fn write_capture(path:&Path, buf:&[u8]) -> Result<()> {
	info!("Writing {} bytes to {}", buf.len(), path.display());
	fs::write(path, buf).map_err(|source| Error::Output{ path: path.to_owned(), source })
}

// Hands the file to whatever the desktop uses for images; failing to open a viewer doesn't fail the grab
pub fn view_file(path:&Path) {
	if let Err(e) = opener::open(path) {
		warn!("Could not open {} in a viewer: {}", path.display(), e);
	}
}
