use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_FILENAME:&str = "grab-o-scope.png";

// Settings that can live in a TOML file.  Every key is optional; command line flags override them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	// Host names, IP addresses or TCPIP INSTR resource strings to try in addition to broadcast discovery
	pub hosts: Vec<String>,
	pub broadcast: bool,
	pub broadcast_timeout_ms: u64,
	pub identify_timeout_ms: u64,
	pub capture_timeout_ms: u64,
	pub trigger_poll_ms: u64,
	pub filename: PathBuf,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			hosts: vec![],
			broadcast: true,
			broadcast_timeout_ms: 1000,
			identify_timeout_ms: 2000,
			capture_timeout_ms: 10000,
			trigger_poll_ms: 1000,
			filename: PathBuf::from(DEFAULT_FILENAME),
		}
	}
}

impl Config {

	pub fn load(path:&Path) -> Result<Self> {
		let text = fs::read_to_string(path)
			.map_err(|e| Error::Config{ path: path.to_owned(), reason: e.to_string() })?;
		Self::parse(&text).map_err(|reason| Error::Config{ path: path.to_owned(), reason })
	}

	pub fn parse(text:&str) -> std::result::Result<Self, String> {
		toml::from_str(text).map_err(|e| e.to_string())
	}

	pub fn broadcast_window(&self) -> Option<Duration> {
		if self.broadcast { Some(Duration::from_millis(self.broadcast_timeout_ms)) } else { None }
	}

	pub fn identify_timeout(&self) -> Duration { Duration::from_millis(self.identify_timeout_ms) }
	pub fn capture_timeout(&self) -> Duration { Duration::from_millis(self.capture_timeout_ms) }
	pub fn trigger_poll_interval(&self) -> Duration { Duration::from_millis(self.trigger_poll_ms) }

}
