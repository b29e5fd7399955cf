use std::fmt;
use std::io::{self, Error, ErrorKind};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

pub const DEFAULT_DEVICE:&str = "inst0";

lazy_static! {
	static ref RESOURCE_RE: Regex = Regex::new(r"(?i)^TCPIP(\d*)::([^:]+)(?:::([^:]+))?::INSTR$").unwrap();
	static ref HOST_RE: Regex     = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.\-]*$").unwrap();
}

// A VISA-style TCPIP INSTR resource, the only kind of address VXI-11 can reach
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
	pub board: u32,
	pub host: String,
	pub device: String,
}

impl Resource {
	pub fn new(host:&str) -> Self {
		Self{ board: 0, host: host.to_owned(), device: DEFAULT_DEVICE.to_owned() }
	}
}

impl FromStr for Resource {
	type Err = io::Error;

	// Accepts either a full resource string or a bare host name / IP address
	fn from_str(s:&str) -> io::Result<Self> {
		let s = s.trim();

		if let Some(caps) = RESOURCE_RE.captures(s) {
			let board:u32 = match caps.get(1).map(|m| m.as_str()) {
				Some("") | None => 0,
				Some(n)         => n.parse().map_err(|_| Error::new(ErrorKind::InvalidInput, "Board number out of range"))?,
			};
			let device = caps.get(3).map_or(DEFAULT_DEVICE, |m| m.as_str());
			if device.to_ascii_lowercase().starts_with("hislip") {
				return Err(Error::new(ErrorKind::InvalidInput, format!("HiSLIP resource {} can't be reached over VXI-11", s)));
			}
			return Ok(Self{ board, host: caps[2].to_owned(), device: device.to_owned() });
		}

		if HOST_RE.is_match(s) {
			return Ok(Self::new(s));
		}

		Err(Error::new(ErrorKind::InvalidInput, format!("Not a TCPIP INSTR resource or host name: {:?}", s)))
	}
}

impl fmt::Display for Resource {
	fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result {
		write!(f, "TCPIP{}::{}::{}::INSTR", self.board, self.host, self.device)
	}
}
