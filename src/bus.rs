// The minimal transport surface the grabbing logic needs.  Anything that can enumerate addresses and
// open a message-based session on one of them can be used as a bus.

use std::io::{self, Error, ErrorKind};
use std::str;
use std::time::Duration;

use log::warn;

use crate::ieee488::{self, ElementWidth};

pub trait Bus {
	fn list_addresses(&self) -> io::Result<Vec<String>>;
	fn open(&self, address:&str) -> io::Result<Box<dyn Instrument>>;
}

pub trait Instrument {
	fn address(&self) -> &str;
	fn timeout(&self) -> Duration;
	fn set_timeout(&mut self, timeout:Duration) -> io::Result<()>;

	// Sends a command that has no response
	fn write(&mut self, cmd:&[u8]) -> io::Result<()>;

	// Sends a command and returns the complete response message
	fn query_raw(&mut self, cmd:&[u8]) -> io::Result<Vec<u8>>;

	fn close(&mut self) -> io::Result<()>;

	fn query(&mut self, cmd:&str) -> io::Result<String> {
		let resp = self.query_raw(cmd.as_bytes())?;
		str::from_utf8(&resp)
			.map(|s| s.trim().to_owned())
			.map_err(|_| Error::new(ErrorKind::InvalidData, "Unable to parse response as UTF-8"))
	}

	fn query_binary_values(&mut self, cmd:&str, width:ElementWidth) -> io::Result<Vec<u8>> {
		let resp = self.query_raw(cmd.as_bytes())?;
		ieee488::decode_values(&resp, width)
	}
}

// Opens `address`, runs `f` on it and closes the session again on every path out.  A failed close
// after a successful `f` is only logged; the result is already in hand.
pub fn with_instrument<B, T, F>(bus:&B, address:&str, timeout:Duration, f:F) -> io::Result<T>
where
	B: Bus + ?Sized,
	F: FnOnce(&mut dyn Instrument) -> io::Result<T>,
{
	let mut inst = bus.open(address)?;
	let result = inst.set_timeout(timeout).and_then(|_| f(inst.as_mut()));
	if let Err(e) = inst.close() {
		warn!("Failed to close {}: {}", address, e);
	}
	result
}
