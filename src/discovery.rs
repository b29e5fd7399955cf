use std::time::Duration;

use log::{info, trace};

use crate::bus::{self, Bus};
use crate::error::{Error, Result};

pub const IDN_QUERY:&str = "*IDN?";

pub struct Discovery<'a, B: Bus + ?Sized> {
	bus: &'a B,
	timeout: Duration,
}

impl<'a, B: Bus + ?Sized> Discovery<'a, B> {

	pub fn new(bus:&'a B, timeout:Duration) -> Self { Self{ bus, timeout } }

	pub fn list_addresses(&self) -> Result<Vec<String>> {
		info!("Searching for instruments...");
		let addresses = self.bus.list_addresses().map_err(Error::Bus)?;
		trace!("Found instruments: {:?}", addresses);
		Ok(addresses)
	}

	// A failure here only costs this one address; it is logged and reported as "no answer"
	pub fn identify(&self, address:&str) -> Option<String> {
		match bus::with_instrument(self.bus, address, self.timeout, |inst| inst.query(IDN_QUERY)) {
			Ok(idn) => {
				trace!("{} => {}", address, idn);
				Some(idn)
			},
			Err(e) => {
				trace!("{} => None ({})", address, e);
				None
			},
		}
	}

}
