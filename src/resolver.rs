use log::{info, warn};
use serde::{Serialize, Serializer};

use crate::bus::Bus;
use crate::devices::Grabber;
use crate::discovery::Discovery;
use crate::error::{Error, Result};
use crate::registry::Registry;

fn grabber_name<S: Serializer>(g:&Grabber, s:S) -> std::result::Result<S::Ok, S::Error> {
	s.serialize_str(g.name)
}

// An instrument that answered *IDN? and is supported by one of the registered grabbers
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedInstrument {
	pub address: String,
	pub idn: String,
	#[serde(rename = "model", serialize_with = "grabber_name")]
	pub grabber: Grabber,
}

pub struct Resolver<'a, B: Bus + ?Sized> {
	discovery: Discovery<'a, B>,
	registry: &'a Registry,
}

impl<'a, B: Bus + ?Sized> Resolver<'a, B> {

	pub fn new(discovery:Discovery<'a, B>, registry:&'a Registry) -> Self { Self{ discovery, registry } }

	// Every recognized instrument whose address contains `name_filter`.  The filter is applied before
	// any instrument is contacted.
	pub fn candidates(&self, name_filter:Option<&str>) -> Result<Vec<ResolvedInstrument>> {
		let mut addresses = self.discovery.list_addresses()?;
		if let Some(name) = name_filter {
			addresses.retain(|a| a.contains(name));
		}

		info!("Searching for known oscilloscopes...");
		let mut found:Vec<ResolvedInstrument> = vec![];
		for address in addresses {
			let idn = match self.discovery.identify(&address) {
				Some(idn) => idn,
				None      => continue,
			};

			let matches = self.registry.all_matches(&idn);
			if matches.len() > 1 {
				warn!("{} matches more than one grabber ({}); using {}", idn,
					matches.iter().map(|g| g.name).collect::<Vec<_>>().join(", "), matches[0].name);
			}

			if let Some(grabber) = self.registry.find_grabber(&idn) {
				found.push(ResolvedInstrument{ address, idn, grabber: *grabber });
			}
		}

		info!("Found oscilloscopes: {:?}", found.iter().map(|r| r.address.as_str()).collect::<Vec<_>>());
		Ok(found)
	}

	pub fn resolve(&self, name_filter:Option<&str>) -> Result<ResolvedInstrument> {
		select_one(self.candidates(name_filter)?, name_filter)
	}

}

// None, exactly one, or too many: the only three outcomes of a resolution
pub fn select_one(mut candidates:Vec<ResolvedInstrument>, name_filter:Option<&str>) -> Result<ResolvedInstrument> {
	match candidates.len() {
		0 => Err(Error::NoInstrumentFound{ filter: name_filter.map(str::to_owned) }),
		1 => Ok(candidates.remove(0)),
		_ => Err(Error::AmbiguousInstrument{ candidates: candidates.into_iter().map(|r| r.address).collect() }),
	}
}
