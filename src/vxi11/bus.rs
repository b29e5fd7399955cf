use std::io;
use std::net::{IpAddr, ToSocketAddrs};
use std::time::Duration;

use log::{debug, info, warn};

use crate::bus::{Bus, Instrument};
use crate::rpc::port_mapping::{self, Mapping, Protocol};
use super::{CoreClient, DEVICE_CORE_PROG, DEVICE_CORE_VERS};
use super::resource::Resource;

// Addresses come from a fixed host list and, optionally, from whoever answers a port mapper broadcast
pub struct Vxi11Bus {
	hosts: Vec<Resource>,
	broadcast_window: Option<Duration>,
	connect_timeout: Duration,
}

impl Vxi11Bus {

	pub fn new(hosts:&[String], broadcast_window:Option<Duration>, connect_timeout:Duration) -> io::Result<Self> {
		let hosts = hosts.iter().map(|h| h.parse::<Resource>()).collect::<io::Result<Vec<Resource>>>()?;
		Ok(Self{ hosts, broadcast_window, connect_timeout })
	}

	fn broadcast(&self, window:Duration) -> io::Result<Vec<Resource>> {
		let mapping = Mapping {
			program: DEVICE_CORE_PROG,
			version: DEVICE_CORE_VERS,
			protocol: Protocol::TCP,
			port: 0,
		};

		let mut found = port_mapping::broadcast_get_port(&mapping, window)?;
		found.sort();
		Ok(found.into_iter().map(|(ip, _)| Resource::new(&ip.to_string())).collect())
	}

}

// Every IP a host name resolves to; an unresolvable name only matches itself
fn host_ips(host:&str) -> Vec<IpAddr> {
	match (host, 0u16).to_socket_addrs() {
		Ok(addrs) => addrs.map(|a| a.ip()).collect(),
		Err(e) => {
			debug!("Could not resolve {}: {}", host, e);
			vec![]
		},
	}
}

// The same instrument can show up once by name from the host list and again by IP from the broadcast.
// Two resources are one instrument when they share a device name and either the host string or any
// resolved IP.  The first occurrence wins, so configured names are kept over broadcast IPs.
fn dedup_resources<F>(resources:Vec<Resource>, resolve:F) -> Vec<Resource>
where
	F: Fn(&str) -> Vec<IpAddr>,
{
	let mut kept:Vec<(Resource, Vec<IpAddr>)> = vec![];
	for r in resources {
		let ips = resolve(&r.host);
		let seen = kept.iter().any(|(k, k_ips)| {
			k.device == r.device && (k.host == r.host || k_ips.iter().any(|ip| ips.contains(ip)))
		});
		if seen {
			debug!("Dropping {} as a duplicate", r);
		} else {
			kept.push((r, ips));
		}
	}
	kept.into_iter().map(|(r, _)| r).collect()
}

impl Bus for Vxi11Bus {

	fn list_addresses(&self) -> io::Result<Vec<String>> {
		let mut resources:Vec<Resource> = self.hosts.clone();

		if let Some(window) = self.broadcast_window {
			info!("Broadcasting for VXI-11 instruments...");
			match self.broadcast(window) {
				Ok(found) => resources.extend(found),
				// No route for the broadcast is not fatal when hosts were also given explicitly
				Err(e) if !self.hosts.is_empty() => warn!("VXI-11 broadcast failed: {}", e),
				Err(e) => return Err(e),
			}
		}

		let ans:Vec<String> = dedup_resources(resources, host_ips).iter().map(|r| r.to_string()).collect();
		debug!("Found instruments: {:?}", ans);
		Ok(ans)
	}

	fn open(&self, address:&str) -> io::Result<Box<dyn Instrument>> {
		let resource:Resource = address.parse()?;
		let mut core = CoreClient::new(&resource.host, self.connect_timeout)?;
		core.create_link(&resource.device)?;
		Ok(Box::new(Vxi11Instrument{ address: address.to_owned(), core }))
	}

}

pub struct Vxi11Instrument {
	address: String,
	core: CoreClient,
}

impl Instrument for Vxi11Instrument {

	fn address(&self) -> &str { &self.address }

	fn timeout(&self) -> Duration { self.core.io_timeout() }

	fn set_timeout(&mut self, timeout:Duration) -> io::Result<()> { self.core.set_io_timeout(timeout) }

	fn write(&mut self, cmd:&[u8]) -> io::Result<()> { self.core.write(cmd) }

	fn query_raw(&mut self, cmd:&[u8]) -> io::Result<Vec<u8>> { self.core.ask(cmd) }

	fn close(&mut self) -> io::Result<()> {
		if self.core.link().is_some() { self.core.destroy_link() }
		else { Ok(()) }
	}

}

impl Drop for Vxi11Instrument {

	fn drop(&mut self) {
		if let Err(e) = self.close() {
			warn!("Unable to destroy link for {}: {}", self.address, e);
		}
	}

}
