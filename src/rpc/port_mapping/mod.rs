pub const PMAP_PROG:u32 = 100000;
pub const PMAP_VERS:u32 = 2;
pub const PMAP_PORT:u16 = 111;

pub const PMAPPROC_GETPORT:u32 = 3;     // (mapping) -> unsigned int

use std::io::{self, Error, ErrorKind};
use std::net::IpAddr;
use std::time::Duration;

use log::debug;

use crate::xdr;

use super::{IPPROTO_TCP, IPPROTO_UDP};
use super::xdr_pack;
use super::tcp_clients::TcpClient;
use super::udp_clients::BroadcastUdpClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
	TCP,
	UDP,
}

impl Protocol {
	pub fn to_u32(&self) -> u32 { match self {
		Protocol::TCP => IPPROTO_TCP,
		Protocol::UDP => IPPROTO_UDP,
	}}
}

#[derive(Debug, Clone, Copy)]
pub struct Mapping {
	pub program: u32,
	pub version: u32,
	pub protocol: Protocol,
	pub port: u32,				// XDR encodes it as a u32 for alignment
}

fn pack_getport(packer:&mut xdr::Packer, m:&Mapping) -> io::Result<()> {
	xdr_pack::pack_mapping(packer, m.program, m.version, m.protocol.to_u32(), m.port)
}

fn unpack_port(unpacker:&mut xdr::Unpacker) -> io::Result<u16> {
	let port:u32 = unpacker.unpack_u32()?;
	if !unpacker.all_data_consumed() {
		return Err(Error::new(ErrorKind::InvalidData, "Data unexpectedly left over in unpacker after unpacking port"));
	}
	u16::try_from(port).map_err(|_| Error::new(ErrorKind::InvalidData, "Port mapper returned a port outside the u16 range"))
}

pub struct TcpPortMapperClient {
	pub host: String,
	pub tcp_client: TcpClient,
}

impl TcpPortMapperClient {

	pub fn new(host:&str, timeout:Duration) -> io::Result<Self> {
		let tcp_client = TcpClient::connect((host, PMAP_PORT), PMAP_PROG, PMAP_VERS, timeout)?;
		Ok(Self{ host: host.to_owned(), tcp_client })
	}

	// Zero means the program isn't registered on that host
	pub fn get_port(&mut self, m:&Mapping) -> io::Result<u16> {
		self.tcp_client.start_call(PMAPPROC_GETPORT)?;
		pack_getport(&mut self.tcp_client.packer, m)?;
		self.tcp_client.make_call()?;
		unpack_port(&mut self.tcp_client.unpacker)
	}

}

// Asks every port mapper on the local broadcast domain where `m.program` lives.  Hosts that don't
// have the program registered (port 0) or that send a garbled reply are left out.
pub fn broadcast_get_port(m:&Mapping, window:Duration) -> io::Result<Vec<(IpAddr, u16)>> {
	let mut client = BroadcastUdpClient::bind(PMAP_PORT, PMAP_PROG, PMAP_VERS)?;
	client.start_call(PMAPPROC_GETPORT)?;
	pack_getport(&mut client.packer, m)?;

	let mut ans:Vec<(IpAddr, u16)> = vec![];
	let mut unpacker = xdr::Unpacker::new();
	for (addr, body) in client.make_call(window)? {
		unpacker.reset(&body);
		match unpack_port(&mut unpacker) {
			Ok(0)    => debug!("{} runs a port mapper but has no mapping for program {:#x}", addr.ip(), m.program),
			Ok(port) => ans.push((addr.ip(), port)),
			Err(e)   => debug!("Unusable GETPORT reply from {}: {}", addr, e),
		}
	}

	Ok(ans)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn getport_reply_must_be_a_single_u32() {
		let mut p = xdr::Packer::new();
		p.pack_u32(1024).unwrap();
		p.pack_u32(0).unwrap();

		let mut u = xdr::Unpacker::new();
		u.reset(p.as_bytes());
		assert!(unpack_port(&mut u).is_err());
	}

	#[test]
	fn getport_rejects_out_of_range_port() {
		let mut p = xdr::Packer::new();
		p.pack_u32(70000).unwrap();

		let mut u = xdr::Unpacker::new();
		u.reset(p.as_bytes());
		assert!(unpack_port(&mut u).is_err());
	}
}
