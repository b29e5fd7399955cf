use std::io::{self, Read, Write, Error, ErrorKind};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use byteorder::{BigEndian, WriteBytesExt, ReadBytesExt};
use log::trace;

use crate::xdr;
use super::{initial_xid, xdr_pack, xdr_unpack};

const LAST_FRAGMENT:u32 = 0x8000_0000;

// Guards against a corrupt record mark turning into a multi-gigabyte allocation
const MAX_FRAGMENT_LEN:usize = 64 * 1024 * 1024;

pub struct TcpClient {
	pub stream: TcpStream,
	pub prog: u32,
	pub vers: u32,
	pub lastxid: u32,
	pub packer: xdr::Packer,
	pub unpacker: xdr::Unpacker,
}

impl TcpClient {

	pub fn connect<A: ToSocketAddrs>(addr: A, prog: u32, vers: u32, timeout: Duration) -> io::Result<Self> {
		let mut last_err = Error::new(ErrorKind::NotFound, "Address did not resolve to anything");
		for sock_addr in addr.to_socket_addrs()? {
			match TcpStream::connect_timeout(&sock_addr, timeout) {
				Ok(stream) => {
					stream.set_nodelay(true)?;
					let mut client = Self{ stream, prog, vers, lastxid: initial_xid(), packer: xdr::Packer::new(), unpacker: xdr::Unpacker::new() };
					client.set_timeout(timeout)?;
					return Ok(client);
				},
				Err(e) => last_err = e,
			}
		}
		Err(last_err)
	}

	pub fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
		self.stream.set_read_timeout(Some(timeout))?;
		self.stream.set_write_timeout(Some(timeout))
	}

	// Resets the packer and writes the call header; procedure arguments get packed after this
	pub fn start_call(&mut self, prc:u32) -> io::Result<()> {
		self.lastxid = self.lastxid.wrapping_add(1);
		self.packer.reset();
		xdr_pack::pack_callheader_no_auth(&mut self.packer, self.lastxid, self.prog, self.vers, prc)
	}

	// Sends whatever is in the packer as a single record and leaves the reply body in the unpacker
	pub fn make_call(&mut self) -> io::Result<()> {
		let call:&[u8] = self.packer.as_bytes();
		let mut send_bytes:Vec<u8> = Vec::with_capacity(call.len() + 4);
		send_bytes.write_u32::<BigEndian>(call.len() as u32 | LAST_FRAGMENT)?;
		send_bytes.extend_from_slice(call);
		self.stream.write_all(&send_bytes)?;

		loop {
			let reply = read_record(&mut self.stream)?;
			self.unpacker.reset(&reply);

			let xid = xdr_unpack::unpack_replyheader(&mut self.unpacker)?;
			if xid == self.lastxid {
				return Ok(());
			} else if xid.wrapping_sub(self.lastxid) > u32::MAX / 2 {
				// Stale reply to an earlier call that timed out on our side
				trace!("Discarding stale RPC reply xid={} (expecting {})", xid, self.lastxid);
				continue;
			} else {
				return Err(Error::new(ErrorKind::InvalidData, "Received an RPC reply for a call that was never made"));
			}
		}
	}

}

pub fn read_record<R: Read>(rdr:&mut R) -> io::Result<Vec<u8>> {
	let mut reply:Vec<u8> = vec![];
	let mut last:bool = false;
	while !last {
		let x:u32 = rdr.read_u32::<BigEndian>()?;
		last = (x & LAST_FRAGMENT) != 0;
		let n = (x & !LAST_FRAGMENT) as usize;

		if reply.len() + n > MAX_FRAGMENT_LEN {
			return Err(Error::new(ErrorKind::InvalidData, "RPC record larger than the allowed maximum"));
		}

		let start = reply.len();
		reply.resize(start + n, 0);
		rdr.read_exact(&mut reply[start..])?;
	}
	Ok(reply)
}
