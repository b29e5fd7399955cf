use std::io::{self, Error, ErrorKind};
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::xdr;
use super::{initial_xid, xdr_pack, xdr_unpack};

// Large enough for any port mapper reply
const RECV_BUFF_LEN:usize = 8192;

pub struct BroadcastUdpClient {
	pub socket: UdpSocket,
	pub prog: u32,
	pub vers: u32,
	pub port: u16,
	pub lastxid: u32,
	pub packer: xdr::Packer,
	unpacker: xdr::Unpacker,
	recv_buff: Vec<u8>,
}

impl BroadcastUdpClient {

	// https://stackoverflow.com/questions/61045602/how-do-you-broadcast-a-udp-datagram-and-receive-the-responses-in-rust?noredirect=1#comment107997707_61045602

	pub fn bind(port:u16, prog: u32, vers: u32) -> io::Result<Self> {
		let socket:UdpSocket = UdpSocket::bind("0.0.0.0:0")?;
		socket.set_broadcast(true)?;

		Ok(Self{ socket, prog, vers, port, lastxid: initial_xid(), packer: xdr::Packer::new(), unpacker: xdr::Unpacker::new(), recv_buff: vec![0; RECV_BUFF_LEN] })
	}

	pub fn start_call(&mut self, prc:u32) -> io::Result<()> {
		self.lastxid = self.lastxid.wrapping_add(1);
		self.packer.reset();
		xdr_pack::pack_callheader_no_auth(&mut self.packer, self.lastxid, self.prog, self.vers, prc)
	}

	// Broadcasts the packed call and collects every reply with the right xid until `window` elapses.
	// Replies that fail to decode are dropped; one misbehaving host shouldn't hide the others.
	pub fn make_call(&mut self, window:Duration) -> io::Result<Vec<(SocketAddr, Vec<u8>)>> {
		let call:&[u8] = self.packer.as_bytes();
		let n = self.socket.send_to(call, ("255.255.255.255", self.port))?;
		if n != call.len() {
			return Err(Error::new(ErrorKind::Other, "Sent the wrong number of bytes"));
		}

		let deadline = Instant::now() + window;
		let mut replies = vec![];
		loop {
			let now = Instant::now();
			if now >= deadline { break; }
			self.socket.set_read_timeout(Some(deadline - now))?;

			let (n, addr) = match self.socket.recv_from(&mut self.recv_buff) {
				Ok(r) => r,
				Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => break,
				Err(e) => return Err(e),
			};

			self.unpacker.reset(&self.recv_buff[..n]);
			match xdr_unpack::unpack_replyheader(&mut self.unpacker) {
				Ok(xid) if xid == self.lastxid => replies.push((addr, self.unpacker.remaining().to_vec())),
				Ok(xid) => trace!("Ignoring broadcast reply from {} with xid={}", addr, xid),
				Err(e) => debug!("Ignoring malformed broadcast reply from {}: {}", addr, e),
			}
		}

		Ok(replies)
	}

}
