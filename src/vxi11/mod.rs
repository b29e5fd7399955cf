// Device core
pub const DEVICE_CORE_PROG:u32  = 0x0607af;
pub const DEVICE_CORE_VERS:u32  = 1;
pub const CREATE_LINK:u32       = 10;
pub const DEVICE_WRITE:u32      = 11;
pub const DEVICE_READ:u32       = 12;
pub const DESTROY_LINK:u32      = 23;

pub const CLIENT_ID:i32 = 3333;
pub const DEFAULT_LOCK_TIMEOUT:u32 = 10000;

pub const OPERATION_FLAGS_END_ONLY:i32 = 8;

// Reason bits in a device_read reply
pub const REASON_REQCNT:i32 = 1;
pub const REASON_CHR:i32    = 2;
pub const REASON_END:i32    = 4;

use std::io::{self, Error, ErrorKind};
use std::time::Duration;

use log::debug;

use crate::rpc::port_mapping::{TcpPortMapperClient, Mapping, Protocol};
use crate::rpc::tcp_clients::TcpClient;

fn err(msg:&str) -> io::Error { Error::new(ErrorKind::Other, msg) }

// Translates a VXI-11 device_error code into an io::Error
fn device_error(code:i32) -> io::Error {
	match code {
		1  => err("Syntax error"),
		3  => Error::new(ErrorKind::NotFound, "Device not accessible"),
		4  => err("Invalid link identifier"),
		5  => err("Parameter error"),
		9  => err("Out of resources"),
		11 => err("Device locked by another link"),
		15 => Error::new(ErrorKind::TimedOut, "I/O timeout"),
		17 => err("I/O error"),
		21 => Error::new(ErrorKind::InvalidInput, "Invalid address"),
		23 => Error::new(ErrorKind::Interrupted, "Abort"),
		_  => err("Unknown VXI-11 device error"),
	}
}

fn timeout_ms(d:Duration) -> u32 { d.as_millis().min(u32::MAX as u128) as u32 }

// The socket has to outlive the device-side timeout or we'd drop replies the device is still allowed to send
const SOCKET_TIMEOUT_MARGIN:Duration = Duration::from_secs(2);

pub mod xdr_pack;
pub mod resource;
pub mod bus;

pub struct CoreClient {
	client: TcpClient,
	opt_link: Option<Link>,
	io_timeout: Duration,
}

pub struct Link {
	pub link_id: i32,
	pub abort_port: u16,
	pub max_recv_size: u32,
}

impl CoreClient {

	fn get_link(&self) -> io::Result<i32> {
		match self.opt_link {
			Some(Link{ link_id, .. }) => Ok(link_id),
			None => Err(err("No link")),
		}
	}

	pub fn new(host:&str, io_timeout:Duration) -> io::Result<Self> {

		// Find the port to use for the core program
		let mut pmap_client = TcpPortMapperClient::new(host, io_timeout)?;

		let mapping = Mapping {
			program: DEVICE_CORE_PROG,
			version: DEVICE_CORE_VERS,
			protocol: Protocol::TCP,
			port: 0,
		};

		let port = pmap_client.get_port(&mapping)?;
		if port == 0 {
			return Err(Error::new(ErrorKind::NotFound, "Host has no VXI-11 core channel registered"));
		}
		debug!("{} serves the VXI-11 core channel on port {}", host, port);

		let client = TcpClient::connect((host, port), DEVICE_CORE_PROG, DEVICE_CORE_VERS, io_timeout + SOCKET_TIMEOUT_MARGIN)?;

		Ok(CoreClient { client, opt_link: None, io_timeout })
	}

	pub fn io_timeout(&self) -> Duration { self.io_timeout }

	pub fn set_io_timeout(&mut self, io_timeout:Duration) -> io::Result<()> {
		self.client.set_timeout(io_timeout + SOCKET_TIMEOUT_MARGIN)?;
		self.io_timeout = io_timeout;
		Ok(())
	}

	pub fn link(&self) -> Option<&Link> { self.opt_link.as_ref() }

	pub fn create_link(&mut self, device:&str) -> io::Result<()> {
		if self.opt_link.is_some() {
			return Err(err("Already connected to a link"));
		}

		self.client.start_call(CREATE_LINK)?;
		xdr_pack::pack_create_link_parms(&mut self.client.packer, CLIENT_ID, false, DEFAULT_LOCK_TIMEOUT, device)?;
		self.client.make_call()?;

		let error:i32         = self.client.unpacker.unpack_i32()?;
		let link_id:i32       = self.client.unpacker.unpack_i32()?;
		let abort_port:u32    = self.client.unpacker.unpack_u32()?;
		let max_recv_size:u32 = self.client.unpacker.unpack_u32()?;

		if error != 0 {
			return Err(device_error(error));
		}

		debug!("Created link {} to {} (max_recv_size={})", link_id, device, max_recv_size);
		self.opt_link = Some(Link{ link_id, abort_port: abort_port as u16, max_recv_size });
		Ok(())
	}

	pub fn ask(&mut self, data:&[u8]) -> io::Result<Vec<u8>> {
		self.write(data)?;
		self.read()
	}

	pub fn write(&mut self, data:&[u8]) -> io::Result<()> {
		let link_id:i32 = self.get_link()?;
		let io_timeout = timeout_ms(self.io_timeout);

		self.client.start_call(DEVICE_WRITE)?;
		xdr_pack::pack_device_write_parms(&mut self.client.packer, link_id, io_timeout, DEFAULT_LOCK_TIMEOUT, OPERATION_FLAGS_END_ONLY, data)?;
		self.client.make_call()?;

		let error:i32 = self.client.unpacker.unpack_i32()?;
		let size:u32  = self.client.unpacker.unpack_u32()?;

		if error != 0 {
			return Err(device_error(error));
		}
		if size as usize != data.len() {
			return Err(err("Number of bytes in confirmation doesn't match number of bytes sent"));
		}
		Ok(())
	}

	// Keeps issuing device_read until the device flags the end of the message; large transfers like
	// screen images arrive in several chunks capped by the requested size
	pub fn read(&mut self) -> io::Result<Vec<u8>> {
		let link_id:i32 = self.get_link()?;
		let io_timeout = timeout_ms(self.io_timeout);

		let mut ans:Vec<u8> = vec![];
		loop {
			self.client.start_call(DEVICE_READ)?;
			xdr_pack::pack_device_read_parms(&mut self.client.packer, link_id, u32::MAX, io_timeout, DEFAULT_LOCK_TIMEOUT, 0, 0)?;
			self.client.make_call()?;

			let error:i32  = self.client.unpacker.unpack_i32()?;
			let reason:i32 = self.client.unpacker.unpack_i32()?;
			let data:Vec<u8> = self.client.unpacker.unpack_variable_len_opaque()?;

			if error != 0 {
				return Err(device_error(error));
			}

			ans.extend_from_slice(&data);

			if reason & REASON_END != 0 {
				return Ok(ans);
			} else if reason & (REASON_REQCNT | REASON_CHR) == 0 {
				return Err(err("Expected one of three reason bits to be set"));
			}
		}
	}

	// The link is forgotten before the call goes out, so a device that hangs here costs one timeout, not two
	pub fn destroy_link(&mut self) -> io::Result<()> {
		let link:Link = self.opt_link.take().ok_or_else(|| err("No link to destroy"))?;

		self.client.start_call(DESTROY_LINK)?;
		xdr_pack::pack_device_link(&mut self.client.packer, link.link_id)?;
		self.client.make_call()?;

		match self.client.unpacker.unpack_i32()? {
			0    => Ok(()),
			code => Err(device_error(code)),
		}
	}

}

#[cfg(test)]
mod tests {
	use super::*;
	use std::net::TcpListener;
	use std::thread;

	// A core client whose peer hangs up as soon as it connects
	fn client_to_dead_peer() -> CoreClient {
		let listener = TcpListener::bind("127.0.0.1:0").unwrap();
		let addr = listener.local_addr().unwrap();
		let peer = thread::spawn(move || { let _ = listener.accept().unwrap(); });
		let client = TcpClient::connect(addr, DEVICE_CORE_PROG, DEVICE_CORE_VERS, Duration::from_secs(1)).unwrap();
		peer.join().unwrap();

		let opt_link = Some(Link{ link_id: 7, abort_port: 0, max_recv_size: 1024 });
		CoreClient{ client, opt_link, io_timeout: Duration::from_secs(1) }
	}

	#[test]
	fn failed_destroy_link_still_forgets_the_link() {
		let mut core = client_to_dead_peer();
		assert!(core.destroy_link().is_err());
		assert!(core.link().is_none());

		// A second close has nothing to send and fails without touching the socket
		assert_eq!(core.destroy_link().unwrap_err().to_string(), "No link to destroy");
	}

	#[test]
	fn device_timeout_maps_to_timed_out() {
		assert_eq!(device_error(15).kind(), ErrorKind::TimedOut);
		assert_eq!(device_error(3).kind(), ErrorKind::NotFound);
	}
}
