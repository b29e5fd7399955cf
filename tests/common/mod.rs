// In-memory stand-in for an instrument bus
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{self, Error, ErrorKind};
use std::rc::Rc;
use std::time::Duration;

use grab_o_scope::bus::{Bus, Instrument};

pub const PNG:&[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR fake image body";

#[derive(Clone)]
pub enum Behavior {
	// Answers *IDN? with this string and anything else from `responses`
	Idn(&'static str),
	// Opens, then times out on every query
	Timeout,
	// Refuses the connection
	Unreachable,
}

#[derive(Default)]
pub struct Log {
	pub opened: Vec<String>,
	pub closed: Vec<String>,
	pub queries: Vec<(String, String)>,
	// Every timeout an open session was given, in order
	pub timeouts: Vec<(String, Duration)>,
}

pub struct MockBus {
	instruments: Vec<(String, Behavior)>,
	responses: Rc<RefCell<HashMap<String, VecDeque<io::Result<Vec<u8>>>>>>,
	pub log: Rc<RefCell<Log>>,
}

pub fn addr(n:u8) -> String { format!("TCPIP0::10.0.0.{}::inst0::INSTR", n) }

impl MockBus {

	pub fn new(instruments:&[(String, Behavior)]) -> Self {
		Self{ instruments: instruments.to_vec(), responses: Rc::default(), log: Rc::default() }
	}

	// Queues a response for `cmd`; the last queued response repeats once the queue drains to one
	pub fn respond(&self, cmd:&str, resp:io::Result<Vec<u8>>) {
		self.responses.borrow_mut().entry(cmd.to_owned()).or_default().push_back(resp);
	}

	pub fn respond_png(&self, cmd:&str, png:&[u8]) {
		let mut block = format!("#9{:09}", png.len()).into_bytes();
		block.extend_from_slice(png);
		block.push(b'\n');
		self.respond(cmd, Ok(block));
	}

	pub fn opened(&self) -> Vec<String> { self.log.borrow().opened.clone() }
	pub fn closed(&self) -> Vec<String> { self.log.borrow().closed.clone() }
	pub fn timeouts(&self) -> Vec<(String, Duration)> { self.log.borrow().timeouts.clone() }
	pub fn commands(&self) -> Vec<String> { self.log.borrow().queries.iter().map(|(_, c)| c.clone()).collect() }

}

impl Bus for MockBus {

	fn list_addresses(&self) -> io::Result<Vec<String>> {
		Ok(self.instruments.iter().map(|(a, _)| a.clone()).collect())
	}

	fn open(&self, address:&str) -> io::Result<Box<dyn Instrument>> {
		let behavior = self.instruments.iter()
			.find(|(a, _)| a == address)
			.map(|(_, b)| b.clone())
			.ok_or_else(|| Error::new(ErrorKind::NotFound, "no such address"))?;

		if let Behavior::Unreachable = behavior {
			return Err(Error::new(ErrorKind::ConnectionRefused, "connection refused"));
		}

		self.log.borrow_mut().opened.push(address.to_owned());
		Ok(Box::new(MockInstrument{
			address: address.to_owned(),
			behavior,
			timeout: Duration::from_secs(1),
			responses: self.responses.clone(),
			log: self.log.clone(),
		}))
	}

}

pub struct MockInstrument {
	address: String,
	behavior: Behavior,
	timeout: Duration,
	responses: Rc<RefCell<HashMap<String, VecDeque<io::Result<Vec<u8>>>>>>,
	log: Rc<RefCell<Log>>,
}

fn clone_result(r:&io::Result<Vec<u8>>) -> io::Result<Vec<u8>> {
	match r {
		Ok(v)  => Ok(v.clone()),
		Err(e) => Err(Error::new(e.kind(), e.to_string())),
	}
}

impl Instrument for MockInstrument {

	fn address(&self) -> &str { &self.address }

	fn timeout(&self) -> Duration { self.timeout }

	fn set_timeout(&mut self, timeout:Duration) -> io::Result<()> {
		self.log.borrow_mut().timeouts.push((self.address.clone(), timeout));
		self.timeout = timeout;
		Ok(())
	}

	fn write(&mut self, cmd:&[u8]) -> io::Result<()> {
		self.log.borrow_mut().queries.push((self.address.clone(), String::from_utf8_lossy(cmd).into_owned()));
		match self.behavior {
			Behavior::Timeout => Err(Error::new(ErrorKind::TimedOut, "I/O timeout")),
			_ => Ok(()),
		}
	}

	fn query_raw(&mut self, cmd:&[u8]) -> io::Result<Vec<u8>> {
		let cmd = String::from_utf8_lossy(cmd).into_owned();
		self.log.borrow_mut().queries.push((self.address.clone(), cmd.clone()));

		match self.behavior {
			Behavior::Timeout => Err(Error::new(ErrorKind::TimedOut, "I/O timeout")),
			Behavior::Unreachable => unreachable!(),
			Behavior::Idn(idn) if cmd == "*IDN?" => Ok(format!("{}\n", idn).into_bytes()),
			Behavior::Idn(_) => {
				let mut responses = self.responses.borrow_mut();
				let queue = responses.get_mut(&cmd).ok_or_else(|| Error::new(ErrorKind::TimedOut, "no response scripted"))?;
				if queue.len() > 1 {
					queue.pop_front().unwrap_or_else(|| Err(Error::new(ErrorKind::Other, "empty")))
				} else {
					queue.front().map(clone_result).unwrap_or_else(|| Err(Error::new(ErrorKind::Other, "empty")))
				}
			},
		}
	}

	fn close(&mut self) -> io::Result<()> {
		self.log.borrow_mut().closed.push(self.address.clone());
		Ok(())
	}

}
