// IEEE 488.2 arbitrary block decoding, the framing instruments wrap binary query responses in:
//   #<n><n digits of length><payload>   definite length
//   #0<payload>\n                       indefinite length

use std::io::{self, Error, ErrorKind};
use std::str;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementWidth {
	Byte = 1,
	Word = 2,
	DoubleWord = 4,
}

impl ElementWidth {
	pub fn bytes(self) -> usize { self as usize }
}

fn err(msg:&str) -> io::Error { Error::new(ErrorKind::InvalidData, msg) }

pub fn decode_block(raw:&[u8]) -> io::Result<&[u8]> {
	// Some firmware sends leading whitespace or a stray terminator from the previous response
	let start = raw.iter().position(|b| *b == b'#').ok_or_else(|| err("Binary block response has no '#' header"))?;
	let raw = &raw[start + 1..];

	let n_digits = match raw.first() {
		Some(d) if d.is_ascii_digit() => (d - b'0') as usize,
		_ => return Err(err("Binary block header is missing its digit count")),
	};

	if n_digits == 0 {
		let payload = &raw[1..];
		return Ok(payload.strip_suffix(b"\n").unwrap_or(payload));
	}

	let len_digits = raw.get(1..1 + n_digits).ok_or_else(|| err("Binary block header is truncated"))?;
	let len:usize = str::from_utf8(len_digits).ok()
		.and_then(|s| s.parse().ok())
		.ok_or_else(|| err("Binary block length is not a decimal number"))?;

	let payload = &raw[1 + n_digits..];
	if payload.len() < len {
		return Err(Error::new(ErrorKind::UnexpectedEof, format!("Binary block declares {} bytes but only {} arrived", len, payload.len())));
	}

	// Anything past the declared length is the response terminator
	Ok(&payload[..len])
}

pub fn decode_values(raw:&[u8], width:ElementWidth) -> io::Result<Vec<u8>> {
	let payload = decode_block(raw)?;
	if payload.len() % width.bytes() != 0 {
		return Err(err("Binary block length is not a whole number of elements"));
	}
	Ok(payload.to_vec())
}
