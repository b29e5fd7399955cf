// One module per manufacturer.  Supporting another oscilloscope means writing a `Grabber` for it and
// appending it to KNOWN_GRABBERS; nothing else needs to change.

use std::io;

use crate::bus::Instrument;
use crate::trigger::TriggerState;

pub mod keysight;
pub mod rigol;

#[derive(Debug, Clone, Copy)]
pub struct Grabber {
	pub name: &'static str,

	// Searched for (not anchored) in the response to *IDN?
	pub idn_pattern: &'static str,

	// Returns the screen as PNG bytes, exactly as the instrument sent them
	pub capture_screen: fn(&mut dyn Instrument) -> io::Result<Vec<u8>>,

	// Puts the instrument into single-shot acquisition so the next trigger freezes the screen
	pub arm: fn(&mut dyn Instrument) -> io::Result<()>,

	pub trigger_status: fn(&mut dyn Instrument) -> io::Result<TriggerState>,
}

// :SINGle is common to every supported family
pub fn arm_single(inst:&mut dyn Instrument) -> io::Result<()> {
	inst.write(b":SING")
}

pub static KNOWN_GRABBERS: &[Grabber] = &[
	keysight::INFINIVISION_3000X,
	rigol::DHO924,
	rigol::DS1000Z,
];
