use std::io;

use log::debug;

use crate::bus::Instrument;
use crate::ieee488::ElementWidth;
use crate::trigger::TriggerState;
use super::Grabber;

// InfiniVision 3000T X-Series, both MSO-X and DSO-X models
pub const INFINIVISION_3000X:Grabber = Grabber {
	name: "Keysight InfiniVision 3000T X-Series",
	idn_pattern: r"KEYSIGHT TECHNOLOGIES,.SO-X.*",
	capture_screen,
	arm: super::arm_single,
	trigger_status,
};

fn capture_screen(inst:&mut dyn Instrument) -> io::Result<Vec<u8>> {
	inst.query_binary_values(":DISP:DATA?PNG,COL", ElementWidth::Byte)
}

// :TER? reads and clears the trigger event register
fn trigger_status(inst:&mut dyn Instrument) -> io::Result<TriggerState> {
	let res = inst.query(":TER?")?;
	debug!("{} :TER? => {}", inst.address(), res);
	Ok(parse_ter(&res))
}

fn parse_ter(res:&str) -> TriggerState {
	match res.trim_start_matches('+') {
		"1" => TriggerState::Triggered,
		"0" => TriggerState::Waiting,
		_   => TriggerState::Error,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ter_register() {
		assert_eq!(parse_ter("+1"), TriggerState::Triggered);
		assert_eq!(parse_ter("+0"), TriggerState::Waiting);
		assert_eq!(parse_ter("0"), TriggerState::Waiting);
		assert_eq!(parse_ter("-113,\"Undefined header\""), TriggerState::Error);
	}
}
