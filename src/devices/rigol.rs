use std::io;

use log::debug;

use crate::bus::Instrument;
use crate::ieee488::ElementWidth;
use crate::trigger::TriggerState;
use super::Grabber;

pub const DHO924:Grabber = Grabber {
	name: "Rigol DHO924",
	idn_pattern: r"RIGOL TECHNOLOGIES,DHO924,DHO.*",
	capture_screen: capture_screen_dho,
	arm: super::arm_single,
	trigger_status,
};

// DS1054Z and the rest of the DS1000Z family
pub const DS1000Z:Grabber = Grabber {
	name: "Rigol DS1000Z",
	idn_pattern: r"RIGOL TECHNOLOGIES,DS1\w+Z,.*",
	capture_screen: capture_screen_ds1000z,
	arm: super::arm_single,
	trigger_status,
};

fn capture_screen_dho(inst:&mut dyn Instrument) -> io::Result<Vec<u8>> {
	inst.query_binary_values(":DISP:DATA? PNG", ElementWidth::Byte)
}

// ON,0 = color, no inverted display
fn capture_screen_ds1000z(inst:&mut dyn Instrument) -> io::Result<Vec<u8>> {
	inst.query_binary_values(":DISP:DATA? ON,0,PNG", ElementWidth::Byte)
}

fn trigger_status(inst:&mut dyn Instrument) -> io::Result<TriggerState> {
	let res = inst.query(":TRIG:STAT?")?;
	debug!("{} :TRIG:STAT? => {}", inst.address(), res);
	Ok(parse_trig_stat(&res))
}

// A single-shot acquisition drops to STOP once it has triggered
fn parse_trig_stat(res:&str) -> TriggerState {
	match res.to_ascii_uppercase().as_str() {
		"TD" | "STOP"           => TriggerState::Triggered,
		"WAIT" | "RUN" | "AUTO" => TriggerState::Waiting,
		_                       => TriggerState::Error,
	}
}
