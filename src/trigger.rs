use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::bus::Instrument;
use crate::devices::Grabber;
use crate::error::{Error, Result};

pub const DEFAULT_POLL_INTERVAL:Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState { Waiting, Triggered, Error }

// Polls the grabber's trigger status until the instrument has triggered or `timeout` runs out
pub fn wait_for_trigger(inst:&mut dyn Instrument, grabber:&Grabber, timeout:Duration, interval:Duration) -> Result<()> {
	let started = Instant::now();
	info!("Waiting up to {:?} for {} to trigger", timeout, inst.address());

	loop {
		let state = (grabber.trigger_status)(inst)
			.map_err(|source| Error::TriggerPoll{ address: inst.address().to_owned(), source })?;
		debug!("{} trigger state: {:?}", inst.address(), state);

		match state {
			TriggerState::Triggered => return Ok(()),
			TriggerState::Error     => return Err(Error::TriggerFault{ address: inst.address().to_owned() }),
			TriggerState::Waiting   => { },
		}

		let waited = started.elapsed();
		if waited >= timeout {
			return Err(Error::TriggerTimeout{ address: inst.address().to_owned(), waited });
		}
		thread::sleep(interval.min(timeout - waited));
	}
}
