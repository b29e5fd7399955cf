use std::io;
use std::path::PathBuf;
use std::time::Duration;

fn describe_filter(filter:&Option<String>) -> String {
	match filter {
		Some(f) => format!(" with a name containing {:?}", f),
		None    => String::new(),
	}
}

fn list_candidates(candidates:&[String]) -> String {
	candidates.iter().map(|c| format!("   {}", c)).collect::<Vec<_>>().join("\n")
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("could not find any known oscilloscopes{}; check the connection, or pass --host if broadcast discovery is blocked", describe_filter(.filter))]
	NoInstrumentFound { filter: Option<String> },

	#[error("multiple oscilloscopes found:\n{}\nre-run with --name to select one of the above", list_candidates(.candidates))]
	AmbiguousInstrument { candidates: Vec<String> },

	#[error("could not read screen bytes from {address}: {source}")]
	CaptureFailed { address: String, source: io::Error },

	#[error("instrument bus error: {0}")]
	Bus(#[source] io::Error),

	#[error("lost contact with {address} while polling trigger status: {source}")]
	TriggerPoll { address: String, source: io::Error },

	#[error("{address} did not trigger within {waited:?}")]
	TriggerTimeout { address: String, waited: Duration },

	#[error("{address} reported an unrecognized trigger status")]
	TriggerFault { address: String },

	#[error("invalid identification pattern for {grabber}: {source}")]
	Pattern { grabber: &'static str, source: regex::Error },

	#[error("could not write {}: {source}", .path.display())]
	Output { path: PathBuf, source: io::Error },

	#[error("could not render instrument list: {0}")]
	Json(#[source] serde_json::Error),

	#[error("could not load configuration {}: {reason}", .path.display())]
	Config { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
