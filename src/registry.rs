use regex::Regex;

use crate::devices::{Grabber, KNOWN_GRABBERS};
use crate::error::{Error, Result};

// Grabbers paired with their compiled identification patterns, in priority order
pub struct Registry {
	entries: Vec<(Regex, Grabber)>,
}

impl Registry {

	pub fn new(grabbers:&[Grabber]) -> Result<Self> {
		let entries = grabbers.iter()
			.map(|g| Regex::new(g.idn_pattern)
				.map(|re| (re, *g))
				.map_err(|source| Error::Pattern{ grabber: g.name, source }))
			.collect::<Result<Vec<_>>>()?;
		Ok(Self{ entries })
	}

	pub fn builtin() -> Result<Self> { Self::new(KNOWN_GRABBERS) }

	pub fn grabbers(&self) -> impl Iterator<Item = &Grabber> { self.entries.iter().map(|(_, g)| g) }

	// First grabber whose pattern occurs anywhere in the identification string.  Patterns are meant to
	// be disjoint, so registry order only settles ties.
	pub fn find_grabber(&self, idn:&str) -> Option<&Grabber> {
		self.entries.iter()
			.find(|(re, _)| re.is_match(idn))
			.map(|(_, g)| g)
	}

	// Every grabber that would match, for spotting overlapping patterns
	pub fn all_matches(&self, idn:&str) -> Vec<&Grabber> {
		self.entries.iter()
			.filter(|(re, _)| re.is_match(idn))
			.map(|(_, g)| g)
			.collect()
	}

}
