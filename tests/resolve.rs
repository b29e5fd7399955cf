mod common;

use std::time::Duration;

use grab_o_scope::discovery::Discovery;
use grab_o_scope::registry::Registry;
use grab_o_scope::resolver::Resolver;
use grab_o_scope::Error;

use common::{addr, Behavior, MockBus};

const DHO924_IDN:&str  = "RIGOL TECHNOLOGIES,DHO924,DHO9A000000001,00.01.02";
const DS1054Z_IDN:&str = "RIGOL TECHNOLOGIES,DS1054Z,DS1ZA000000001,00.04.04.SP4";
const MSOX_IDN:&str    = "KEYSIGHT TECHNOLOGIES,MSO-X 3054T,MY12345678,07.50.2021102830";
const DMM_IDN:&str     = "KEYSIGHT TECHNOLOGIES,34465A,MY00000001,A.03.01-03.15-03.01-00.52-03-02";

fn resolver<'a>(bus:&'a MockBus, registry:&'a Registry) -> Resolver<'a, MockBus> {
	Resolver::new(Discovery::new(bus, Duration::from_millis(100)), registry)
}

#[test]
fn timeout_and_unknown_instruments_are_skipped() {
	let bus = MockBus::new(&[
		(addr(1), Behavior::Timeout),
		(addr(2), Behavior::Idn(DHO924_IDN)),
		(addr(3), Behavior::Idn(DMM_IDN)),
	]);
	let registry = Registry::builtin().unwrap();

	let resolved = resolver(&bus, &registry).resolve(None).unwrap();
	assert_eq!(resolved.address, addr(2));
	assert_eq!(resolved.idn, DHO924_IDN);
	assert_eq!(resolved.grabber.name, "Rigol DHO924");

	// The timeout on the first address didn't stop the other two from being asked
	let asked:Vec<String> = bus.log.borrow().queries.iter().map(|(a, _)| a.clone()).collect();
	assert_eq!(asked, vec![addr(1), addr(2), addr(3)]);
}

#[test]
fn unreachable_instrument_does_not_abort_discovery() {
	let bus = MockBus::new(&[
		(addr(1), Behavior::Unreachable),
		(addr(2), Behavior::Idn(MSOX_IDN)),
	]);
	let registry = Registry::builtin().unwrap();

	let resolved = resolver(&bus, &registry).resolve(None).unwrap();
	assert_eq!(resolved.address, addr(2));
}

#[test]
fn nothing_identified_is_no_instrument_found() {
	let bus = MockBus::new(&[
		(addr(1), Behavior::Timeout),
		(addr(2), Behavior::Unreachable),
		(addr(3), Behavior::Idn(DMM_IDN)),
	]);
	let registry = Registry::builtin().unwrap();

	match resolver(&bus, &registry).resolve(None) {
		Err(Error::NoInstrumentFound{ filter }) => assert_eq!(filter, None),
		other => panic!("expected NoInstrumentFound, got {:?}", other),
	}
}

#[test]
fn empty_bus_is_no_instrument_found() {
	let bus = MockBus::new(&[]);
	let registry = Registry::builtin().unwrap();
	assert!(matches!(resolver(&bus, &registry).resolve(None), Err(Error::NoInstrumentFound{ .. })));
}

#[test]
fn two_matches_are_ambiguous_until_filtered() {
	let bus = MockBus::new(&[
		(addr(1), Behavior::Idn(DS1054Z_IDN)),
		(addr(2), Behavior::Idn(DS1054Z_IDN)),
	]);
	let registry = Registry::builtin().unwrap();
	let resolver = resolver(&bus, &registry);

	match resolver.resolve(None) {
		Err(Error::AmbiguousInstrument{ candidates }) => assert_eq!(candidates, vec![addr(1), addr(2)]),
		other => panic!("expected AmbiguousInstrument, got {:?}", other),
	}

	let resolved = resolver.resolve(Some("10.0.0.2")).unwrap();
	assert_eq!(resolved.address, addr(2));
}

#[test]
fn ambiguity_counts_every_match() {
	let bus = MockBus::new(&[
		(addr(1), Behavior::Idn(DS1054Z_IDN)),
		(addr(2), Behavior::Idn(MSOX_IDN)),
		(addr(3), Behavior::Timeout),
		(addr(4), Behavior::Idn(DHO924_IDN)),
	]);
	let registry = Registry::builtin().unwrap();

	match resolver(&bus, &registry).resolve(None) {
		Err(Error::AmbiguousInstrument{ candidates }) => assert_eq!(candidates.len(), 3),
		other => panic!("expected AmbiguousInstrument, got {:?}", other),
	}
}

#[test]
fn filter_is_applied_before_contacting_instruments() {
	let bus = MockBus::new(&[
		(addr(1), Behavior::Idn(DS1054Z_IDN)),
		(addr(2), Behavior::Idn(DS1054Z_IDN)),
		(addr(3), Behavior::Timeout),
	]);
	let registry = Registry::builtin().unwrap();

	resolver(&bus, &registry).resolve(Some("10.0.0.1:")).unwrap();
	assert_eq!(bus.opened(), vec![addr(1)]);
}

#[test]
fn filter_is_case_sensitive() {
	let bus = MockBus::new(&[(addr(1), Behavior::Idn(DS1054Z_IDN))]);
	let registry = Registry::builtin().unwrap();

	match resolver(&bus, &registry).resolve(Some("tcpip0")) {
		Err(Error::NoInstrumentFound{ filter }) => assert_eq!(filter.as_deref(), Some("tcpip0")),
		other => panic!("expected NoInstrumentFound, got {:?}", other),
	}
}

#[test]
fn identification_sessions_are_always_closed() {
	let bus = MockBus::new(&[
		(addr(1), Behavior::Timeout),
		(addr(2), Behavior::Idn(DHO924_IDN)),
		(addr(3), Behavior::Idn(DMM_IDN)),
	]);
	let registry = Registry::builtin().unwrap();

	resolver(&bus, &registry).resolve(None).unwrap();
	assert_eq!(bus.opened(), bus.closed());
}

#[test]
fn ambiguous_message_lists_candidates() {
	let e = Error::AmbiguousInstrument{ candidates: vec![addr(1), addr(2)] };
	let msg = e.to_string();
	assert!(msg.contains(&addr(1)));
	assert!(msg.contains(&addr(2)));
	assert!(msg.contains("--name"));
}
