use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

use grab_o_scope::config::Config;
use grab_o_scope::registry::Registry;
use grab_o_scope::session::{render_json, GrabOptions, Session};
use grab_o_scope::vxi11::bus::Vxi11Bus;
use grab_o_scope::{Error, Result};

/// Oscilloscope Screen Grabber
#[derive(Debug, Parser)]
#[command(name = "grab-o-scope", version, about)]
struct Args {
	/// name a specific instrument (substring of its address)
	#[arg(short, long)]
	name: Option<String>,

	/// name of output file [default: grab-o-scope.png]
	#[arg(short, long)]
	filename: Option<PathBuf>,

	/// automatically view output file
	#[arg(short, long)]
	auto_view: bool,

	/// print additional output
	#[arg(short, long)]
	verbose: bool,

	/// include debugging output
	#[arg(short, long)]
	trace: bool,

	/// TOML configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// instrument host or TCPIP INSTR resource to try (repeatable)
	#[arg(long = "host")]
	hosts: Vec<String>,

	/// don't broadcast for instruments, only use --host and the configured hosts
	#[arg(long)]
	no_broadcast: bool,

	/// list recognized oscilloscopes instead of grabbing
	#[arg(short, long)]
	list: bool,

	/// print the --list output as JSON
	#[arg(long, requires = "list")]
	json: bool,

	/// wait up to SECS for the scope to trigger before grabbing
	#[arg(short, long, value_name = "SECS", value_parser = parse_secs)]
	wait_trigger: Option<Duration>,

	/// switch the scope to single-shot acquisition before waiting for the trigger
	#[arg(long, requires = "wait_trigger")]
	arm: bool,
}

fn parse_secs(s:&str) -> std::result::Result<Duration, String> {
	let secs:f64 = s.parse().map_err(|_| format!("{:?} is not a number of seconds", s))?;
	Duration::try_from_secs_f64(secs).map_err(|_| format!("{} is not a usable number of seconds", secs))
}

fn init_logging(args:&Args) {
	let level = if args.trace { LevelFilter::Trace }
		else if args.verbose { LevelFilter::Info }
		else { LevelFilter::Warn };

	env_logger::Builder::new()
		.filter_level(level)
		.parse_default_env()
		.format_timestamp(None)
		.init();
}

fn run(args:Args) -> Result<()> {
	let mut config = match &args.config {
		Some(path) => Config::load(path)?,
		None       => Config::default(),
	};
	config.hosts.extend(args.hosts.iter().cloned());
	if args.no_broadcast {
		config.broadcast = false;
	}

	let bus = Vxi11Bus::new(&config.hosts, config.broadcast_window(), config.identify_timeout()).map_err(Error::Bus)?;
	let registry = Registry::builtin()?;
	let session = Session::new(&bus, &registry, &config);

	if args.list {
		let found = session.list(args.name.as_deref())?;
		if args.json {
			println!("{}", render_json(&found)?);
		} else {
			for r in found {
				println!("{}\t{}\t{}", r.address, r.grabber.name, r.idn);
			}
		}
		return Ok(());
	}

	let opts = GrabOptions {
		name: args.name,
		filename: args.filename,
		auto_view: args.auto_view,
		wait_trigger: args.wait_trigger,
		arm: args.arm,
	};
	let filename = session.grab(&opts)?;
	log::info!("Done: {}", filename.display());
	Ok(())
}

fn main() -> ExitCode {
	let args = Args::parse();
	init_logging(&args);

	match run(args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("{}: ...quitting", e);
			ExitCode::FAILURE
		},
	}
}
