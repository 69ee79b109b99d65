use std::fs::File;
use std::io;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ghostnav_core::{
	display_line, CopyOutcome, NativeCopier, NativeReader, Navigator, Session, SessionConfig,
	Surface, DEFAULT_PAGE_ROWS,
};
use tracing::Level;

mod terminal;

use terminal::Terminal;

#[derive(Parser, Debug)]
#[command(name = "ghostnav", version, about = "Browse and extract recovered directory trees")]
struct Cli {
	/// More diagnostics (-v debug, -vv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	verbose: u8,
	/// Years in which a modification date counts as plausible, e.g. 2000..=2010
	#[arg(long, global = true, value_parser = parse_years)]
	recent_years: Option<RangeInclusive<i32>>,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Walk the tree interactively
	Browse {
		/// Root of the recovered tree
		source: PathBuf,
		/// Destination for copies; copying is disabled without it
		#[arg(long)]
		out: Option<PathBuf>,
		#[arg(long, default_value_t = DEFAULT_PAGE_ROWS)]
		page_rows: usize,
		/// Log file used while the terminal is taken over
		#[arg(long, default_value = "ghostnav.log")]
		log: PathBuf,
	},
	/// Copy the whole tree to a destination directory
	Extract {
		source: PathBuf,
		#[arg(long)]
		out: PathBuf,
	},
	/// Print the root listing
	List {
		source: PathBuf,
		/// Emit the entries as JSON
		#[arg(long)]
		json: bool,
	},
}

fn parse_years(value: &str) -> std::result::Result<RangeInclusive<i32>, String> {
	let (from, to) = value
		.split_once("..=")
		.ok_or_else(|| format!("expected FROM..=TO, got '{}'", value))?;
	let from: i32 = from.trim().parse().map_err(|e| format!("bad year '{}': {}", from, e))?;
	let to: i32 = to.trim().parse().map_err(|e| format!("bad year '{}': {}", to, e))?;
	if from > to {
		return Err(format!("empty year window {}..={}", from, to));
	}
	Ok(from..=to)
}

fn init_tracing(verbose: u8, log_file: Option<&Path>) -> Result<()> {
	let level = match verbose {
		0 => Level::INFO,
		1 => Level::DEBUG,
		_ => Level::TRACE,
	};
	let builder = tracing_subscriber::fmt().with_max_level(level);
	match log_file {
		Some(path) => {
			let file = File::create(path)
				.with_context(|| format!("Failed to create log file {}", path.display()))?;
			builder.with_ansi(false).with_writer(Mutex::new(file)).init();
		}
		None => builder.with_writer(io::stderr).init(),
	}
	Ok(())
}

fn session_config(cli: &Cli, destination: Option<PathBuf>) -> SessionConfig {
	let mut config = SessionConfig {
		verbosity: cli.verbose,
		destination,
		..Default::default()
	};
	if let Some(years) = &cli.recent_years {
		config.recent_years = years.clone();
	}
	config
}

fn open_session(source: &Path, config: SessionConfig) -> Result<Session> {
	let reader = NativeReader::open(source)
		.with_context(|| format!("Failed to open {}", source.display()))?;
	let root = reader.root().to_path_buf();
	let copy = config.destination.is_some();
	let session = Session::new(config, reader)?;
	Ok(if copy {
		session.with_copier(NativeCopier::new(root))
	} else {
		session
	})
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	let interactive = atty::is(atty::Stream::Stdout) && atty::is(atty::Stream::Stdin);

	match &cli.command {
		Commands::Browse { log, .. } if interactive => init_tracing(cli.verbose, Some(log.as_path()))?,
		_ => init_tracing(cli.verbose, None)?,
	}

	match &cli.command {
		Commands::Browse { source, out, page_rows, .. } => {
			let mut config = session_config(&cli, out.clone());
			config.page_rows = *page_rows;
			let mut session = open_session(source, config)?;

			if interactive {
				let mut terminal = Terminal::open(*page_rows).context("Failed to set up terminal")?;
				let surface: &mut dyn Surface = &mut terminal;
				Navigator::new(&mut session, Some(surface)).run(None)?;
			} else {
				tracing::info!("stdout is not a terminal, listing the root only");
				Navigator::new(&mut session, None).run(None)?;
			}
		}
		Commands::Extract { source, out } => {
			let config = session_config(&cli, Some(out.clone()));
			let mut session = open_session(source, config)?;

			let root_id = session.root_id();
			let Some(root) = session.list(root_id).iter().find(|e| e.is_self_link()).cloned() else {
				bail!("{} has no readable root directory", source.display());
			};
			let report = session.extract(&root);

			println!("{}", report.outcome);
			println!("Files copied: {}", report.files_copied);
			println!("Files failed: {}", report.files_failed);
			println!("Directories created: {}", report.directories_created);
			if report.entries_skipped > 0 {
				println!("Entries skipped: {}", report.entries_skipped);
			}
			if report.outcome == CopyOutcome::TotalFailure {
				bail!("Nothing could be copied to {}", out.display());
			}
		}
		Commands::List { source, json } => {
			let config = session_config(&cli, None);
			let session = open_session(source, config)?;
			let listing = session.list(session.root_id());

			if *json {
				let text = serde_json::to_string_pretty(listing.entries())
					.context("Failed to serialize listing")?;
				println!("{}", text);
			} else {
				println!("Directory {}", session.current_path());
				for entry in &listing {
					println!("{}", display_line(entry));
				}
			}
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_years() {
		assert_eq!(parse_years("1995..=2003").unwrap(), 1995..=2003);
		assert_eq!(parse_years(" 2001 ..= 2001 ").unwrap(), 2001..=2001);
		assert!(parse_years("2003..=1995").is_err());
		assert!(parse_years("2003-2005").is_err());
		assert!(parse_years("abc..=2005").is_err());
	}

	#[test]
	fn test_cli_parses_browse() {
		let cli = Cli::try_parse_from(["ghostnav", "-vv", "browse", "img", "--out", "dest"]).unwrap();
		assert_eq!(cli.verbose, 2);
		match cli.command {
			Commands::Browse { source, out, page_rows, log } => {
				assert_eq!(source, PathBuf::from("img"));
				assert_eq!(out, Some(PathBuf::from("dest")));
				assert_eq!(page_rows, DEFAULT_PAGE_ROWS);
				assert_eq!(log, PathBuf::from("ghostnav.log"));
			}
			other => panic!("unexpected command {:?}", other),
		}
	}

	#[test]
	fn test_session_config_carries_years() {
		let cli = Cli::try_parse_from(["ghostnav", "--recent-years", "1990..=1999", "list", "img"])
			.unwrap();
		let config = session_config(&cli, None);
		assert_eq!(config.recent_years, 1990..=1999);
		assert!(config.destination.is_none());
	}
}
