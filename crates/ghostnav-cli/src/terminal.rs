//! Full-screen terminal surface built on crossterm

use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{
	self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use ghostnav_core::{display_line, CopyOutcome, Event, Status, Surface, View};

const DAMAGED: &str = "No file found, filesystem seems damaged.";

/// First row of the entry list
const LIST_TOP: u16 = 3;

pub struct Terminal<W: Write = Stdout> {
	out: W,
	page_rows: u16,
	/// Last status shown, kept on screen until the next key press
	status: Option<Status>,
	raw: bool,
}

impl Terminal {
	/// Switch to raw mode and the alternate screen. Both are undone on drop.
	pub fn open(page_rows: usize) -> io::Result<Self> {
		terminal::enable_raw_mode()?;
		let mut out = io::stdout();
		if let Err(e) = execute!(out, EnterAlternateScreen, Hide) {
			let _ = terminal::disable_raw_mode();
			return Err(e);
		}
		let mut term = Terminal::with_writer(out, page_rows);
		term.raw = true;
		Ok(term)
	}
}

impl<W: Write> Terminal<W> {
	fn with_writer(out: W, page_rows: usize) -> Self {
		Self {
			out,
			page_rows: u16::try_from(page_rows).unwrap_or(u16::MAX),
			status: None,
			raw: false,
		}
	}

	fn status_row(&self) -> u16 {
		LIST_TOP.saturating_add(self.page_rows).saturating_add(2)
	}

	fn draw_status(&mut self) -> io::Result<()> {
		let row = self.status_row();
		queue!(self.out, MoveTo(0, row), Clear(ClearType::CurrentLine))?;
		if let Some(status) = self.status {
			queue!(self.out, Print(status_text(status)))?;
		}
		Ok(())
	}

	/// The operator has seen the status once a key is pressed.
	fn acknowledge(&mut self) {
		self.status = None;
	}
}

impl<W: Write> Drop for Terminal<W> {
	fn drop(&mut self) {
		if self.raw {
			let _ = execute!(self.out, Show, LeaveAlternateScreen);
			let _ = terminal::disable_raw_mode();
		}
	}
}

impl<W: Write> Surface for Terminal<W> {
	fn render(&mut self, view: &View<'_>) -> io::Result<()> {
		queue!(
			self.out,
			Clear(ClearType::All),
			MoveTo(0, 0),
			Print(help_line(view)),
			MoveTo(0, 1),
			Print(format!("Directory {}", view.path)),
		)?;

		if view.is_damaged() {
			queue!(self.out, MoveTo(0, LIST_TOP), Print(DAMAGED))?;
		} else {
			if view.has_previous {
				queue!(self.out, MoveTo(0, LIST_TOP - 1), Print("Previous"))?;
			}
			let mut row = LIST_TOP;
			for (i, entry) in view.entries.iter().enumerate() {
				queue!(self.out, MoveTo(0, row))?;
				if view.offset + i == view.selected {
					queue!(
						self.out,
						SetAttribute(Attribute::Reverse),
						Print(display_line(entry)),
						SetAttribute(Attribute::Reset),
					)?;
				} else {
					queue!(self.out, Print(display_line(entry)))?;
				}
				row = row.saturating_add(1);
			}
			if view.has_next {
				queue!(self.out, MoveTo(0, row), Print("Next"))?;
			}
		}
		self.draw_status()?;
		self.out.flush()
	}

	fn read_event(&mut self) -> io::Result<Event> {
		loop {
			if let TermEvent::Key(key) = event::read()? {
				if key.kind != KeyEventKind::Press {
					continue;
				}
				self.acknowledge();
				if let Some(event) = map_key(key) {
					return Ok(event);
				}
			}
		}
	}

	fn show_status(&mut self, status: Status) -> io::Result<()> {
		self.status = Some(status);
		self.draw_status()?;
		self.out.flush()
	}
}

fn help_line(view: &View<'_>) -> String {
	let mut parts = Vec::with_capacity(4);
	if !view.is_root {
		parts.push("Use Left arrow to go back");
	}
	parts.push("Right arrow to change directory");
	if view.can_copy {
		parts.push("c to copy");
	}
	parts.push("q to quit");
	let line = parts.join(", ");
	if view.is_root {
		format!("Use {}", line)
	} else {
		line
	}
}

pub fn map_key(key: KeyEvent) -> Option<Event> {
	if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
		return Some(Event::Quit);
	}
	match key.code {
		KeyCode::Up => Some(Event::Up),
		KeyCode::Down => Some(Event::Down),
		KeyCode::PageUp => Some(Event::PageUp),
		KeyCode::PageDown => Some(Event::PageDown),
		KeyCode::Right | KeyCode::Enter => Some(Event::Enter),
		KeyCode::Char(' ' | '+' | 'p' | 'P') => Some(Event::Enter),
		KeyCode::Left | KeyCode::Char('-') => Some(Event::Back),
		KeyCode::Char('c' | 'C') => Some(Event::Copy),
		KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(Event::Quit),
		_ => None,
	}
}

pub fn status_text(status: Status) -> &'static str {
	match status {
		Status::Copying => "Copying, please wait...",
		Status::Copied(CopyOutcome::AllCopied) => "Copy done!",
		Status::Copied(CopyOutcome::PartialFailure) => "Copy done! (Failed to copy some files)",
		Status::Copied(CopyOutcome::TotalFailure) => "Copy failed!",
		Status::PathTooLong => "Path too long, entry not copied",
	}
}
