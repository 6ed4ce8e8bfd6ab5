//! Terminal rendering for the markdown produced by the core display types.
//!
//! Rich mode styles inline markdown with termimad and colors headers and
//! checklist marks. Plain mode writes the markdown untouched, which is what
//! tests and pipes see with `--no-color`.

use std::io::{self, Write};

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

const BLUE: &str = "\x1b[34m";
const GREEN: &str = "\x1b[32m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Terminal renderer that can switch between rich and plain text output
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Write markdown text to stdout.
    pub fn render(&self, markdown: &str) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();

        if !self.rich_enabled {
            write!(out, "{markdown}")?;
            return Ok(());
        }

        for line in markdown.lines() {
            match line_style(line) {
                Some(color) => writeln!(out, "{color}{line}{RESET}")?,
                None => writeln!(out, "{}", self.skin.inline(line))?,
            }
        }
        Ok(())
    }
}

/// Fixed color for headers and finished checklist items; other lines go
/// through the skin.
fn line_style(line: &str) -> Option<&'static str> {
    if line.starts_with('#') {
        Some(BLUE)
    } else if line.starts_with("- [x]") {
        Some(GREEN)
    } else if line.starts_with("- [-]") {
        Some(DIM)
    } else {
        None
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
