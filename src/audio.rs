//! Click chime: rings the terminal bell after a successful clear.

use std::io::{self, Write};
use tracing::debug;

const BELL: &[u8] = b"\x07";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chime {
    enabled: bool,
}

impl Chime {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        debug!(enabled = self.enabled, "chime toggled");
    }

    /// Fire and forget; muted chimes write nothing.
    pub fn play<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        out.write_all(BELL)?;
        out.flush()
    }
}
