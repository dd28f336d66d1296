//! Display presenter: formats the two LCD rows and picks the backlight colour.
//!
//! Frames are pure values built from a [`Reading`] and the iteration
//! index; [`render`] pushes one to a [`DisplayPort`].  The three display
//! writes are not transactional: the first failing write stops the frame
//! and is reported as a [`RenderFault`], leaving whatever was already
//! written on screen.

use core::fmt;

use super::convert::Reading;
use super::ports::{DisplayError, DisplayPort};

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

/// Visible characters per line; the text buffer is one byte larger.
pub const LINE_CAPACITY: usize = 19;

/// Fixed first-row text.
pub const HEADER: &str = "Temperature: ";

/// Backlight colours cycled once per sample, red through violet.
pub const PALETTE: [Rgb; 7] = [
    (0xd1, 0x00, 0x00),
    (0xff, 0x66, 0x22),
    (0xff, 0xda, 0x21),
    (0x33, 0xdd, 0x00),
    (0x11, 0x33, 0xcc),
    (0x22, 0x00, 0x66),
    (0x33, 0x00, 0x44),
];

/// One bounded display row.
pub type Line = heapless::String<LINE_CAPACITY>;

/// Everything written to the display for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    pub lines: [Line; 2],
    pub color: Rgb,
}

/// Build the frame for `reading` at loop iteration `iteration`.
pub fn present(reading: &Reading, iteration: u64) -> DisplayFrame {
    let detail = format!(
        "F: {} & C: {}",
        reading.fahrenheit,
        reading.celsius_whole()
    );
    DisplayFrame {
        lines: [bounded_line(HEADER), bounded_line(&detail)],
        color: palette_color(iteration),
    }
}

/// Palette entry for `iteration`; period is `PALETTE.len()`.
pub fn palette_color(iteration: u64) -> Rgb {
    PALETTE[(iteration % PALETTE.len() as u64) as usize]
}

/// Copy `text` into a [`Line`], dropping whatever does not fit.
pub fn bounded_line(text: &str) -> Line {
    let mut line = Line::new();
    for c in text.chars() {
        if line.push(c).is_err() {
            break;
        }
    }
    line
}

// ───────────────────────────────────────────────────────────────
// Rendering
// ───────────────────────────────────────────────────────────────

/// The display write that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Cursor(u8),
    Text(u8),
    Color,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cursor(row) => write!(f, "cursor row {row}"),
            Self::Text(row) => write!(f, "text row {row}"),
            Self::Color => write!(f, "colour"),
        }
    }
}

/// A partially applied frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFault {
    pub stage: RenderStage,
    pub error: DisplayError,
}

/// Write `frame` to `display`: row 0, row 1, then colour.
pub fn render(frame: &DisplayFrame, display: &mut impl DisplayPort) -> Result<(), RenderFault> {
    for (row, line) in (0u8..).zip(frame.lines.iter()) {
        display.set_cursor(row, 0).map_err(|error| RenderFault {
            stage: RenderStage::Cursor(row),
            error,
        })?;
        display.write_text(line).map_err(|error| RenderFault {
            stage: RenderStage::Text(row),
            error,
        })?;
    }
    let (r, g, b) = frame.color;
    display.set_color(r, g, b).map_err(|error| RenderFault {
        stage: RenderStage::Color,
        error,
    })
}
