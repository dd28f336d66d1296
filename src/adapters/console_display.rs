//! Console display adapter.
//!
//! Host-side stand-in for the two-line LCD: keeps the rows in memory and
//! logs the whole frame whenever the backlight colour is set, which is the
//! last write of every frame.

use log::info;

use crate::app::ports::{DisplayError, DisplayPort};
use crate::app::presenter::Rgb;

const ROWS: usize = 2;

#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    rows: [String; ROWS],
    cursor: (usize, usize),
    color: Rgb,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&self, row: usize) -> Option<&str> {
        self.rows.get(row).map(String::as_str)
    }

    pub fn color(&self) -> Rgb {
        self.color
    }
}

impl DisplayPort for ConsoleDisplay {
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        let row = usize::from(row);
        if row >= ROWS {
            return Err(DisplayError::OutOfBounds);
        }
        self.cursor = (row, usize::from(col));
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        let (row, col) = self.cursor;
        let line = &mut self.rows[row];
        let mut chars: Vec<char> = line.chars().collect();
        if chars.len() < col {
            chars.resize(col, ' ');
        }
        for (i, c) in text.chars().enumerate() {
            match chars.get_mut(col + i) {
                Some(slot) => *slot = c,
                None => chars.push(c),
            }
        }
        *line = chars.into_iter().collect();
        self.cursor.1 = col + text.chars().count();
        Ok(())
    }

    fn set_color(&mut self, r: u8, g: u8, b: u8) -> Result<(), DisplayError> {
        self.color = (r, g, b);
        info!(
            "LCD | {:<16} | {:<16} | #{:02x}{:02x}{:02x}",
            self.rows[0], self.rows[1], r, g, b
        );
        Ok(())
    }
}
