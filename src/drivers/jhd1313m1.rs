//! JHD1313M1 RGB backlight LCD (Grove LCD RGB Backlight).
//!
//! Two I2C devices share the module:
//!
//! | Address | Chip                    | Role                      |
//! |---------|-------------------------|---------------------------|
//! | 0x3e    | AIP31068 (HD44780 cmds) | 16x2 character display    |
//! | 0x62    | PCA9633                 | RGB backlight PWM         |
//!
//! Text-controller writes are two bytes: a control byte (0x80 command,
//! 0x40 data) followed by the value.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use crate::app::ports::{DisplayError, DisplayPort};

/// Visible columns per row.
pub const COLUMNS: u8 = 16;

/// Rows on the module.
pub const ROWS: u8 = 2;

// Control bytes
const CONTROL_COMMAND: u8 = 0x80;
const CONTROL_DATA: u8 = 0x40;

// HD44780 instruction set
const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x04;
const ENTRY_LEFT: u8 = 0x02;
const CMD_DISPLAY_CONTROL: u8 = 0x08;
const DISPLAY_ON: u8 = 0x04;
const CMD_FUNCTION_SET: u8 = 0x20;
const FUNCTION_2LINE: u8 = 0x08;

/// DDRAM set-address commands for the start of each row.
const ROW_ADDRESS: [u8; ROWS as usize] = [0x80, 0xC0];

// PCA9633 registers
const REG_MODE1: u8 = 0x00;
const REG_MODE2: u8 = 0x01;
const REG_BLUE: u8 = 0x02;
const REG_GREEN: u8 = 0x03;
const REG_RED: u8 = 0x04;
const REG_LEDOUT: u8 = 0x08;
/// All four outputs under individual PWM control.
const LEDOUT_PWM_ALL: u8 = 0xAA;

pub struct Jhd1313m1<I2C, D> {
    i2c: I2C,
    delay: D,
    lcd_address: u8,
    rgb_address: u8,
}

impl<I2C: I2c, D: DelayNs> Jhd1313m1<I2C, D> {
    /// Take the bus and run the power-on initialisation sequence.
    ///
    /// Any bus error during initialisation means there is no display on
    /// the bus and is reported as [`DisplayError::Unavailable`].
    pub fn new(i2c: I2C, delay: D, lcd_address: u8, rgb_address: u8) -> Result<Self, DisplayError> {
        let mut lcd = Self {
            i2c,
            delay,
            lcd_address,
            rgb_address,
        };
        lcd.init().map_err(|_| DisplayError::Unavailable)?;
        debug!(
            "JHD1313M1 ready (lcd 0x{:02x}, rgb 0x{:02x})",
            lcd_address, rgb_address
        );
        Ok(lcd)
    }

    fn init(&mut self) -> Result<(), I2C::Error> {
        // Controller needs >40 ms after Vdd rises.
        self.delay.delay_ms(50);
        self.command(CMD_FUNCTION_SET | FUNCTION_2LINE)?;
        self.delay.delay_us(4500);
        self.command(CMD_FUNCTION_SET | FUNCTION_2LINE)?;
        self.delay.delay_us(4500);
        self.command(CMD_DISPLAY_CONTROL | DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE | ENTRY_LEFT)?;

        self.rgb_register(REG_MODE1, 0x00)?;
        self.rgb_register(REG_MODE2, 0x00)?;
        self.rgb_register(REG_LEDOUT, LEDOUT_PWM_ALL)?;
        self.rgb(0xff, 0xff, 0xff)
    }

    /// Blank both rows and home the cursor.
    pub fn clear(&mut self) -> Result<(), I2C::Error> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.lcd_address, &[CONTROL_COMMAND, cmd])
    }

    fn data(&mut self, byte: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.lcd_address, &[CONTROL_DATA, byte])
    }

    fn rgb_register(&mut self, reg: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.rgb_address, &[reg, value])
    }

    fn rgb(&mut self, r: u8, g: u8, b: u8) -> Result<(), I2C::Error> {
        self.rgb_register(REG_RED, r)?;
        self.rgb_register(REG_GREEN, g)?;
        self.rgb_register(REG_BLUE, b)
    }
}

impl<I2C: I2c, D: DelayNs> DisplayPort for Jhd1313m1<I2C, D> {
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        if row >= ROWS || col >= COLUMNS {
            return Err(DisplayError::OutOfBounds);
        }
        self.command(ROW_ADDRESS[usize::from(row)] + col)
            .map_err(|_| DisplayError::Bus)
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        // The character ROM is ASCII-compatible only in the printable range.
        for c in text.chars() {
            let byte = if c.is_ascii() && !c.is_ascii_control() {
                c as u8
            } else {
                b'?'
            };
            self.data(byte).map_err(|_| DisplayError::Bus)?;
        }
        Ok(())
    }

    fn set_color(&mut self, r: u8, g: u8, b: u8) -> Result<(), DisplayError> {
        self.rgb(r, g, b).map_err(|_| DisplayError::Bus)
    }

    fn close(&mut self) {
        debug!("JHD1313M1 released");
    }
}
