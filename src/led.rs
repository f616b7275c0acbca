use embedded_hal::digital::v2::OutputPin;

use crate::config::{LED_CMD_OFF, LED_CMD_ON};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum LedCommand {
    On,
    Off,
}

impl LedCommand {
    pub fn from_byte(cmd: u8) -> Option<Self> {
        match cmd {
            LED_CMD_ON => Some(Self::On),
            LED_CMD_OFF => Some(Self::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

/// Drive the LED for a received command byte. Unknown commands leave the
/// pin untouched and return `Ok(None)`.
pub fn update_led<P: OutputPin>(pin: &mut P, cmd: u8) -> Result<Option<LedCommand>, P::Error> {
    let Some(command) = LedCommand::from_byte(cmd) else {
        return Ok(None);
    };
    match command {
        LedCommand::On => pin.set_high()?,
        LedCommand::Off => pin.set_low()?,
    }
    Ok(Some(command))
}
