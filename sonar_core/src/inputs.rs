//! Button and potentiometer wrappers over the raw input traits.

use sonar_traits::{AnalogInput, DigitalInput};

use crate::error::Result;
use crate::hw_error::map_hw_error;

/// Largest value of a 12-bit conversion.
pub const POT_MAX: u16 = 4095;

/// A push button; maps the electrical level to "pressed".
#[derive(Debug)]
pub struct Button<D: DigitalInput> {
    line: D,
    active_low: bool,
}

impl<D: DigitalInput> Button<D> {
    /// Button to ground on a pulled-up line: LOW means pressed.
    pub fn active_low(line: D) -> Self {
        Self {
            line,
            active_low: true,
        }
    }

    /// Button to supply on a pulled-down line: HIGH means pressed.
    pub fn active_high(line: D) -> Self {
        Self {
            line,
            active_low: false,
        }
    }

    pub fn pressed(&mut self) -> Result<bool> {
        let high = self.line.is_high().map_err(|e| map_hw_error(&*e))?;
        Ok(high != self.active_low)
    }
}

/// Potentiometer on a 12-bit ADC channel.
#[derive(Debug)]
pub struct Potentiometer<A: AnalogInput> {
    input: A,
}

impl<A: AnalogInput> Potentiometer<A> {
    pub fn new(input: A) -> Self {
        Self { input }
    }

    /// Raw conversion, clamped to `[0, POT_MAX]`.
    pub fn read(&mut self) -> Result<u16> {
        let raw = self.input.read_raw().map_err(|e| map_hw_error(&*e))?;
        if raw > POT_MAX {
            tracing::debug!(raw, "pot conversion above 12-bit range; clamping");
        }
        Ok(raw.min(POT_MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonar_hardware::{SimulatedButton, SimulatedPot};

    #[test]
    fn low_level_on_active_low_pin_is_pressed() {
        let line = SimulatedButton::new();
        let mut button = Button::active_low(line.clone());
        assert!(!button.pressed().unwrap());
        line.press();
        assert!(button.pressed().unwrap());
    }

    #[test]
    fn active_high_passes_level_through() {
        let line = SimulatedButton::new();
        let mut button = Button::active_high(line.clone());
        assert!(button.pressed().unwrap());
        line.press();
        assert!(!button.pressed().unwrap());
    }

    #[test]
    fn pot_passes_through_and_clamps() {
        let pot = SimulatedPot::new(2048);
        let mut p = Potentiometer::new(pot.clone());
        assert_eq!(p.read().unwrap(), 2048);
        pot.set(4095);
        assert_eq!(p.read().unwrap(), 4095);
        pot.set(5000);
        assert_eq!(p.read().unwrap(), POT_MAX);
    }
}
