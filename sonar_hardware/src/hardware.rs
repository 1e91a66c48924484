//! rppal-backed GPIO drivers (Raspberry Pi).

use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, OutputPin};
use sonar_traits::{DigitalInput, Level, Transducer};
use tracing::trace;

use crate::ButtonBias;
use crate::error::{HwError, Result};
use crate::util::{measure_pulse_us, spin_delay_us};

fn open_gpio() -> Result<Gpio> {
    Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))
}

/// HC-SR04 style transducer on two GPIO lines.
pub struct HardwareTransducer {
    trigger: OutputPin,
    echo: InputPin,
}

impl HardwareTransducer {
    pub fn new(trigger_pin: u8, echo_pin: u8) -> Result<Self> {
        let gpio = open_gpio()?;
        let mut trigger = gpio
            .get(trigger_pin)
            .map_err(|e| HwError::Gpio(format!("open trigger pin {trigger_pin}: {e}")))?
            .into_output();
        trigger.set_low(); // idle low
        let echo = gpio
            .get(echo_pin)
            .map_err(|e| HwError::Gpio(format!("open echo pin {echo_pin}: {e}")))?
            .into_input();
        Ok(Self { trigger, echo })
    }
}

impl Transducer for HardwareTransducer {
    fn write_trigger(
        &mut self,
        level: Level,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match level {
            Level::Low => self.trigger.set_low(),
            Level::High => self.trigger.set_high(),
        }
        Ok(())
    }

    fn read_pulse_us(
        &mut self,
        timeout: Duration,
    ) -> std::result::Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        let echo = &self.echo;
        let us = measure_pulse_us(|| echo.is_high(), timeout);
        trace!(echo_us = us, "echo pulse");
        Ok(us)
    }

    fn delay_us(&mut self, us: u32) {
        spin_delay_us(us);
    }
}

/// Push button on one GPIO. The internal bias resistor matches the wiring:
/// pull-up for buttons to ground, pull-down for buttons to supply.
pub struct HardwareButton {
    pin: InputPin,
}

impl HardwareButton {
    pub fn new(pin: u8, active_low: bool) -> Result<Self> {
        let gpio = open_gpio()?;
        let line = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(format!("open button pin {pin}: {e}")))?;
        let bias = ButtonBias::for_polarity(active_low);
        let pin = match bias {
            ButtonBias::PullUp => line.into_input_pullup(),
            ButtonBias::PullDown => line.into_input_pulldown(),
        };
        trace!(?bias, "button input ready");
        Ok(Self { pin })
    }
}

impl DigitalInput for HardwareButton {
    fn is_high(&mut self) -> std::result::Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.pin.is_high())
    }
}
