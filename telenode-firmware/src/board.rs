//! Pico W board bindings
//!
//! Wraps embassy-rp peripherals in the `telenode-hal` traits so the core
//! logic never sees chip types.
//!
//! Wiring:
//! - GPIO12: push button to ground (internal pull-up, pressed = LOW)
//! - GPIO13: indicator LED
//! - GPIO26: analog sensor (ADC0)
//! - GPIO4/GPIO5: I2C0 SDA/SCL to the SSD1306

use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_rp::gpio::{Input, Output};
use telenode_hal::{AdcError, AnalogInput, InputPin, OutputPin};

/// Push button input
pub struct Button(Input<'static>);

impl Button {
    pub fn new(pin: Input<'static>) -> Self {
        Self(pin)
    }
}

impl InputPin for Button {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}

/// Reporting indicator LED
pub struct Indicator(Output<'static>);

impl Indicator {
    pub fn new(pin: Output<'static>) -> Self {
        Self(pin)
    }
}

impl OutputPin for Indicator {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// Analog sensor on one ADC channel
pub struct Sensor {
    adc: Adc<'static, Blocking>,
    channel: Channel<'static>,
}

impl Sensor {
    pub fn new(adc: Adc<'static, Blocking>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl AnalogInput for Sensor {
    fn read(&mut self) -> Result<u16, AdcError> {
        self.adc
            .blocking_read(&mut self.channel)
            .map_err(|_| AdcError::Conversion)
    }
}
