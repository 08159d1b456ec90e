//! Analog input abstraction
//!
//! The node samples one 12-bit channel. Chip HALs that convert at a
//! different resolution scale their result into `0..=ADC_MAX`.

/// Full-scale reading of the 12-bit converter
pub const ADC_MAX: u16 = 4095;

/// ADC errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Conversion did not complete or reported an error
    Conversion,
}

/// Single analog input channel
pub trait AnalogInput {
    /// Take one blocking conversion
    ///
    /// Returns the raw reading in `0..=ADC_MAX`.
    fn read(&mut self) -> Result<u16, AdcError>;
}
