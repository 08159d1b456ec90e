//! Sensor samples

use telenode_hal::ADC_MAX;

/// Largest value a sample can hold
pub const SENSOR_MAX: u16 = ADC_MAX;

/// One 12-bit sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample(u16);

impl Sample {
    /// Wrap a raw converter value, clamping anything above [`SENSOR_MAX`]
    pub fn new(raw: u16) -> Self {
        Self(raw.min(SENSOR_MAX))
    }

    /// Reading in `0..=SENSOR_MAX`
    pub fn value(self) -> u16 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_clamps() {
        assert_eq!(Sample::new(5000).value(), SENSOR_MAX);
        assert_eq!(Sample::new(1234).value(), 1234);
    }
}
