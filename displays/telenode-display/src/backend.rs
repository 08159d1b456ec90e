//! Display surface trait
//!
//! Drawing goes to an off-screen buffer through `embedded-graphics`;
//! nothing reaches the panel until [`DisplaySurface::commit`].

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::DrawTarget;

pub use telenode_core::traits::DisplayError;

/// Monochrome draw target with an explicit commit
pub trait DisplaySurface: DrawTarget<Color = BinaryColor, Error = DisplayError> {
    /// Send the buffered frame to the panel
    fn commit(&mut self) -> Result<(), DisplayError>;
}
