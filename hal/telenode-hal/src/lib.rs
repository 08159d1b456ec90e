//! Telenode Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the node logic is written
//! against. The firmware implements them on top of the chip HAL; host
//! tests implement them with plain structs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  telenode-core (debounce, graph, loop)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  telenode-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ firmware      │       │ test doubles  │
//! │ (embassy-rp)  │       │ (host)        │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`adc::AnalogInput`] - Single-channel analog sampling

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use adc::{AdcError, AnalogInput, ADC_MAX};
pub use gpio::{InputPin, OutputPin};
