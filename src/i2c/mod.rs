// Licensed under the Apache-2.0 license

//! SCB I2C target-mode driver for PSoC Edge devices.
//!
//! This module implements the I2C target (slave) side of the SCB block for
//! bare-metal `no_std` environments: an interrupt-driven protocol state
//! machine layered over an opaque hardware register interface, plus a
//! synchronous byte-level read/write API for the foreground thread.

pub mod common;
pub mod dispatch;
pub mod nvic;
pub mod target;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use common::{
    AddressWidth, Direction, Error, EventFlags, I2cSpeed, TargetConfig, TargetConfigBuilder,
    TargetEvent, TargetPins, TargetState, TargetStatus,
};
pub use dispatch::{IrqMask, TargetSlots};
pub use nvic::NvicInterrupt;
pub use target::I2cTarget;
pub use traits::{DummyTarget, InterruptControl, TargetEvents, TargetHardware};
