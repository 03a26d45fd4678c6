// Licensed under the Apache-2.0 license

//! NVIC-backed [`InterruptControl`] for Cortex-M parts.
//!
//! Each SCB channel has a dedicated interrupt line; wrapping its
//! [`InterruptNumber`] here gives the driver core masked-interrupt critical
//! sections without pulling Cortex-M specifics into the state machine.

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;

use crate::i2c::traits::InterruptControl;

/// One NVIC interrupt line, identified by the PAC's interrupt enum variant.
#[derive(Copy, Clone, Debug)]
pub struct NvicInterrupt<I: InterruptNumber> {
    line: I,
}

impl<I: InterruptNumber> NvicInterrupt<I> {
    pub const fn new(line: I) -> Self {
        Self { line }
    }

    #[must_use]
    pub fn number(&self) -> u16 {
        self.line.number()
    }
}

impl<I: InterruptNumber> InterruptControl for NvicInterrupt<I> {
    fn enable(&self) {
        // SAFETY: this line only vectors into the target driver's own
        // handler, which tolerates being unmasked at any point after the
        // instance is armed.
        unsafe { NVIC::unmask(self.line) }
    }

    fn disable(&self) {
        NVIC::mask(self.line);
    }

    fn clear_pending(&self) {
        NVIC::unpend(self.line);
    }
}
