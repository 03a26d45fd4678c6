// Licensed under the Apache-2.0 license

//! Foreground/interrupt arbitration and per-channel instance registry.
//!
//! [`IrqMask`] is the crate's critical-section primitive: a scoped guard
//! that masks one interrupt line for as long as it lives. The foreground
//! API never takes a lock; it excludes the only other writer by keeping its
//! interrupt masked, which on single-core Cortex-M is sufficient and cheap.
//!
//! [`TargetSlots`] maps hardware channel numbers to live target instances
//! so interrupt handlers, which only know their channel number, can route
//! into the right instance. The arena is fixed-size and allocation-free.

use crate::common::{Logger, NoOpLogger};
use crate::i2c::common::Error;
use crate::i2c::target::I2cTarget;
use crate::i2c::traits::{DummyTarget, InterruptControl, TargetEvents, TargetHardware};

/// Scoped interrupt mask. Masks the line on construction and restores it on
/// drop, so every exit path of the guarded block re-enables the interrupt.
pub struct IrqMask<'a, C: InterruptControl> {
    irq: &'a C,
}

impl<'a, C: InterruptControl> IrqMask<'a, C> {
    pub fn new(irq: &'a C) -> Self {
        irq.disable();
        Self { irq }
    }
}

impl<C: InterruptControl> Drop for IrqMask<'_, C> {
    fn drop(&mut self) {
        self.irq.enable();
    }
}

/// Fixed-size registry of target instances, indexed by hardware channel
/// number. `N` is the number of SCB channels the device exposes.
pub struct TargetSlots<'b, H, C, T = DummyTarget, L = NoOpLogger, const N: usize = 8>
where
    H: TargetHardware,
    C: InterruptControl,
    T: TargetEvents,
    L: Logger,
{
    slots: [Option<I2cTarget<'b, H, C, T, L>>; N],
}

impl<'b, H, C, T, L, const N: usize> TargetSlots<'b, H, C, T, L, N>
where
    H: TargetHardware,
    C: InterruptControl,
    T: TargetEvents,
    L: Logger,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Number of channels this registry can hold.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Register an instance under its channel number.
    ///
    /// # Errors
    ///
    /// Hands the instance back with `Error::NoSuchChannel` if its id is out
    /// of range, or `Error::NoFreeSlot` if the channel is already claimed.
    pub fn claim(
        &mut self,
        target: I2cTarget<'b, H, C, T, L>,
    ) -> Result<(), (I2cTarget<'b, H, C, T, L>, Error)> {
        let id = usize::from(target.id());
        match self.slots.get_mut(id) {
            None => Err((target, Error::NoSuchChannel)),
            Some(slot @ None) => {
                *slot = Some(target);
                Ok(())
            }
            Some(Some(_)) => Err((target, Error::NoFreeSlot)),
        }
    }

    /// Remove and return the instance for a channel, if one is registered.
    pub fn release(&mut self, id: u8) -> Option<I2cTarget<'b, H, C, T, L>> {
        self.slots.get_mut(usize::from(id)).and_then(Option::take)
    }

    #[must_use]
    pub fn get(&self, id: u8) -> Option<&I2cTarget<'b, H, C, T, L>> {
        self.slots.get(usize::from(id)).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: u8) -> Option<&mut I2cTarget<'b, H, C, T, L>> {
        self.slots.get_mut(usize::from(id)).and_then(Option::as_mut)
    }

    #[must_use]
    pub fn is_claimed(&self, id: u8) -> bool {
        self.get(id).is_some()
    }

    /// Interrupt-handler entry point: route a channel interrupt into its
    /// registered instance. An interrupt on an unclaimed channel is dropped.
    pub fn dispatch(&mut self, id: u8) {
        if let Some(target) = self.get_mut(id) {
            target.poll_interrupt();
        }
    }

    /// Poll every registered instance. For vector tables that share one
    /// handler across all SCB channels; empty slots are skipped.
    pub fn dispatch_all(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.poll_interrupt();
        }
    }
}

impl<H, C, T, L, const N: usize> Default for TargetSlots<'_, H, C, T, L, N>
where
    H: TargetHardware,
    C: InterruptControl,
    T: TargetEvents,
    L: Logger,
{
    fn default() -> Self {
        Self::new()
    }
}
