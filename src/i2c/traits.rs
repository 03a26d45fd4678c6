// Licensed under the Apache-2.0 license

//! Hardware abstraction traits for the SCB I2C target driver.
//!
//! The driver core is generic over three seams:
//!
//! - [`TargetHardware`]: the vendor register interface for one SCB channel,
//!   treated as an opaque capability contract. The driver configures it once
//!   and forwards interrupts into it; it never touches registers itself.
//! - [`InterruptControl`]: the interrupt-controller line for that channel,
//!   used both for the foreground critical section and for teardown.
//! - [`TargetEvents`]: the application notification surface raised from
//!   interrupt context when transactions end.
//!
//! Selecting implementations at construction time (rather than swapping
//! fields at runtime) keeps dispatch static and the interrupt path
//! allocation-free.

use crate::i2c::common::{Direction, EventFlags, TargetConfig};

/// Register interface of one SCB channel in target mode.
///
/// Implementations wrap the vendor peripheral access crate for a specific
/// hardware revision. All methods must be callable from interrupt context:
/// bounded time, no blocking, no allocation.
pub trait TargetHardware {
    /// Hardware-specific error type that implements embedded-hal error traits.
    type Error: embedded_hal::i2c::Error + core::fmt::Debug;

    /// Program target mode: address, address mask, FIFO usage flags, and the
    /// clock divider for the configured bit rate. Called with the peripheral
    /// disabled; does not enable it.
    ///
    /// # Errors
    ///
    /// Returns an error if the hardware rejects the configuration.
    fn init(&mut self, config: &TargetConfig) -> Result<(), Self::Error>;

    /// Enable the peripheral. Buffers must be armed beforehand.
    fn enable(&mut self);

    /// Disable the peripheral. Safe to call mid-transaction.
    fn disable(&mut self);

    /// Arm the region the controller will read from on the next (or
    /// continuing) read transaction. Replaces any previously armed region.
    ///
    /// Implementations latch the pointer and length; the region must stay
    /// valid until re-armed or the peripheral is disabled.
    fn configure_read_buffer(&mut self, data: &[u8]);

    /// Arm the receive side for up to `capacity` bytes from the controller.
    /// Bytes beyond the capacity are NACKed.
    fn configure_write_buffer(&mut self, capacity: usize);

    /// Bytes the controller has read from the armed read region in the
    /// current or most recently completed transaction.
    fn read_transfer_count(&self) -> usize;

    /// Bytes the controller has written in the current or most recently
    /// completed transaction.
    fn write_transfer_count(&self) -> usize;

    /// Drain the bytes the controller wrote during the last transaction
    /// into `dest`, returning how many were copied.
    fn collect_received(&mut self, dest: &mut [u8]) -> usize;

    /// Clear the sticky read-transaction status bits.
    fn clear_read_status(&mut self);

    /// Clear the sticky write-transaction status bits so the next
    /// transaction is reported fresh.
    fn clear_write_status(&mut self);

    /// Run the hardware's own target-interrupt routine and report the
    /// pending protocol events. Called by the interrupt dispatcher with
    /// interrupts for this channel serialized.
    fn service_interrupt(&mut self) -> EventFlags;

    /// Whether this hardware revision reports explicit address-match
    /// events. When `false`, direction is known only at completion and the
    /// armed states are skipped.
    fn has_address_match_events(&self) -> bool {
        false
    }
}

/// Interrupt-controller line for one peripheral channel.
///
/// Receivers are `&self`: interrupt-controller registers are interior
/// mutable, and the foreground critical section needs to toggle the line
/// while other parts of the instance stay mutably borrowed.
pub trait InterruptControl {
    fn enable(&self);
    fn disable(&self);
    fn clear_pending(&self);
}

/// Application-visible protocol notifications, raised from interrupt
/// context. Implementations must be fast and non-blocking; defer heavy
/// processing to the foreground.
pub trait TargetEvents {
    /// The controller addressed this target. Only raised on hardware that
    /// reports address-match events.
    fn on_address_match(&mut self, _direction: Direction) {}

    /// A transaction ended (restart, stop, or bus error). `count` is the
    /// number of bytes actually transferred; zero on an aborted transfer.
    fn on_transaction_end(&mut self, _direction: Direction, _count: usize) {}
}

/// No-op event handler for wiring a target without application callbacks.
#[derive(Copy, Clone, Debug, Default)]
pub struct DummyTarget;

impl TargetEvents for DummyTarget {}
