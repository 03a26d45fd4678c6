// Licensed under the Apache-2.0 license

//! Interrupt-driven I2C target instance.
//!
//! [`I2cTarget`] binds one SCB channel, its interrupt line, and a
//! caller-supplied shared buffer into a target device: the protocol state
//! machine runs entirely on the interrupt path, while `read_bytes` and
//! `write_bytes` give the foreground thread synchronous access to the same
//! buffer under a masked-interrupt critical section.
//!
//! The single most important invariant lives here: every completed
//! transaction re-arms its buffer region at offset zero before the event
//! handler returns. Hardware that is not re-armed silently resumes the next
//! transaction mid-buffer.

use crate::common::{Logger, NoOpLogger};
use crate::i2c::common::{
    AddressWidth, Direction, Error, EventFlags, TargetConfig, TargetEvent, TargetPins,
    TargetState, TargetStatus,
};
use crate::i2c::dispatch::IrqMask;
use crate::i2c::traits::{DummyTarget, InterruptControl, TargetEvents, TargetHardware};

/// One I2C target instance bound to a hardware channel.
///
/// The shared buffer is borrowed from the caller and must outlive the
/// instance's active period; the driver never reads or writes past its
/// length. Cursors and buffer contents are the only state shared between
/// the interrupt and foreground contexts, and every foreground access is
/// wrapped in an [`IrqMask`] critical section.
#[derive(Debug)]
pub struct I2cTarget<'b, H, C, T = DummyTarget, L = NoOpLogger>
where
    H: TargetHardware,
    C: InterruptControl,
    T: TargetEvents,
    L: Logger,
{
    hw: H,
    irq: C,
    events: T,
    logger: L,
    id: u8,
    pins: TargetPins,
    address: u16,
    address_width: AddressWidth,
    state: TargetState,
    /// High-water mark of foreground-staged data for controller reads.
    tx_index: usize,
    /// Foreground drain cursor into the received bytes.
    rx_index: usize,
    /// Bytes received by the last completed write transaction.
    rx_count: usize,
    last_event: Option<TargetEvent>,
    mem: &'b mut [u8],
    active: bool,
}

impl<'b, H, C, T, L> I2cTarget<'b, H, C, T, L>
where
    H: TargetHardware,
    C: InterruptControl,
    T: TargetEvents,
    L: Logger,
{
    /// Construct and bring up a target instance.
    ///
    /// The configuration is validated before any hardware call is made.
    /// Both buffer regions are armed before the peripheral is enabled, as
    /// the hardware requires.
    ///
    /// # Errors
    ///
    /// `Error::InvalidAddress` for an address that does not fit the
    /// configured width, `Error::HardwareInit` if the register interface
    /// rejects the configuration.
    pub fn new(
        hw: H,
        irq: C,
        events: T,
        logger: L,
        config: &TargetConfig,
        mem: &'b mut [u8],
    ) -> Result<Self, Error> {
        config.validate()?;
        let mut target = Self {
            hw,
            irq,
            events,
            logger,
            id: config.id,
            pins: config.pins,
            address: config.address,
            address_width: config.address_width,
            state: TargetState::Idle,
            tx_index: 0,
            rx_index: 0,
            rx_count: 0,
            last_event: None,
            mem,
            active: false,
        };
        target.bring_up(config)?;
        Ok(target)
    }

    fn bring_up(&mut self, config: &TargetConfig) -> Result<(), Error> {
        self.hw.init(config).map_err(|_| Error::HardwareInit)?;

        // Arm both regions before enable; the peripheral NACKs until then.
        self.hw.configure_read_buffer(&*self.mem);
        self.hw.configure_write_buffer(self.mem.len());
        self.tx_index = 0;
        self.rx_index = 0;
        self.rx_count = 0;
        self.state = TargetState::Idle;

        self.irq.clear_pending();
        self.irq.enable();
        self.hw.enable();
        self.active = true;

        self.logger.log(format_args!(
            "I2C target initialized: addr=0x{:02X}, width={}-bit",
            self.address,
            self.address_width.bits()
        ));
        Ok(())
    }

    /// Reconfigure an existing instance: disable, reprogram, re-enable.
    ///
    /// This is the supported re-init path, not an error. The hardware
    /// channel binding (`id`) is fixed at construction and not changed here.
    ///
    /// # Errors
    ///
    /// Same conditions as [`I2cTarget::new`].
    pub fn reconfigure(&mut self, config: &TargetConfig) -> Result<(), Error> {
        config.validate()?;
        if self.active {
            self.hw.disable();
        }
        self.address = config.address;
        self.address_width = config.address_width;
        self.pins = config.pins;
        self.bring_up(config)
    }

    /// Tear the instance down. Idempotent; safe mid-transaction.
    ///
    /// The interrupt line is masked strictly before the instance state is
    /// cleared so no stale callback can fire into a torn-down instance.
    pub fn deinit(&mut self) {
        if !self.active {
            return;
        }
        self.irq.disable();
        self.hw.disable();
        self.state = TargetState::Idle;
        self.tx_index = 0;
        self.rx_index = 0;
        self.rx_count = 0;
        self.active = false;
        self.logger.log(format_args!("I2C target deinitialized"));
    }

    /// Tear down and recover the hardware and interrupt handles.
    pub fn free(mut self) -> (H, C) {
        self.deinit();
        let Self { hw, irq, .. } = self;
        (hw, irq)
    }

    /// Interrupt-path entry point: run the hardware interrupt routine and
    /// fold any pending events through the state machine. No-op once the
    /// instance is deinitialized.
    pub fn poll_interrupt(&mut self) {
        if !self.active {
            return;
        }
        let flags = self.hw.service_interrupt();
        if !flags.is_empty() {
            self.handle_events(flags);
        }
    }

    /// Process a decoded event word.
    ///
    /// Events are handled in the fixed order address-match, buffer-empty,
    /// completion, error, so composite interrupt words behave
    /// deterministically. A word carrying both a completion and the error
    /// bit raises exactly one ended notification.
    pub fn handle_events(&mut self, flags: EventFlags) {
        let error = flags.contains(EventFlags::BUS_ERROR);
        let mut ended = false;

        for event in flags.decode() {
            self.last_event = Some(event);
            match event {
                TargetEvent::AddressMatchRead => {
                    self.state = TargetState::ReadArmed;
                    self.events.on_address_match(Direction::Read);
                }
                TargetEvent::AddressMatchWrite => {
                    self.state = TargetState::WriteArmed;
                    self.events.on_address_match(Direction::Write);
                }
                TargetEvent::ReadBufferEmpty => self.continue_read_window(),
                TargetEvent::ReadComplete => {
                    self.finish_read(error);
                    ended = true;
                }
                TargetEvent::WriteComplete => {
                    self.finish_write(error);
                    ended = true;
                }
                TargetEvent::BusError => {
                    // A completion in the same word already closed the
                    // transaction; only a bare error aborts here.
                    if !ended {
                        let direction = match self.state {
                            TargetState::ReadArmed | TargetState::Reading => Direction::Read,
                            _ => Direction::Write,
                        };
                        self.state = TargetState::Error;
                        self.logger.log(format_args!("I2C target: bus error"));
                        self.events.on_transaction_end(direction, 0);
                    }
                }
            }
        }
    }

    /// Controller finished reading: restart or stop seen.
    fn finish_read(&mut self, error: bool) {
        let sent = self.hw.read_transfer_count();
        if !error {
            self.logger.log(format_args!(
                "I2C target: read complete, {sent} bytes sent"
            ));
        }

        // Re-arm at offset 0 before returning, or the next read transaction
        // resumes wherever the previous one stopped.
        self.hw.configure_read_buffer(&*self.mem);
        self.tx_index = 0;
        self.hw.clear_read_status();
        self.state = TargetState::Reading;
        self.events
            .on_transaction_end(Direction::Read, if error { 0 } else { sent });
    }

    /// Controller finished writing: drain received bytes and re-arm.
    fn finish_write(&mut self, error: bool) {
        let mut count = 0;
        if !error {
            let received = self.hw.write_transfer_count().min(self.mem.len());
            if let Some(dest) = self.mem.get_mut(..received) {
                count = self.hw.collect_received(dest);
            }
            self.rx_count = count;
            self.rx_index = 0;
            self.logger.log(format_args!(
                "I2C target: write complete, {count} bytes received"
            ));
        }

        // Fresh receive window for the next transaction, error or not.
        self.hw.configure_write_buffer(self.mem.len());
        self.hw.clear_write_status();
        self.state = TargetState::Writing;
        self.events.on_transaction_end(Direction::Write, count);
    }

    /// The armed read region ran dry mid-transaction; feed the hardware the
    /// next chunk of staged data, if any exists.
    fn continue_read_window(&mut self) {
        let sent = self.hw.read_transfer_count();
        if let Some(chunk) = self.mem.get(sent..self.tx_index) {
            if !chunk.is_empty() {
                self.hw.configure_read_buffer(chunk);
            }
        }
    }

    /// Drain received bytes into `dest`, advancing the read cursor.
    ///
    /// Returns how many bytes were copied, bounded by `dest.len()` and by
    /// what the last write transaction delivered. Zero is a valid result
    /// meaning nothing has been received yet; it is never an error.
    pub fn read_bytes(&mut self, dest: &mut [u8]) -> usize {
        let _mask = IrqMask::new(&self.irq);

        let available = self.rx_count.saturating_sub(self.rx_index);
        let len = dest.len().min(available);
        if len == 0 {
            return 0;
        }
        let end = self.rx_index + len;
        match (self.mem.get(self.rx_index..end), dest.get_mut(..len)) {
            (Some(src), Some(dst)) => {
                dst.copy_from_slice(src);
                self.rx_index = end;
                len
            }
            _ => 0,
        }
    }

    /// Stage bytes for the controller to read, advancing the write cursor
    /// and re-arming the hardware read region to the new high-water mark so
    /// the controller sees the data immediately.
    ///
    /// Saturates at the end of the shared buffer: the return value is the
    /// number of bytes actually staged, which may be short or zero.
    pub fn write_bytes(&mut self, src: &[u8]) -> usize {
        let _mask = IrqMask::new(&self.irq);

        let space = self.mem.len().saturating_sub(self.tx_index);
        let len = src.len().min(space);
        if len == 0 {
            return 0;
        }
        let end = self.tx_index + len;
        match (self.mem.get_mut(self.tx_index..end), src.get(..len)) {
            (Some(dst), Some(s)) => {
                dst.copy_from_slice(s);
                self.tx_index = end;
            }
            _ => return 0,
        }
        if let Some(window) = self.mem.get(..self.tx_index) {
            self.hw.configure_read_buffer(window);
        }
        len
    }

    #[cfg(test)]
    pub(crate) fn hw_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    #[must_use]
    pub fn id(&self) -> u8 {
        self.id
    }

    #[must_use]
    pub fn address(&self) -> u16 {
        self.address
    }

    #[must_use]
    pub fn pins(&self) -> TargetPins {
        self.pins
    }

    #[must_use]
    pub fn state(&self) -> TargetState {
        self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn status(&self) -> TargetStatus {
        TargetStatus {
            enabled: self.active,
            address: self.address,
            state: self.state,
            rx_available: self.rx_count.saturating_sub(self.rx_index),
            tx_pending: self.tx_index,
            last_event: self.last_event,
        }
    }
}

impl<H, C, T, L> core::fmt::Display for I2cTarget<'_, H, C, T, L>
where
    H: TargetHardware,
    C: InterruptControl,
    T: TargetEvents,
    L: Logger,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "I2cTarget({}, addr=0x{:02X}, scl={}, sda={})",
            self.id, self.address, self.pins.scl, self.pins.sda
        )
    }
}
