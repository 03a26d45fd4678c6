// Licensed under the Apache-2.0 license

//! Common types and constants for the SCB I2C target driver.
//!
//! This module provides shared definitions for error handling, event
//! decoding, and target configuration used across the driver implementation.

use fugit::HertzU32;
use heapless::Vec;

/// Standard I2C bus speed grades.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum I2cSpeed {
    Standard = 100_000,
    Fast = 400_000,
    FastPlus = 1_000_000,
}

impl I2cSpeed {
    /// Bus bit rate for this speed grade.
    #[must_use]
    pub const fn bit_rate(self) -> HertzU32 {
        HertzU32::from_raw(self as u32)
    }
}

/// Target address width on the bus.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AddressWidth {
    Bits7,
    Bits10,
}

impl AddressWidth {
    /// Parse a raw width in bits; only 7 and 10 are valid.
    pub fn from_bits(bits: u8) -> Result<Self, Error> {
        match bits {
            7 => Ok(AddressWidth::Bits7),
            10 => Ok(AddressWidth::Bits10),
            _ => Err(Error::InvalidAddressWidth),
        }
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            AddressWidth::Bits7 => 7,
            AddressWidth::Bits10 => 10,
        }
    }

    /// Hardware address-match mask for this width.
    #[must_use]
    pub const fn address_mask(self) -> u8 {
        match self {
            AddressWidth::Bits7 => 0xFE,
            AddressWidth::Bits10 => 0xFC,
        }
    }

    const fn max_address(self) -> u16 {
        match self {
            AddressWidth::Bits7 => 0x7F,
            AddressWidth::Bits10 => 0x3FF,
        }
    }
}

/// Transfer direction from the bus controller's point of view:
/// `Read` means the controller reads from this target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

/// Per-transaction protocol state.
///
/// Transitions happen only on the interrupt path after construction.
/// `Reading`/`Writing` are the at-rest states between transactions and
/// record which direction the last completed transfer had.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TargetState {
    Idle,
    ReadArmed,
    WriteArmed,
    Reading,
    Writing,
    Error,
}

/// Discrete protocol events, in their fixed processing order.
///
/// A composite interrupt word is decoded into these variants and folded in
/// declaration order: address matches first, buffer exhaustion next,
/// completions next, the error marker last.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TargetEvent {
    AddressMatchRead,
    AddressMatchWrite,
    ReadBufferEmpty,
    ReadComplete,
    WriteComplete,
    BusError,
}

/// Raw event bitmask as delivered by the hardware interrupt routine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFlags(u32);

impl EventFlags {
    /// Controller addressed this target for a read (optional capability).
    pub const ADDR_MATCH_READ: Self = Self(1 << 0);
    /// Controller addressed this target for a write (optional capability).
    pub const ADDR_MATCH_WRITE: Self = Self(1 << 1);
    /// The armed read region is exhausted mid-transaction.
    pub const READ_BUF_EMPTY: Self = Self(1 << 2);
    /// Controller finished reading (restart or stop seen).
    pub const READ_COMPLETE: Self = Self(1 << 3);
    /// Controller finished writing (restart or stop seen).
    pub const WRITE_COMPLETE: Self = Self(1 << 4);
    /// A bus error accompanied this interrupt.
    pub const BUS_ERROR: Self = Self(1 << 5);

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Decode the bitmask into discrete events in the fixed processing
    /// order required for deterministic handling of composite interrupts.
    #[must_use]
    pub fn decode(self) -> Vec<TargetEvent, 6> {
        const ORDER: [(EventFlags, TargetEvent); 6] = [
            (EventFlags::ADDR_MATCH_READ, TargetEvent::AddressMatchRead),
            (EventFlags::ADDR_MATCH_WRITE, TargetEvent::AddressMatchWrite),
            (EventFlags::READ_BUF_EMPTY, TargetEvent::ReadBufferEmpty),
            (EventFlags::READ_COMPLETE, TargetEvent::ReadComplete),
            (EventFlags::WRITE_COMPLETE, TargetEvent::WriteComplete),
            (EventFlags::BUS_ERROR, TargetEvent::BusError),
        ];

        let mut events = Vec::new();
        for (flag, event) in ORDER {
            if self.contains(flag) {
                // Capacity matches the number of defined flags.
                let _ = events.push(event);
            }
        }
        events
    }
}

impl core::ops::BitOr for EventFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for EventFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// SCL/SDA pin assignment for a target instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TargetPins {
    pub scl: u8,
    pub sda: u8,
}

/// Status snapshot for a target instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TargetStatus {
    /// Whether the instance is initialized and armed.
    pub enabled: bool,
    /// Configured target address.
    pub address: u16,
    /// Current protocol state.
    pub state: TargetState,
    /// Bytes received and not yet drained by the foreground.
    pub rx_available: usize,
    /// Bytes staged for the controller to read.
    pub tx_pending: usize,
    /// Most recent protocol event, if any.
    pub last_event: Option<TargetEvent>,
}

/// Validated target-mode configuration.
#[derive(Copy, Clone, Debug)]
pub struct TargetConfig {
    /// Hardware channel index.
    pub id: u8,
    pub address: u16,
    pub address_width: AddressWidth,
    pub pins: TargetPins,
    pub speed: I2cSpeed,
    /// SCB module clock used to derive the bit-rate divider.
    pub clock: HertzU32,
    /// Target mode works byte-accurate without the RX FIFO.
    pub use_rx_fifo: bool,
    pub use_tx_fifo: bool,
    /// ACK the general-call address (0x00). Off: general call is rejected.
    pub ack_general_call: bool,
}

impl TargetConfig {
    /// Hardware address-match mask derived from the address width.
    #[must_use]
    pub const fn address_mask(&self) -> u8 {
        self.address_width.address_mask()
    }

    /// Check the address against the configured width. The builder performs
    /// this check, but configs can also be assembled by hand.
    pub fn validate(&self) -> Result<(), Error> {
        if self.address == 0 || self.address > self.address_width.max_address() {
            return Err(Error::InvalidAddress);
        }
        Ok(())
    }
}

/// Builder for [`TargetConfig`].
///
/// `build` validates the address width, the address range, and that both
/// bus pins are assigned, before any hardware is touched.
pub struct TargetConfigBuilder {
    id: u8,
    address: u16,
    address_width_bits: u8,
    scl: Option<u8>,
    sda: Option<u8>,
    speed: I2cSpeed,
    clock: HertzU32,
    use_rx_fifo: bool,
    use_tx_fifo: bool,
    ack_general_call: bool,
}

impl Default for TargetConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: 0,
            address: 0,
            address_width_bits: 7,
            scl: None,
            sda: None,
            speed: I2cSpeed::Fast,
            // clk_peri 100 MHz through the divide-by-8 peripheral divider
            clock: HertzU32::from_raw(12_500_000),
            use_rx_fifo: false,
            use_tx_fifo: true,
            ack_general_call: false,
        }
    }

    #[must_use]
    pub fn id(mut self, id: u8) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn address(mut self, address: u16) -> Self {
        self.address = address;
        self
    }

    /// Address width in bits; validated by `build` (7 or 10).
    #[must_use]
    pub fn address_width_bits(mut self, bits: u8) -> Self {
        self.address_width_bits = bits;
        self
    }

    #[must_use]
    pub fn scl(mut self, pin: u8) -> Self {
        self.scl = Some(pin);
        self
    }

    #[must_use]
    pub fn sda(mut self, pin: u8) -> Self {
        self.sda = Some(pin);
        self
    }

    #[must_use]
    pub fn speed(mut self, speed: I2cSpeed) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: HertzU32) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn use_rx_fifo(mut self, enabled: bool) -> Self {
        self.use_rx_fifo = enabled;
        self
    }

    #[must_use]
    pub fn use_tx_fifo(mut self, enabled: bool) -> Self {
        self.use_tx_fifo = enabled;
        self
    }

    #[must_use]
    pub fn ack_general_call(mut self, enabled: bool) -> Self {
        self.ack_general_call = enabled;
        self
    }

    pub fn build(self) -> Result<TargetConfig, Error> {
        let address_width = AddressWidth::from_bits(self.address_width_bits)?;
        let (scl, sda) = match (self.scl, self.sda) {
            (Some(scl), Some(sda)) => (scl, sda),
            _ => return Err(Error::MissingPins),
        };

        let config = TargetConfig {
            id: self.id,
            address: self.address,
            address_width,
            pins: TargetPins { scl, sda },
            speed: self.speed,
            clock: self.clock,
            use_rx_fifo: self.use_rx_fifo,
            use_tx_fifo: self.use_tx_fifo,
            ack_general_call: self.ack_general_call,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Foreground-visible driver errors.
///
/// Transfer errors never appear here; they are absorbed by the interrupt
/// path and surface only as an ended notification with a zero count.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Address width other than 7 or 10 bits.
    InvalidAddressWidth,
    /// Target address of zero or out of range for the configured width.
    InvalidAddress,
    /// SCL or SDA pin not assigned.
    MissingPins,
    /// The underlying register interface rejected initialization.
    HardwareInit,
    /// The requested hardware channel is already claimed.
    NoFreeSlot,
    /// Channel index beyond the fixed instance table.
    NoSuchChannel,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Error::InvalidAddressWidth => "address width must be 7 or 10",
            Error::InvalidAddress => "target address out of range",
            Error::MissingPins => "scl and sda pins are required",
            Error::HardwareInit => "hardware init failed",
            Error::NoFreeSlot => "hardware channel already claimed",
            Error::NoSuchChannel => "no such hardware channel",
        };
        f.write_str(msg)
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        embedded_hal::i2c::ErrorKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_orders_composite_words_deterministically() {
        let flags = EventFlags::BUS_ERROR
            | EventFlags::WRITE_COMPLETE
            | EventFlags::ADDR_MATCH_WRITE
            | EventFlags::READ_BUF_EMPTY;

        let events = flags.decode();
        assert_eq!(
            events.as_slice(),
            &[
                TargetEvent::AddressMatchWrite,
                TargetEvent::ReadBufferEmpty,
                TargetEvent::WriteComplete,
                TargetEvent::BusError,
            ]
        );
    }

    #[test]
    fn decode_empty_word_yields_no_events() {
        assert!(EventFlags::empty().decode().is_empty());
    }

    #[test]
    fn address_masks_match_width() {
        assert_eq!(AddressWidth::Bits7.address_mask(), 0xFE);
        assert_eq!(AddressWidth::Bits10.address_mask(), 0xFC);
    }

    #[test]
    fn builder_rejects_bad_address_width() {
        let result = TargetConfigBuilder::new()
            .address(0x42)
            .address_width_bits(9)
            .scl(21)
            .sda(22)
            .build();
        assert_eq!(result.unwrap_err(), Error::InvalidAddressWidth);
    }

    #[test]
    fn builder_rejects_missing_pins() {
        let result = TargetConfigBuilder::new().address(0x42).scl(21).build();
        assert_eq!(result.unwrap_err(), Error::MissingPins);
    }

    #[test]
    fn builder_rejects_address_out_of_range() {
        let result = TargetConfigBuilder::new()
            .address(0x80)
            .scl(21)
            .sda(22)
            .build();
        assert_eq!(result.unwrap_err(), Error::InvalidAddress);

        // The same address is fine with 10-bit addressing.
        let config = TargetConfigBuilder::new()
            .address(0x80)
            .address_width_bits(10)
            .scl(21)
            .sda(22)
            .build()
            .unwrap();
        assert_eq!(config.address_mask(), 0xFC);
    }

    #[test]
    fn builder_defaults_follow_target_mode_guidance() {
        let config = TargetConfigBuilder::new()
            .address(0x42)
            .scl(21)
            .sda(22)
            .build()
            .unwrap();

        assert!(!config.use_rx_fifo);
        assert!(config.use_tx_fifo);
        assert!(!config.ack_general_call);
        assert_eq!(config.speed, I2cSpeed::Fast);
        assert_eq!(config.speed.bit_rate().raw(), 400_000);
    }
}
