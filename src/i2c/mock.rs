// Licensed under the Apache-2.0 license

//! Recording test doubles for the target driver's hardware seams.
//!
//! `MockHw` records every register-interface call so tests can assert
//! ordering and argument values; `MockIrq` counts interrupt-line toggles;
//! `SharedEvents` captures application notifications behind an `Rc` so the
//! test keeps a handle after the driver takes ownership.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::i2c::common::{Direction, Error, EventFlags, TargetConfig};
use crate::i2c::traits::{InterruptControl, TargetEvents, TargetHardware};

pub(crate) type Trace = Rc<RefCell<Vec<&'static str>>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum HwCall {
    Init,
    Enable,
    Disable,
    ArmRead(usize),
    ArmWrite(usize),
    Collect(usize),
    ClearRead,
    ClearWrite,
}

#[derive(Debug)]
pub(crate) struct MockHw {
    pub calls: Vec<HwCall>,
    pub fail_init: bool,
    /// Bytes the controller wrote, handed out by `collect_received`.
    pub pending_rx: Vec<u8>,
    pub read_count: usize,
    pub write_count: usize,
    pub queued_events: VecDeque<EventFlags>,
    pub addr_match_capable: bool,
    pub trace: Option<Trace>,
}

impl MockHw {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            fail_init: false,
            pending_rx: Vec::new(),
            read_count: 0,
            write_count: 0,
            queued_events: VecDeque::new(),
            addr_match_capable: true,
            trace: None,
        }
    }

    /// Simulate a controller write transaction: the bytes land in the
    /// hardware and a write-complete interrupt becomes pending.
    pub fn master_write(&mut self, data: &[u8]) {
        self.pending_rx = data.to_vec();
        self.write_count = data.len();
        self.queued_events.push_back(EventFlags::WRITE_COMPLETE);
    }

    pub fn queue_events(&mut self, events: EventFlags) {
        self.queued_events.push_back(events);
    }

    pub fn last_armed_read_len(&self) -> Option<usize> {
        self.calls.iter().rev().find_map(|call| match call {
            HwCall::ArmRead(len) => Some(*len),
            _ => None,
        })
    }

    pub fn count_of(&self, wanted: HwCall) -> usize {
        self.calls.iter().filter(|call| **call == wanted).count()
    }

    fn record(&mut self, call: HwCall, label: &'static str) {
        self.calls.push(call);
        if let Some(trace) = &self.trace {
            trace.borrow_mut().push(label);
        }
    }
}

impl TargetHardware for MockHw {
    type Error = Error;

    fn init(&mut self, _config: &TargetConfig) -> Result<(), Self::Error> {
        self.record(HwCall::Init, "hw.init");
        if self.fail_init {
            Err(Error::HardwareInit)
        } else {
            Ok(())
        }
    }

    fn enable(&mut self) {
        self.record(HwCall::Enable, "hw.enable");
    }

    fn disable(&mut self) {
        self.record(HwCall::Disable, "hw.disable");
    }

    fn configure_read_buffer(&mut self, data: &[u8]) {
        self.record(HwCall::ArmRead(data.len()), "hw.arm_read");
    }

    fn configure_write_buffer(&mut self, capacity: usize) {
        self.record(HwCall::ArmWrite(capacity), "hw.arm_write");
    }

    fn read_transfer_count(&self) -> usize {
        self.read_count
    }

    fn write_transfer_count(&self) -> usize {
        self.write_count
    }

    fn collect_received(&mut self, dest: &mut [u8]) -> usize {
        let n = dest.len().min(self.pending_rx.len());
        dest[..n].copy_from_slice(&self.pending_rx[..n]);
        self.record(HwCall::Collect(n), "hw.collect");
        n
    }

    fn clear_read_status(&mut self) {
        self.record(HwCall::ClearRead, "hw.clear_read");
    }

    fn clear_write_status(&mut self) {
        self.record(HwCall::ClearWrite, "hw.clear_write");
    }

    fn service_interrupt(&mut self) -> EventFlags {
        self.queued_events.pop_front().unwrap_or_default()
    }

    fn has_address_match_events(&self) -> bool {
        self.addr_match_capable
    }
}

#[derive(Debug)]
pub(crate) struct MockIrq {
    pub enabled: Cell<bool>,
    pub enables: Cell<usize>,
    pub disables: Cell<usize>,
    pub clears: Cell<usize>,
    pub trace: Option<Trace>,
}

impl MockIrq {
    pub fn new() -> Self {
        Self {
            enabled: Cell::new(false),
            enables: Cell::new(0),
            disables: Cell::new(0),
            clears: Cell::new(0),
            trace: None,
        }
    }

    fn record(&self, label: &'static str) {
        if let Some(trace) = &self.trace {
            trace.borrow_mut().push(label);
        }
    }
}

impl InterruptControl for MockIrq {
    fn enable(&self) {
        self.enabled.set(true);
        self.enables.set(self.enables.get() + 1);
        self.record("irq.enable");
    }

    fn disable(&self) {
        self.enabled.set(false);
        self.disables.set(self.disables.get() + 1);
        self.record("irq.disable");
    }

    fn clear_pending(&self) {
        self.clears.set(self.clears.get() + 1);
        self.record("irq.clear_pending");
    }
}

#[derive(Debug, Default)]
pub(crate) struct EventLog {
    pub matches: Vec<Direction>,
    pub ends: Vec<(Direction, usize)>,
}

/// `TargetEvents` recorder; clone one handle for the driver and keep the
/// other for assertions.
#[derive(Clone, Debug, Default)]
pub(crate) struct SharedEvents(pub Rc<RefCell<EventLog>>);

impl TargetEvents for SharedEvents {
    fn on_address_match(&mut self, direction: Direction) {
        self.0.borrow_mut().matches.push(direction);
    }

    fn on_transaction_end(&mut self, direction: Direction, count: usize) {
        self.0.borrow_mut().ends.push((direction, count));
    }
}
