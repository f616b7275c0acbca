//! Mocks for host-side tests.
//!
//! Only compiled for `cargo test`.

extern crate std;

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::boxed::Box;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::v2::OutputPin;

use crate::completion::{on_transfer_complete, CompletionFlag, CompletionIrq};
use crate::config::FRAME_LEN;
use crate::dma::{ChannelConfig, DescriptorConfig, InterruptConfig, InterruptMask, RxBuffer, RxDma};
use crate::error::DmaError;
use crate::fatal::Halt;
use crate::spi::{FifoStatus, RxFifo};

pub fn leak_buffer() -> RxBuffer {
    RxBuffer::new(Box::leak(Box::new([0u8; FRAME_LEN])))
}

// =============================================================================
// Interrupt acknowledge
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqEvent {
    NvicPendingCleared,
    ChannelCleared,
}

#[derive(Debug, Default)]
pub struct MockIrq {
    events: RefCell<Vec<IrqEvent>>,
}

impl MockIrq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<IrqEvent> {
        self.events.borrow().clone()
    }
}

impl CompletionIrq for MockIrq {
    fn clear_pending(&self) {
        self.events.borrow_mut().push(IrqEvent::NvicPendingCleared);
    }

    fn clear_channel_interrupt(&self) {
        self.events.borrow_mut().push(IrqEvent::ChannelCleared);
    }
}

// =============================================================================
// Receive DMA channel
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    InitDescriptor,
    InitChannel,
    SetSrc,
    SetDst,
    RegisterInterrupt,
    ClearPending,
    EnableInterrupt,
    SetInterruptMask,
    EnableChannel,
    Enable,
    Rearm,
}

/// Shared view of the steps a [`MockRxDma`] has executed, usable after the
/// mock itself has been moved or dropped.
#[derive(Debug, Clone, Default)]
pub struct StepLog(Rc<RefCell<Vec<Step>>>);

impl StepLog {
    pub fn steps(&self) -> Vec<Step> {
        self.0.borrow().clone()
    }

    fn push(&self, step: Step) {
        self.0.borrow_mut().push(step);
    }
}

/// Behaves like a one-shot DMA channel: `deliver` only lands while the
/// channel is armed, and disarms it.
#[derive(Debug)]
pub struct MockRxDma {
    log: StepLog,
    fail: Option<(Step, DmaError)>,
    src: *const u8,
    dst: *mut u8,
    count: u16,
    request: Option<u8>,
    mask: Option<InterruptMask>,
    flag: Option<&'static CompletionFlag>,
    irq: MockIrq,
    armed: bool,
    rearms: u32,
}

impl MockRxDma {
    pub fn new() -> Self {
        Self {
            log: StepLog::default(),
            fail: None,
            src: core::ptr::null(),
            dst: core::ptr::null_mut(),
            count: 0,
            request: None,
            mask: None,
            flag: None,
            irq: MockIrq::new(),
            armed: false,
            rearms: 0,
        }
    }

    pub fn failing_at(step: Step, err: DmaError) -> Self {
        Self {
            fail: Some((step, err)),
            ..Self::new()
        }
    }

    pub fn log(&self) -> StepLog {
        self.log.clone()
    }

    pub fn src(&self) -> *const u8 {
        self.src
    }

    pub fn dst(&self) -> *mut u8 {
        self.dst
    }

    pub fn request(&self) -> Option<u8> {
        self.request
    }

    pub fn mask(&self) -> Option<InterruptMask> {
        self.mask
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn rearm_count(&self) -> u32 {
        self.rearms
    }

    /// Simulate the SPI master clocking in a frame and the channel's
    /// transfer-complete interrupt firing. Returns `false` if the channel
    /// was not armed, in which case nothing is written.
    pub fn deliver(&mut self, frame: &[u8; FRAME_LEN]) -> bool {
        if !self.armed {
            return false;
        }
        let len = (self.count as usize).min(FRAME_LEN);
        for (i, b) in frame.iter().take(len).enumerate() {
            // SAFETY: dst was bound to a leaked FRAME_LEN buffer
            unsafe { self.dst.add(i).write_volatile(*b) };
        }
        self.armed = false;
        let flag = self.flag.expect("interrupt not registered");
        if self.mask.is_some_and(|m| m.contains(InterruptMask::COMPLETE)) {
            on_transfer_complete(&self.irq, flag);
        }
        true
    }

    fn step(&mut self, step: Step) -> Result<(), DmaError> {
        self.log.push(step);
        match self.fail {
            Some((s, err)) if s == step => Err(err),
            _ => Ok(()),
        }
    }
}

impl RxDma for MockRxDma {
    fn init_descriptor(&mut self, config: &DescriptorConfig) -> Result<(), DmaError> {
        self.step(Step::InitDescriptor)?;
        config.validate()?;
        self.count = config.count;
        Ok(())
    }

    fn init_channel(&mut self, config: &ChannelConfig) -> Result<(), DmaError> {
        self.step(Step::InitChannel)?;
        config.validate()?;
        self.request = Some(config.request);
        Ok(())
    }

    fn set_src_address(&mut self, src: *const u8) {
        let _ = self.step(Step::SetSrc);
        self.src = src;
    }

    fn set_dst_address(&mut self, dst: *mut u8) {
        let _ = self.step(Step::SetDst);
        self.dst = dst;
    }

    fn register_interrupt(
        &mut self,
        config: &InterruptConfig,
        flag: &'static CompletionFlag,
    ) -> Result<(), DmaError> {
        self.step(Step::RegisterInterrupt)?;
        config.level()?;
        self.flag = Some(flag);
        Ok(())
    }

    fn clear_pending(&mut self) {
        let _ = self.step(Step::ClearPending);
    }

    fn enable_interrupt(&mut self) {
        let _ = self.step(Step::EnableInterrupt);
    }

    fn set_interrupt_mask(&mut self, mask: InterruptMask) {
        let _ = self.step(Step::SetInterruptMask);
        self.mask = Some(mask);
    }

    fn enable_channel(&mut self) {
        let _ = self.step(Step::EnableChannel);
        self.armed = true;
    }

    fn enable(&mut self) {
        let _ = self.step(Step::Enable);
    }

    fn rearm(&mut self) {
        let _ = self.step(Step::Rearm);
        self.rearms += 1;
        self.armed = true;
    }
}

// =============================================================================
// SPI receive FIFO
// =============================================================================

/// RX FIFO with the OVR clear sequence: an SR read that follows a DR read
/// clears OVR. `refilling` models a master that never stops clocking.
#[derive(Debug)]
pub struct MockFifo {
    bytes: RefCell<VecDeque<u8>>,
    overrun: Cell<bool>,
    dr_read: Cell<bool>,
    refill: Option<u8>,
    pops: Cell<usize>,
    status_reads: Cell<usize>,
}

impl MockFifo {
    pub fn new(bytes: &[u8], overrun: bool) -> Self {
        Self {
            bytes: RefCell::new(bytes.iter().copied().collect()),
            overrun: Cell::new(overrun),
            dr_read: Cell::new(false),
            refill: None,
            pops: Cell::new(0),
            status_reads: Cell::new(0),
        }
    }

    pub fn refilling(byte: u8) -> Self {
        Self {
            refill: Some(byte),
            ..Self::new(&[byte], false)
        }
    }

    pub fn pending(&self) -> usize {
        self.bytes.borrow().len()
    }

    pub fn overrun(&self) -> bool {
        self.overrun.get()
    }

    pub fn pops(&self) -> usize {
        self.pops.get()
    }

    pub fn status_reads(&self) -> usize {
        self.status_reads.get()
    }
}

impl RxFifo for MockFifo {
    fn status(&self) -> FifoStatus {
        self.status_reads.set(self.status_reads.get() + 1);
        let status = FifoStatus {
            level: self.bytes.borrow().len() as u8,
            overrun: self.overrun.get(),
        };
        if self.dr_read.replace(false) {
            self.overrun.set(false);
        }
        status
    }

    fn pop(&self) -> u8 {
        self.pops.set(self.pops.get() + 1);
        self.dr_read.set(true);
        let mut bytes = self.bytes.borrow_mut();
        let byte = bytes.pop_front().unwrap_or(0);
        if let Some(b) = self.refill {
            bytes.push_back(b);
        }
        byte
    }
}

// =============================================================================
// GPIO
// =============================================================================

#[derive(Debug, Default)]
pub struct MockPin {
    level: Option<bool>,
    writes: u32,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset the level without counting it as a write.
    pub fn set_level(&mut self, high: bool) {
        self.level = Some(high);
    }

    pub fn level(&self) -> Option<bool> {
        self.level
    }

    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl OutputPin for MockPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level = Some(false);
        self.writes += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level = Some(true);
        self.writes += 1;
        Ok(())
    }
}

// =============================================================================
// Halt
// =============================================================================

/// Counts halts and unwinds instead of spinning.
#[derive(Debug, Default)]
pub struct PanicHalt {
    count: Cell<u32>,
}

impl PanicHalt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.count.get()
    }
}

impl Halt for PanicHalt {
    fn halt(&mut self) -> ! {
        self.count.set(self.count.get() + 1);
        panic!("halted");
    }
}
