//! Receive DMA: static descriptor/channel configuration and bring-up.
//!
//! One descriptor moves [`FRAME_LEN`] bytes from the SPI data register into
//! the receive buffer. The channel is one-shot: after a transfer completes it
//! stays idle until the main loop has consumed the buffer and calls
//! [`RxDma::rearm`].

use core::ptr::{self, NonNull};

use crate::completion::CompletionFlag;
use crate::config::FRAME_LEN;
use crate::error::{DmaError, InitError};
use crate::pipeline::ReceivePipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Width {
    Byte,
    HalfWord,
    Word,
}

// DMAMUX1 on the G071 routes request inputs 1..=73; 0 is "no request"
pub const DMAMUX_MAX_REQUEST: u8 = 73;
// Two implemented NVIC priority bits on the M0+
pub const NVIC_PRIORITY_LEVELS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorConfig {
    pub width: Width,
    pub count: u16,
}

impl DescriptorConfig {
    /// Only byte-wide, non-empty transfers fit the 8-bit SPI data register.
    pub fn validate(&self) -> Result<(), DmaError> {
        if self.width != Width::Byte {
            return Err(DmaError::UnsupportedWidth);
        }
        if self.count == 0 {
            return Err(DmaError::ZeroCount);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// DMAMUX request line
    pub request: u8,
}

impl ChannelConfig {
    pub fn validate(&self) -> Result<(), DmaError> {
        match self.request {
            1..=DMAMUX_MAX_REQUEST => Ok(()),
            r => Err(DmaError::InvalidRequest(r)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptMask(u8);

impl InterruptMask {
    pub const COMPLETE: Self = Self(1 << 0);
    pub const HALF: Self = Self(1 << 1);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptConfig {
    pub priority: u8,
    pub mask: InterruptMask,
}

impl InterruptConfig {
    /// NVIC priority level, 0 (highest) to 3.
    pub fn level(&self) -> Result<u8, DmaError> {
        if self.priority < NVIC_PRIORITY_LEVELS {
            Ok(self.priority)
        } else {
            Err(DmaError::InvalidPriority(self.priority))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxDmaConfig {
    pub descriptor: DescriptorConfig,
    pub channel: ChannelConfig,
    pub interrupt: InterruptConfig,
}

/// Hardware surface of the receive channel, one method per bring-up step.
pub trait RxDma {
    fn init_descriptor(&mut self, config: &DescriptorConfig) -> Result<(), DmaError>;
    fn init_channel(&mut self, config: &ChannelConfig) -> Result<(), DmaError>;
    fn set_src_address(&mut self, src: *const u8);
    fn set_dst_address(&mut self, dst: *mut u8);
    /// Bind the transfer-complete handler to `flag` at the configured priority.
    fn register_interrupt(
        &mut self,
        config: &InterruptConfig,
        flag: &'static CompletionFlag,
    ) -> Result<(), DmaError>;
    fn clear_pending(&mut self);
    fn enable_interrupt(&mut self);
    fn set_interrupt_mask(&mut self, mask: InterruptMask);
    fn enable_channel(&mut self);
    fn enable(&mut self);
    /// Start the next one-shot transfer into the same buffer.
    fn rearm(&mut self);
}

/// Receive buffer. Written only by the DMA engine, read only by the main loop
/// while the channel is idle.
pub struct RxBuffer {
    buf: NonNull<[u8; FRAME_LEN]>,
}

impl RxBuffer {
    pub fn new(buf: &'static mut [u8; FRAME_LEN]) -> Self {
        Self {
            buf: NonNull::from(buf),
        }
    }

    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.buf.as_ptr().cast()
    }

    /// Copy the frame out. Only meaningful once the completion flag is set.
    pub fn snapshot(&self) -> [u8; FRAME_LEN] {
        // SAFETY: the pointer comes from a `'static mut` borrow owned by this
        // buffer; the DMA engine is the only other writer and is idle here.
        unsafe { ptr::read_volatile(self.buf.as_ptr()) }
    }
}

/// Bring up the receive path and hand back the pipeline that consumes it.
///
/// A failing step returns immediately; whatever was already applied stays
/// applied. Callers treat any error as fatal.
pub fn configure_receive_dma<D: RxDma>(
    mut dma: D,
    config: &RxDmaConfig,
    src: *const u8,
    buffer: RxBuffer,
    flag: &'static CompletionFlag,
) -> Result<ReceivePipeline<D>, InitError> {
    dma.init_descriptor(&config.descriptor)
        .map_err(InitError::Descriptor)?;
    dma.init_channel(&config.channel)
        .map_err(InitError::Channel)?;

    dma.set_src_address(src);
    dma.set_dst_address(buffer.as_mut_ptr());

    dma.register_interrupt(&config.interrupt, flag)
        .map_err(InitError::Interrupt)?;
    dma.clear_pending();
    dma.enable_interrupt();

    dma.set_interrupt_mask(config.interrupt.mask);
    dma.enable_channel();
    dma.enable();

    Ok(ReceivePipeline::new(dma, buffer, flag))
}
