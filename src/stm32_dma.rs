//! DMA1 channel 1 receive driver for the STM32G0.
//!
//! embassy-stm32 owns the `DMA1_CHANNEL1` vector: its handler clears the
//! channel's TCIF and wakes whatever waker the in-flight [`Transfer`] last
//! registered. The waker registered here is not an executor waker, its wake
//! function is [`on_transfer_complete`], so the completion handler runs
//! straight from the DMA interrupt.

use core::future::Future;
use core::pin::Pin;
use core::ptr;
use core::task::{Context, RawWaker, RawWakerVTable, Waker};

use defmt::{debug, error, info};
use embassy_stm32::dma::{Request, Transfer, TransferOptions};
use embassy_stm32::interrupt::{self, InterruptExt, Priority};
use embassy_stm32::pac;
use embassy_stm32::peripherals::DMA1_CH1;
use embassy_stm32::Peri;

use crate::board::Spi1RxFifo;
use crate::completion::{on_transfer_complete, CompletionFlag, CompletionIrq};
use crate::dma::{ChannelConfig, DescriptorConfig, InterruptConfig, InterruptMask, RxDma};
use crate::error::DmaError;
use crate::spi::drain_rx_fifo;

/* ------------------------------------------------------------------------- */
/*  Interrupt side                                                           */
/* ------------------------------------------------------------------------- */
pub struct Dma1Ch1Irq;

impl CompletionIrq for Dma1Ch1Irq {
    fn clear_pending(&self) {
        interrupt::DMA1_CHANNEL1.unpend();
    }

    fn clear_channel_interrupt(&self) {
        pac::DMA1.ifcr().write(|w| w.set_tcif(0, true));
    }
}

static COMPLETION_VTABLE: RawWakerVTable =
    RawWakerVTable::new(waker_clone, waker_wake, waker_wake, waker_drop);

unsafe fn waker_clone(data: *const ()) -> RawWaker {
    RawWaker::new(data, &COMPLETION_VTABLE)
}

unsafe fn waker_wake(data: *const ()) {
    // SAFETY: data is always a `&'static CompletionFlag`, see `completion_waker`
    let flag = &*(data as *const CompletionFlag);
    on_transfer_complete(&Dma1Ch1Irq, flag);
}

unsafe fn waker_drop(_: *const ()) {}

fn completion_waker(flag: &'static CompletionFlag) -> Waker {
    let raw = RawWaker::new(flag as *const CompletionFlag as *const (), &COMPLETION_VTABLE);
    // SAFETY: the vtable functions uphold the RawWaker contract and the data
    // pointer is 'static
    unsafe { Waker::from_raw(raw) }
}

/* ------------------------------------------------------------------------- */
/*  Channel                                                                  */
/* ------------------------------------------------------------------------- */
pub struct Stm32RxDma {
    channel: Peri<'static, DMA1_CH1>,
    request: Request,
    options: TransferOptions,
    len: usize,
    src: *mut u8,
    dst: *mut u8,
    flag: Option<&'static CompletionFlag>,
    transfer: Option<Transfer<'static>>,
}

impl Stm32RxDma {
    pub fn new(channel: Peri<'static, DMA1_CH1>) -> Self {
        let mut options = TransferOptions::default();
        options.circular = false;
        options.half_transfer_ir = false;
        options.complete_transfer_ir = false;

        Self {
            channel,
            request: 0,
            options,
            len: 0,
            src: ptr::null_mut(),
            dst: ptr::null_mut(),
            flag: None,
            transfer: None,
        }
    }

    /// Flush what the SPI collected while idle, then start the transfer.
    /// Returns `false` if no completion handler was registered.
    fn start(&mut self) -> bool {
        let Some(flag) = self.flag else {
            error!("rx dma start without a completion handler");
            return false;
        };

        let drained = drain_rx_fifo(&Spi1RxFifo);
        if drained.overrun {
            debug!("spi rx overrun cleared, {} bytes dropped", drained.discarded);
        }

        // SAFETY: only one transfer is ever alive on this channel; the
        // previous one is dropped (and stopped) before a new one starts.
        let channel = unsafe { self.channel.clone_unchecked() };
        let buf = ptr::slice_from_raw_parts_mut(self.dst, self.len);
        // SAFETY: src is the SPI1 data register, dst is the 'static frame buffer
        let mut transfer =
            unsafe { Transfer::new_read_raw(channel, self.request, self.src, buf, self.options) };

        let waker = completion_waker(flag);
        let mut cx = Context::from_waker(&waker);
        // First poll registers the waker. If the frame already landed the
        // interrupt may have fired before registration, so signal here.
        if Pin::new(&mut transfer).poll(&mut cx).is_ready() {
            flag.set();
        }
        self.transfer = Some(transfer);
        true
    }
}

impl RxDma for Stm32RxDma {
    fn init_descriptor(&mut self, config: &DescriptorConfig) -> Result<(), DmaError> {
        config.validate()?;
        self.len = config.count as usize;
        Ok(())
    }

    fn init_channel(&mut self, config: &ChannelConfig) -> Result<(), DmaError> {
        config.validate()?;
        self.request = config.request;
        Ok(())
    }

    fn set_src_address(&mut self, src: *const u8) {
        self.src = src as *mut u8;
    }

    fn set_dst_address(&mut self, dst: *mut u8) {
        self.dst = dst;
    }

    fn register_interrupt(
        &mut self,
        config: &InterruptConfig,
        flag: &'static CompletionFlag,
    ) -> Result<(), DmaError> {
        let priority = match config.level()? {
            0 => Priority::P0,
            1 => Priority::P1,
            2 => Priority::P2,
            _ => Priority::P3,
        };
        interrupt::DMA1_CHANNEL1.set_priority(priority);
        self.flag = Some(flag);
        Ok(())
    }

    fn clear_pending(&mut self) {
        interrupt::DMA1_CHANNEL1.unpend();
    }

    fn enable_interrupt(&mut self) {
        // SAFETY: the handler only touches the DMA flags and the atomic flag
        unsafe { interrupt::DMA1_CHANNEL1.enable() };
    }

    fn set_interrupt_mask(&mut self, mask: InterruptMask) {
        self.options.complete_transfer_ir = mask.contains(InterruptMask::COMPLETE);
        self.options.half_transfer_ir = mask.contains(InterruptMask::HALF);
    }

    fn enable_channel(&mut self) {
        if self.start() {
            info!("rx dma armed: {} bytes, request {}", self.len, self.request);
        }
    }

    fn enable(&mut self) {
        // No global enable on the BDMA, only the AHB clock gate, and
        // embassy_stm32::init already opened it for the DMA driver.
        defmt::debug_assert!(pac::RCC.ahbenr().read().dma1en());
    }

    fn rearm(&mut self) {
        // Dropping the finished transfer disables the channel
        drop(self.transfer.take());
        if self.start() {
            debug!("rx dma re-armed");
        }
    }
}
