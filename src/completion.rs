//! Transfer-complete handoff between the DMA interrupt and the main loop.
//!
//! The flag is the only state shared across the interrupt boundary. The
//! interrupt side sets it, the main loop clears it once the receive buffer
//! has been consumed.

use portable_atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct CompletionFlag {
    done: AtomicBool,
}

#[allow(clippy::new_without_default)]
impl CompletionFlag {
    pub const fn new() -> Self {
        Self {
            done: AtomicBool::new(false),
        }
    }

    /// Interrupt side. Release pairs with the Acquire in [`is_set`](Self::is_set)
    /// so the DMA'd bytes are visible to whoever observes the flag.
    #[inline]
    pub fn set(&self) {
        self.done.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    #[inline]
    pub fn clear(&self) {
        self.done.store(false, Ordering::Release);
    }
}

/// Interrupt-controller and channel-level acknowledge for the receive channel.
pub trait CompletionIrq {
    /// Clear the pending bit at the NVIC.
    fn clear_pending(&self);
    /// Clear the transfer-complete status on the DMA channel.
    fn clear_channel_interrupt(&self);
}

/// Transfer-complete handler. Runs in interrupt context: no buffer access,
/// nothing that can block.
#[inline]
pub fn on_transfer_complete<I: CompletionIrq>(irq: &I, flag: &CompletionFlag) {
    irq.clear_pending();
    irq.clear_channel_interrupt();
    flag.set();
}
