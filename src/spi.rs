//! SPI1 receive FIFO housekeeping between one-shot transfers.
//!
//! While the DMA channel is idle the master can keep clocking bytes in. They
//! pile up in the 4-byte RX FIFO and, once it is full, the peripheral raises
//! OVR and stops issuing DMA requests. Before every re-arm the FIFO is emptied
//! and OVR cleared (DR read followed by an SR read) so the next transfer
//! starts from a clean peripheral.

/// RX FIFO depth in 8-bit frames.
pub const RX_FIFO_DEPTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoStatus {
    /// FRLVL, 0 when empty
    pub level: u8,
    pub overrun: bool,
}

/// Register surface of the SPI receive side.
pub trait RxFifo {
    /// Read SR. After a DR read this also clears OVR.
    fn status(&self) -> FifoStatus;
    /// Read one byte from DR.
    fn pop(&self) -> u8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct Drained {
    pub discarded: usize,
    pub overrun: bool,
}

/// Discard whatever arrived while no transfer was armed.
///
/// Every DR read is followed by an SR read, so a pending OVR is cleared even
/// when FRLVL already reads empty. Bounded by the FIFO depth in case the
/// master keeps clocking.
pub fn drain_rx_fifo<F: RxFifo>(fifo: &F) -> Drained {
    let mut drained = Drained::default();
    let mut status = fifo.status();
    drained.overrun = status.overrun;

    while (status.level != 0 || status.overrun) && drained.discarded < RX_FIFO_DEPTH {
        fifo.pop();
        drained.discarded += 1;
        status = fifo.status();
    }
    drained
}
