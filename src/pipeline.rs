use crate::completion::CompletionFlag;
use crate::dma::{RxBuffer, RxDma};
use crate::frame::{self, FrameError};

/// Outcome of a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Received {
    /// No transfer completed since the last poll.
    Idle,
    /// Frame was valid; the command was handed to the callback.
    Accepted(u8),
    /// Marker mismatch, frame dropped.
    Discarded(FrameError),
}

pub struct ReceivePipeline<D: RxDma> {
    dma: D,
    buffer: RxBuffer,
    flag: &'static CompletionFlag,
}

impl<D: RxDma> ReceivePipeline<D> {
    pub(crate) fn new(dma: D, buffer: RxBuffer, flag: &'static CompletionFlag) -> Self {
        Self { dma, buffer, flag }
    }

    pub fn dma_mut(&mut self) -> &mut D {
        &mut self.dma
    }

    /// Check the completion flag once. On a completed transfer the frame is
    /// validated, `on_command` runs for a valid one, the flag is cleared and
    /// the channel is re-armed for the next frame.
    pub fn poll<F: FnOnce(u8)>(&mut self, on_command: F) -> Received {
        if !self.flag.is_set() {
            return Received::Idle;
        }

        let received = match frame::decode(&self.buffer.snapshot()) {
            Ok(cmd) => {
                on_command(cmd);
                Received::Accepted(cmd)
            }
            Err(e) => Received::Discarded(e),
        };

        self.flag.clear();
        // Channel stays idle until here, so the buffer can't be overwritten
        // while it is being read.
        self.dma.rearm();
        received
    }

    /// Busy-poll forever. Invalid frames are dropped silently.
    pub fn run<F: FnMut(u8)>(mut self, mut on_command: F) -> ! {
        loop {
            let _ = self.poll(&mut on_command);
        }
    }
}
