#![no_std]

pub mod completion;
pub mod config;
pub mod dma;
pub mod error;
pub mod fatal;
pub mod frame;
pub mod led;
pub mod pipeline;
pub mod spi;

#[cfg(target_os = "none")]
pub mod board;
#[cfg(target_os = "none")]
pub mod stm32_dma;

#[cfg(test)]
mod test_utils;

pub use completion::CompletionFlag;
pub use dma::{configure_receive_dma, RxBuffer};
pub use pipeline::{ReceivePipeline, Received};
