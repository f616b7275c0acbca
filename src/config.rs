// Centralize all configuration constants
use crate::dma::{
    ChannelConfig, DescriptorConfig, InterruptConfig, InterruptMask, RxDmaConfig, Width,
};

// Frame layout: [SOP, CMD, EOP]
pub const FRAME_LEN: usize = 3;
pub const PACKET_SOP_POS: usize = 0;
pub const PACKET_CMD_POS: usize = 1;
pub const PACKET_EOP_POS: usize = FRAME_LEN - 1;
pub const PACKET_SOP: u8 = 0xAA;
pub const PACKET_EOP: u8 = 0x55;

// LED commands
pub const LED_CMD_ON: u8 = 0x01;
pub const LED_CMD_OFF: u8 = 0x00;

// DMAMUX request line for SPI1_RX (RM0444, table 59)
pub const SPI1_RX_DMA_REQUEST: u8 = 16;
// 0 = highest, 3 = lowest (2 NVIC priority bits on the M0+)
pub const RX_DMA_IRQ_PRIORITY: u8 = 1;

pub const RX_DMA: RxDmaConfig = RxDmaConfig {
    descriptor: DescriptorConfig {
        width: Width::Byte,
        count: FRAME_LEN as u16,
    },
    channel: ChannelConfig {
        request: SPI1_RX_DMA_REQUEST,
    },
    interrupt: InterruptConfig {
        priority: RX_DMA_IRQ_PRIORITY,
        mask: InterruptMask::COMPLETE,
    },
};
