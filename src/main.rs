#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use static_cell::StaticCell;
use {defmt_rtt as _, embassy_time as _, panic_probe as _};

use spi_slave_dma::{
    board::{self, Board},
    completion::CompletionFlag,
    config::{FRAME_LEN, RX_DMA},
    dma::{configure_receive_dma, RxBuffer},
    fatal::{unwrap_or_halt, CpuHalt},
    led::update_led,
    stm32_dma::Stm32RxDma,
};

static RX_BUFFER: StaticCell<[u8; FRAME_LEN]> = StaticCell::new();
static RX_DMA_DONE: CompletionFlag = CompletionFlag::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    // IWDG is off out of reset on this part (no hardware-watchdog option byte set)
    let board = Board::init();

    // SAFETY: nothing that shares state with an interrupt is live yet
    unsafe { cortex_m::interrupt::enable() };

    let _spi1 = board::slave_init(board.spi1);

    info!("================================================");
    info!("================= DMA SPI SLAVE ================");
    info!("================================================");

    let buffer = RxBuffer::new(RX_BUFFER.init([0; FRAME_LEN]));
    let pipeline = unwrap_or_halt(
        configure_receive_dma(
            Stm32RxDma::new(board.rx_dma),
            &RX_DMA,
            board::spi_rx_register(),
            buffer,
            &RX_DMA_DONE,
        ),
        &mut CpuHalt,
    );

    let mut led = Output::new(board.led, Level::Low, Speed::Low);

    pipeline.run(|cmd| match update_led(&mut led, cmd) {
        Ok(Some(state)) => info!(
            "Data received from the SPI master and LED status is {}",
            state.as_str()
        ),
        Ok(None) => info!("Data received from the SPI master, unknown command {:02X}", cmd),
        Err(_) => {}
    })
}
