use defmt::info;
use embassy_stm32::mode::Async;
use embassy_stm32::peripherals::{DMA1_CH1, DMA1_CH4, DMA1_CH5, PA15, PA5, PB3, PB4, PB5, SPI1};
use embassy_stm32::spi::SpiSlave;
use embassy_stm32::{pac, rcc, spi, Config, Peri};

use crate::spi::{FifoStatus, RxFifo};

// ── SPI1 slave pins and its (idle) HAL DMA pair ───────────
pub struct SpiParts {
    pub spi: Peri<'static, SPI1>,
    pub sck: Peri<'static, PB3>,
    pub mosi: Peri<'static, PB5>,
    pub miso: Peri<'static, PB4>,
    pub nss: Peri<'static, PA15>,
    pub tx_dma: Peri<'static, DMA1_CH5>,
    pub rx_dma: Peri<'static, DMA1_CH4>,
}

// ── Board struct ──────────────────────────────────────────
pub struct Board {
    pub spi1: SpiParts,
    pub rx_dma: Peri<'static, DMA1_CH1>, // SPI1_RX -> frame buffer
    pub led: Peri<'static, PA5>,         // LD4, active high
}

impl Board {
    pub fn init() -> Self {
        let mut config = Config::default();

        // HSI16 -> PLL -> 64MHz SYSCLK
        config.rcc.hsi = Some(rcc::Hsi {
            sys_div: rcc::HsiSysDiv::DIV1,
        });
        config.rcc.pll = Some(rcc::Pll {
            source: rcc::PllSource::HSI,    // Use HSI as PLL source
            prediv: rcc::PllPreDiv::DIV2,   // 16MHz / 2 = 8MHz
            mul: rcc::PllMul::MUL16,        // 8MHz * 16 = 128MHz
            divp: None,
            divq: None,
            divr: Some(rcc::PllRDiv::DIV2), // 128MHz / 2 = 64MHz
        });
        config.rcc.sys = rcc::Sysclk::PLL1_R;

        let p = embassy_stm32::init(config);
        info!("board peripherals up, SYSCLK 64MHz");

        Self {
            spi1: SpiParts {
                spi: p.SPI1,
                sck: p.PB3,
                mosi: p.PB5,
                miso: p.PB4,
                nss: p.PA15,
                tx_dma: p.DMA1_CH5,
                rx_dma: p.DMA1_CH4,
            },
            rx_dma: p.DMA1_CH1,
            led: p.PA5,
        }
    }
}

/// Bring SPI1 up as a mode-0, hardware-NSS slave and route RXNE to the DMA.
///
/// The HAL driver only owns pin/clock setup here; received bytes are moved
/// by the DMA1 channel 1 receive path, not by the driver's own channels.
pub fn slave_init(parts: SpiParts) -> SpiSlave<'static, Async> {
    let mut spi_cfg = spi::ConfigSlave::default();
    spi_cfg.mode = spi::MODE_0;

    let spi1 = SpiSlave::new_hardware_cs(
        parts.spi,
        parts.sck, parts.mosi, parts.miso, parts.nss, // SCK, MOSI, MISO, NSS
        parts.tx_dma,        // TX
        parts.rx_dma,        // RX
        spi_cfg,
    );

    // The HAL leaves SPE set; RXDMAEN has to be in place before the
    // peripheral is enabled (RM0444 SPI DMA procedure), so cycle SPE around it.
    pac::SPI1.cr1().modify(|w| w.set_spe(false));
    pac::SPI1.cr2().modify(|w| w.set_rxdmaen(true));
    pac::SPI1.cr1().modify(|w| w.set_spe(true));
    info!("SPI1 slave ready, mode 0, hardware NSS");
    spi1
}

/// SPI1 data register, the receive DMA source.
pub fn spi_rx_register() -> *const u8 {
    pac::SPI1.dr().as_ptr() as *const u8
}

/// SPI1 receive FIFO, drained between transfers.
pub struct Spi1RxFifo;

impl RxFifo for Spi1RxFifo {
    fn status(&self) -> FifoStatus {
        let sr = pac::SPI1.sr().read();
        FifoStatus {
            level: sr.frlvl().to_bits(),
            overrun: sr.ovr(),
        }
    }

    fn pop(&self) -> u8 {
        // SAFETY: byte-wide read of the SPI1 data register; pops one frame
        unsafe { core::ptr::read_volatile(spi_rx_register()) }
    }
}
