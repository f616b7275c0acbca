/* ------------------------------------------------------------------------- */
/*  DMA step errors                                                          */
/* ------------------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum DmaError {
    /// Descriptor transfer count is zero.
    ZeroCount,
    /// Only byte transfers are wired up for the SPI data register.
    UnsupportedWidth,
    /// Request line is not routable through the DMAMUX.
    InvalidRequest(u8),
    /// NVIC priority outside the implemented priority bits.
    InvalidPriority(u8),
}

/* ------------------------------------------------------------------------- */
/*  Receive path bring-up errors                                             */
/* ------------------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum InitError {
    Descriptor(DmaError),
    Channel(DmaError),
    Interrupt(DmaError),
}
