//! Fatal error path. Bring-up failures end here and never return.

pub trait Halt {
    fn halt(&mut self) -> !;
}

/// The fatal error handler: masks every interrupt and parks the core.
/// Bring-up reaches it through [`unwrap_or_halt`].
#[cfg(target_os = "none")]
pub struct CpuHalt;

#[cfg(target_os = "none")]
impl Halt for CpuHalt {
    fn halt(&mut self) -> ! {
        cortex_m::interrupt::disable();
        loop {
            cortex_m::asm::nop();
        }
    }
}

/// Unwrap a bring-up result, halting on error.
#[inline]
pub fn unwrap_or_halt<T, E, H: Halt>(result: Result<T, E>, halt: &mut H) -> T {
    match result {
        Ok(v) => v,
        Err(_) => halt.halt(),
    }
}
