//! DMA interrupt support

use crate::{peripheral::BurstSampling, ral, Dma};
use core::sync::atomic::{AtomicU32, Ordering};

/// Interrupt event counters
///
/// Written only by the interrupt handler. Readers may observe a stale value,
/// but never a torn one.
pub(crate) struct Counters {
    completions: AtomicU32,
    errors: AtomicU32,
}

impl Counters {
    pub(crate) const fn new() -> Self {
        Counters {
            completions: AtomicU32::new(0),
            errors: AtomicU32::new(0),
        }
    }
}

impl<const CHANNELS: usize> Dma<CHANNELS> {
    /// Handle the DMA interrupt
    ///
    /// Checks the controller's terminal count status, then its error status.
    /// For each status that has any bit set, `on_interrupt`
    ///
    /// 1. increments that status' counter once, no matter how many bits are set.
    /// 2. clears exactly the bits that it read.
    /// 3. stops `peripheral`'s burst sampling.
    ///
    /// If both statuses are set, `peripheral` is stopped twice. `on_interrupt` never
    /// blocks, and it never touches a channel's configuration.
    ///
    /// Consider calling `on_interrupt` in the DMA interrupt handler:
    ///
    /// ```no_run
    /// use lpc17xx_dma::Dma;
    ///
    /// static GPDMA: Dma<8> = unsafe { Dma::new(lpc17xx_dma::GPDMA, lpc17xx_dma::SYSCON) };
    ///
    /// fn adc_burst_off() {
    ///     // Clear the ADC's BURST bit...
    /// }
    ///
    /// // #[cortex_m_rt::interrupt]
    /// fn DMA() {
    ///     GPDMA.on_interrupt(&adc_burst_off);
    /// }
    /// ```
    #[inline(always)]
    pub fn on_interrupt<P: BurstSampling + ?Sized>(&self, peripheral: &P) {
        let complete = ral::read_reg!(ral::gpdma, self.controller, INTTCSTAT);
        if complete != 0 {
            self.counters.completions.fetch_add(1, Ordering::Relaxed);
            // Only clear what we saw. Another channel's bit may have been set
            // since the read.
            ral::write_reg!(ral::gpdma, self.controller, INTTCCLEAR, complete);
            peripheral.stop_burst_sampling();
        }

        let error = ral::read_reg!(ral::gpdma, self.controller, INTERRSTAT);
        if error != 0 {
            self.counters.errors.fetch_add(1, Ordering::Relaxed);
            ral::write_reg!(ral::gpdma, self.controller, INTERRCLR, error);
            peripheral.stop_burst_sampling();
        }
    }

    /// Returns the number of interrupts that serviced a completed transfer
    pub fn completed_transfers(&self) -> u32 {
        self.counters.completions.load(Ordering::Relaxed)
    }

    /// Returns the number of interrupts that serviced a transfer error
    pub fn transfer_errors(&self) -> u32 {
        self.counters.errors.load(Ordering::Relaxed)
    }
}

/// An interrupt that can be unmasked
///
/// The [`Driver`](crate::Driver) unmasks the DMA interrupt once its channel
/// is enabled.
pub trait InterruptLine {
    /// Permit the interrupt to reach its handler
    fn unmask(&mut self);
}

/// A Cortex-M NVIC interrupt line
///
/// Wrap your device's DMA interrupt number. For LPC17xx, that's `DMA`, number 26.
#[derive(Debug, Clone, Copy)]
pub struct Nvic<I>(pub I);

impl<I: cortex_m::interrupt::InterruptNumber> InterruptLine for Nvic<I> {
    fn unmask(&mut self) {
        // Safety: the caller has configured everything that the DMA handler
        // touches before asking to unmask it.
        unsafe { cortex_m::peripheral::NVIC::unmask(self.0) };
    }
}
