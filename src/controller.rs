//! GPDMA controller management
//!
//! Channel allocation, controller enable / disable, and the system control
//! settings that the GPDMA depends on.

use crate::{
    peripheral::Request,
    ral::{self, gpdma},
    Channel, Dma, Error, Result,
};

/// AHB master endianness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum Endian {
    #[default]
    Little = 0,
    Big = 1,
}

/// Returns the lowest numbered channel whose bit is clear in `enabled`.
///
/// Only the first `channels` bits are considered.
pub(crate) fn lowest_free(enabled: u32, channels: usize) -> Option<usize> {
    (0..channels).find(|channel| enabled & (1 << channel) == 0)
}

/// Call `enable` until its status has the enable bit set.
///
/// `attempts` is clamped to at least one.
fn wait_enabled(attempts: Option<u32>, mut enable: impl FnMut() -> u32) -> Result<()> {
    let attempts = attempts.map(|attempts| attempts.max(1));
    let mut tries: u32 = 0;
    loop {
        tries = tries.saturating_add(1);
        if enable() & gpdma::CONFIG::E::mask != 0 {
            return Ok(());
        }
        if attempts.is_some_and(|attempts| tries >= attempts) {
            return Err(Error::ControllerBusy { attempts: tries });
        }
        core::hint::spin_loop();
    }
}

impl<const CHANNELS: usize> Dma<CHANNELS> {
    /// Returns the bitmask of enabled channels
    ///
    /// Bit `n` is set when channel `n` is enabled. Only the first `CHANNELS`
    /// bits are reported.
    pub fn enabled_channels(&self) -> u32 {
        let pool = (1u32 << CHANNELS) - 1;
        let enabled = ral::read_reg!(ral::gpdma, self.controller, ENBLDCHNS, ENABLEDCHANNELS);
        enabled & pool
    }

    /// Find and claim the lowest numbered channel that isn't enabled
    ///
    /// Returns [`Error::NoFreeChannel`] if every channel in the pool is enabled.
    ///
    /// A channel isn't marked as taken until it's enabled. Calling `find_channel`
    /// twice, without enabling the first channel, returns the same channel.
    ///
    /// # Safety
    ///
    /// The returned channel may alias a channel that you already hold. You must make
    /// sure that you're not holding a disabled channel with the same index.
    pub unsafe fn find_channel(&self) -> Result<Channel> {
        lowest_free(self.enabled_channels(), CHANNELS)
            .map(|index| Channel::new(self.controller, index))
            .ok_or(Error::NoFreeChannel)
    }

    /// Turn on the GPDMA clock
    ///
    /// The controller ignores register writes while its clock is off.
    pub fn enable_clock(&self) {
        ral::modify_reg!(ral::syscon, self.syscon, PCONP, PCGPDMA: 1);
    }

    /// Enable the synchronization logic for the request lines in `mask`
    ///
    /// Synchronization is required when a peripheral's clock differs from the
    /// DMA controller's clock. Bits already set stay set.
    pub fn enable_sync(&self, mask: u32) {
        let mask = mask & gpdma::SYNC::DMACSYNC::mask;
        ral::modify_reg!(ral::gpdma, self.controller, SYNC, |sync: u32| sync | mask);
    }

    /// Enable the controller with the given AHB master endianness
    ///
    /// Returns the controller's enable and endianness bits, as read back after the
    /// write. The controller is enabled once bit 0 reads back as set; see
    /// [`enable_controller_blocking`](Dma::enable_controller_blocking) to wait for that.
    pub fn enable_controller(&self, endian: Endian) -> u32 {
        ral::modify_reg!(ral::gpdma, self.controller, CONFIG, E: 1, M: endian as u32);
        self.controller_status()
    }

    /// Enable the controller, and wait for it to report that it's enabled
    ///
    /// `attempts` bounds the number of enable attempts. Returns
    /// [`Error::ControllerBusy`] if the controller still isn't enabled after that
    /// many attempts. There's always at least one attempt, so `Some(0)` behaves
    /// like `Some(1)`. `None` waits forever.
    pub fn enable_controller_blocking(&self, endian: Endian, attempts: Option<u32>) -> Result<()> {
        wait_enabled(attempts, || self.enable_controller(endian))
    }

    /// Disable the controller
    ///
    /// Any enabled channels are disabled first. Returns the controller's enable and
    /// endianness bits, as read back after the write.
    pub fn disable_controller(&self) -> u32 {
        if self.enabled_channels() != 0 {
            self.disable_channels();
        }
        ral::modify_reg!(ral::gpdma, self.controller, CONFIG, E: 0);
        self.controller_status()
    }

    /// Returns `true` if the controller is enabled
    pub fn is_enabled(&self) -> bool {
        ral::read_reg!(ral::gpdma, self.controller, CONFIG, E == 1)
    }

    fn controller_status(&self) -> u32 {
        let (e, m) = ral::read_reg!(ral::gpdma, self.controller, CONFIG, E, M);
        e | (m << 1)
    }

    /// Disable every channel in the pool
    pub fn disable_channels(&self) {
        for ch in &self.controller.CH[..CHANNELS] {
            ral::modify_reg!(ral::channel, ch, CONFIG, E: 0);
        }
    }

    /// Clear the error flag of every channel in the pool
    pub fn clear_errors(&self) {
        let pool = (1u32 << CHANNELS) - 1;
        self.controller.INTERRCLR.write(pool);
    }

    /// Select the input that drives a shared request line
    ///
    /// Request lines 8 through 15 are shared between a UART and a timer match
    /// output. `timer_match == true` routes the timer match output to the
    /// line; `false` routes the UART.
    ///
    /// Returns `false`, and does nothing, if `request` isn't a shared line.
    pub fn select_timer_match(&self, request: Request, timer_match: bool) -> bool {
        let Some(bit) = request.raw().checked_sub(Request::FIRST_SHARED) else {
            return false;
        };
        let bit = 1u32 << bit;
        ral::modify_reg!(ral::syscon, self.syscon, DMAREQSEL, |sel: u32| if timer_match {
            sel | bit
        } else {
            sel & !bit
        });
        true
    }

    /// Route every shared request line back to its UART
    pub fn reset_request_selects(&self) {
        ral::write_reg!(ral::syscon, self.syscon, DMAREQSEL, 0);
    }
}
