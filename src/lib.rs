//! General purpose DMA (GPDMA) driver for NXP LPC17xx processors
//!
//! `lpc17xx-dma` provides
//!
//! - a [`Dma`] controller object that allocates [`Channel`]s, turns the
//!   controller on and off, and services the DMA interrupt.
//! - a low-level [`Channel`] API for programming transfers.
//! - a [`Driver`] that claims a single channel and sets it up for
//!   peripheral-to-memory sampling, like ADC burst capture.
//!
//! This DMA driver may be re-exported from a hardware abstraction layer
//! (HAL). If it is, you should use the safer APIs provided by your HAL.
//!
//! # Getting started
//!
//! To allocate a [`Dma`] driver, you'll need to know
//!
//! 1. the location of the GPDMA registers.
//! 2. the location of the system control registers, which gate the GPDMA
//!    clock and select DMA request inputs.
//! 3. the number of DMA channels supported by your chip.
//!
//! The [`GPDMA`] and [`SYSCON`] constants are the addresses for LPC176x and
//! LPC175x parts. Those parts have [`CHANNELS`] channels.
//!
//! With those three parameters, assign a `Dma` to a static. Then, use that
//! object to create a [`Driver`], or to find [`Channel`]s yourself.
//!
//! ```no_run
//! use lpc17xx_dma::{Config, Dma, Driver};
//!
//! // Safety: addresses and channel count are valid for this target.
//! static DMA: Dma<{ lpc17xx_dma::CHANNELS }> =
//!     unsafe { Dma::new(lpc17xx_dma::GPDMA, lpc17xx_dma::SYSCON) };
//!
//! let mut driver = Driver::new(&DMA);
//! if driver.init(&Config::default()).is_ok() {
//!     driver.set_destination_address(0x2007_C000 as *const u32);
//! }
//! ```
//!
//! Route the DMA interrupt to [`Dma::on_interrupt`], and give it the
//! peripheral that should stop sampling when a transfer ends:
//!
//! ```no_run
//! # use lpc17xx_dma::Dma;
//! # static GPDMA: Dma<8> = unsafe { Dma::new(lpc17xx_dma::GPDMA, lpc17xx_dma::SYSCON) };
//! # fn adc_burst_off() {}
//! // #[cortex_m_rt::interrupt]
//! fn DMA() {
//!     GPDMA.on_interrupt(&adc_burst_off);
//! }
//! ```
//!
//! ### License
//!
//! Licensed under either of
//!
//! - [Apache License, Version 2.0](http://www.apache.org/licenses/LICENSE-2.0)
//! - [MIT License](http://opensource.org/licenses/MIT)
//!
//! at your option.
//!
//! Unless you explicitly state otherwise, any contribution intentionally submitted
//! for inclusion in the work by you, as defined in the Apache-2.0 license, shall be
//! dual licensed as above, without any additional terms or conditions.

#![no_std]

pub mod channel;
mod controller;
mod driver;
mod error;
mod interrupt;
pub mod peripheral;
mod ral;

pub use channel::{BurstSize, Channel, Control, TransferType, Width};
pub use controller::Endian;
pub use driver::{Config, Driver};
pub use error::Error;
pub use interrupt::{InterruptLine, Nvic};
pub use peripheral::{BurstSampling, Request};

/// A DMA result
pub type Result<T> = core::result::Result<T, Error>;

/// GPDMA register block address on LPC176x / LPC175x
pub const GPDMA: *const () = 0x5000_4000 as *const ();
/// System control register block address on LPC176x / LPC175x
pub const SYSCON: *const () = 0x400F_C000 as *const ();
/// Number of GPDMA channels on LPC176x / LPC175x
pub const CHANNELS: usize = ral::gpdma::MAX_CHANNELS;

/// A DMA driver.
///
/// This DMA driver manages the GPDMA controller and its channel pool.
/// It's configured with pointers to the GPDMA registers and to the
/// system control registers.
///
/// `Dma` allocates [`Channel`]s. `Channel` provides the interface for
/// programming transfers. `Dma` also owns the interrupt counters that
/// [`on_interrupt`](Dma::on_interrupt) maintains.
pub struct Dma<const CHANNELS: usize> {
    controller: ral::Static<ral::gpdma::RegisterBlock>,
    syscon: ral::Static<ral::syscon::RegisterBlock>,
    counters: interrupt::Counters,
}

// Safety: OK to allocate a DMA driver in a static context. The counters
// are atomic, and register access is volatile.
unsafe impl<const CHANNELS: usize> Sync for Dma<CHANNELS> {}

impl<const CHANNELS: usize> Dma<CHANNELS> {
    const VALID_CHANNELS: () = assert!(
        CHANNELS >= 1 && CHANNELS <= ral::gpdma::MAX_CHANNELS,
        "a GPDMA has between 1 and 8 channels"
    );

    /// Create the DMA driver.
    ///
    /// Note that this can evaluate at compile time. Consider using this to
    /// expose a `Dma` through your higher-level API that you can use to
    /// allocate DMA channels.
    ///
    /// `CHANNELS` specifies the total number of channels supported by the DMA
    /// controller. It's referenced when allocating channels.
    ///
    /// # Safety
    ///
    /// Caller must make sure that `controller` is a pointer to the start of the
    /// GPDMA register block. Caller must also make sure that `syscon` is a pointer
    /// to the start of the system control registers. Both pointers must be valid
    /// for your MCU.
    ///
    /// An incorrect `CHANNELS` value prevents proper bounds checking when
    /// allocating channels.
    pub const unsafe fn new(controller: *const (), syscon: *const ()) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_CHANNELS;
        Self {
            controller: ral::Static(controller.cast()),
            syscon: ral::Static(syscon.cast()),
            counters: interrupt::Counters::new(),
        }
    }

    /// Creates the DMA channel described by `index`.
    ///
    /// # Safety
    ///
    /// This will create a handle that may alias global, mutable state. You should only create
    /// one channel per index. If there are multiple channels for the same index, you're
    /// responsible for ensuring synchronized access.
    ///
    /// # Panics
    ///
    /// Panics if `index` is greater than or equal to the maximum number of channels.
    pub unsafe fn channel(&self, index: usize) -> Channel {
        assert!(
            index < CHANNELS,
            "DMA channel index {} exceeds CHANNELS",
            index
        );
        Channel::new(self.controller, index)
    }
}
