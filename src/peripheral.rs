//! DMA support for hardware peripherals.
//!
//! A peripheral requests DMA service over a request line. Use a [`Request`]
//! to route one of those lines to a channel's source or destination.
//!
//! The peripheral that starts a transfer usually needs to hear about the
//! transfer's end. That's what [`BurstSampling`] is for: the interrupt handler
//! calls it on completion and on error.

/// A GPDMA peripheral request line
///
/// Request lines 8 through 15 are shared between a UART and a timer match
/// output. Which one drives the line depends on the request select
/// configuration; see [`Dma::select_timer_match`](crate::Dma::select_timer_match).
/// Both names are provided for those lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request(u8);

impl Request {
    pub const SSP0_TX: Request = Request(0);
    pub const SSP0_RX: Request = Request(1);
    pub const SSP1_TX: Request = Request(2);
    pub const SSP1_RX: Request = Request(3);
    pub const ADC: Request = Request(4);
    pub const I2S_CHANNEL_0: Request = Request(5);
    pub const I2S_CHANNEL_1: Request = Request(6);
    pub const DAC: Request = Request(7);
    pub const UART0_TX: Request = Request(8);
    pub const UART0_RX: Request = Request(9);
    pub const UART1_TX: Request = Request(10);
    pub const UART1_RX: Request = Request(11);
    pub const UART2_TX: Request = Request(12);
    pub const UART2_RX: Request = Request(13);
    pub const UART3_TX: Request = Request(14);
    pub const UART3_RX: Request = Request(15);
    pub const MAT0_0: Request = Request(8);
    pub const MAT0_1: Request = Request(9);
    pub const MAT1_0: Request = Request(10);
    pub const MAT1_1: Request = Request(11);
    pub const MAT2_0: Request = Request(12);
    pub const MAT2_1: Request = Request(13);
    pub const MAT3_0: Request = Request(14);
    pub const MAT3_1: Request = Request(15);

    /// The first request line that's shared with a timer match output.
    pub(crate) const FIRST_SHARED: u8 = 8;

    /// Create a request from its raw line number
    ///
    /// Returns `None` if `line` doesn't fit the four-bit request selector.
    pub const fn new(line: u8) -> Option<Self> {
        if line < 16 {
            Some(Request(line))
        } else {
            None
        }
    }

    /// Returns the raw request line number
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// A peripheral that feeds a DMA channel with burst conversions
///
/// The DMA interrupt handler calls [`stop_burst_sampling`](BurstSampling::stop_burst_sampling)
/// when a transfer completes or fails. Implementations run in interrupt context:
/// they must not block, and they must tolerate being called when sampling is
/// already stopped.
///
/// Any `Fn()` closure is a `BurstSampling`.
pub trait BurstSampling {
    /// Stop the peripheral's burst sampling
    fn stop_burst_sampling(&self);
}

impl<F: Fn()> BurstSampling for F {
    fn stop_burst_sampling(&self) {
        (self)()
    }
}
