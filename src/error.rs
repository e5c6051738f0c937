//! DMA driver errors

use core::fmt::{self, Display};

/// Errors reported synchronously by the DMA driver
///
/// Transfer errors signaled by the hardware are not represented here.
/// Those are counted by the interrupt handler; see
/// [`transfer_errors`](crate::Dma::transfer_errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Every channel in the pool is already enabled.
    NoFreeChannel,
    /// The driver has not claimed and configured a channel.
    NotInitialized,
    /// The controller enable bit never read back as set.
    ControllerBusy {
        /// How many times we tried to enable the controller.
        attempts: u32,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoFreeChannel => write!(f, "no open DMA channels found"),
            Error::NotInitialized => write!(f, "DMA driver is not initialized"),
            Error::ControllerBusy { attempts } => write!(
                f,
                "DMA controller did not enable after {attempts} attempts"
            ),
        }
    }
}
