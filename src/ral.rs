//! A RAL-like module to support GPDMA register access
//!
//! The GPDMA is small enough that we describe it by hand. The channel
//! registers are represented as an array of register blocks that hangs
//! off the controller block, so that a channel is just an index.
//!
//! Field modules follow the RAL convention (`offset`, `mask`, and the
//! `R` / `W` / `RW` value modules) so that the `ral-registers` macros
//! work on them.

#![allow(
    non_snake_case, // Compatibility with RAL
    non_upper_case_globals, // Compatibility with RAL
    unused, // Not every field is driven
)]

pub use ral_registers::{modify_reg, read_reg, write_reg};
use ral_registers::{RORegister, RWRegister, WORegister};

/// Define RAL field modules.
///
/// Each entry is `NAME @ offset : width`.
macro_rules! fields {
    ($($field:ident @ $offset:literal : $width:literal),* $(,)?) => {
        $(
            pub mod $field {
                pub const offset: u32 = $offset;
                pub const mask: u32 = ((1u32 << $width) - 1) << offset;
                pub mod R {}
                pub mod W {}
                pub mod RW {}
            }
        )*
    };
}

pub mod channel;
pub mod gpdma;
pub mod syscon;

//
// Helper types for static memory
//
// Similar to the RAL's `Instance` type, but more copy.
//

pub(crate) struct Static<T>(pub(crate) *const T);
impl<T> core::ops::Deref for Static<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        // Safety: pointer points to static memory (peripheral memory)
        unsafe { &*self.0 }
    }
}
impl<T> Clone for Static<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Static<T> {}
