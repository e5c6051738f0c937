//! System control registers that concern the GPDMA
//!
//! Only the clock gate and the request select register are
//! described. Everything else is reserved space.

use super::RWRegister;

#[repr(C)]
pub struct RegisterBlock {
    _reserved0: [u32; 49],
    /// Power Control for Peripherals Register
    pub PCONP: RWRegister<u32>,
    _reserved1: [u32; 63],
    /// DMA Request Select Register
    pub DMAREQSEL: RWRegister<u32>,
}

const _: () = assert!(core::mem::offset_of!(RegisterBlock, PCONP) == 0xC4);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, DMAREQSEL) == 0x1C4);

pub mod PCONP {
    fields! {
        PCGPDMA @ 29 : 1,
    }
}

pub mod DMAREQSEL {
    fields! {
        /* One bit per shared request line, 8 through 15 */
        DMASEL @ 0 : 8,
    }
}
