//! GPDMA channel registers and fields

use super::RWRegister;

/// One channel's registers.
///
/// The controller lays these out back to back, one per channel.
#[repr(C)]
pub struct RegisterBlock {
    /// Source Address Register
    pub SRCADDR: RWRegister<u32>,
    /// Destination Address Register
    pub DESTADDR: RWRegister<u32>,
    /// Linked List Item Register
    pub LLI: RWRegister<u32>,
    /// Control Register
    pub CONTROL: RWRegister<u32>,
    /// Configuration Register
    pub CONFIG: RWRegister<u32>,
    _reserved: [u32; 3],
}

/// Distance between two channels' register blocks, in bytes.
pub const STRIDE: usize = 0x20;
const _: () = assert!(core::mem::size_of::<RegisterBlock>() == STRIDE);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, CONTROL) == 0x0C);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, CONFIG) == 0x10);

pub mod CONTROL {
    fields! {
        TRANSFERSIZE @ 0 : 12,
        SBSIZE @ 12 : 3,
        DBSIZE @ 15 : 3,
        SWIDTH @ 18 : 3,
        DWIDTH @ 21 : 3,
        SI @ 26 : 1,
        DI @ 27 : 1,
        /* Terminal count interrupt enable */
        I @ 31 : 1,
    }
}

pub mod CONFIG {
    fields! {
        E @ 0 : 1,
        SRCPERIPHERAL @ 1 : 4,
        DESTPERIPHERAL @ 6 : 4,
        TRANSFERTYPE @ 11 : 3,
        /* Error interrupt mask */
        IE @ 14 : 1,
        /* Terminal count interrupt mask */
        ITC @ 15 : 1,
        L @ 16 : 1,
        /* Active; read only */
        A @ 17 : 1,
        H @ 18 : 1,
    }
}
