//! GPDMA controller registers and fields

use super::{channel, RORegister, RWRegister, WORegister};

/// The most channels any GPDMA instance provides.
pub const MAX_CHANNELS: usize = 8;

/// GPDMA controller registers.
#[repr(C)]
pub struct RegisterBlock {
    /// Interrupt Status Register
    pub INTSTAT: RORegister<u32>,
    /// Interrupt Terminal Count Request Status Register
    pub INTTCSTAT: RORegister<u32>,
    /// Interrupt Terminal Count Request Clear Register
    pub INTTCCLEAR: WORegister<u32>,
    /// Interrupt Error Status Register
    pub INTERRSTAT: RORegister<u32>,
    /// Interrupt Error Clear Register
    pub INTERRCLR: WORegister<u32>,
    /// Raw Interrupt Terminal Count Status Register
    pub RAWINTTCSTAT: RORegister<u32>,
    /// Raw Error Interrupt Status Register
    pub RAWINTERRSTAT: RORegister<u32>,
    /// Enabled Channel Register
    pub ENBLDCHNS: RORegister<u32>,
    /// Software Burst Request Register
    pub SOFTBREQ: RWRegister<u32>,
    /// Software Single Request Register
    pub SOFTSREQ: RWRegister<u32>,
    /// Software Last Burst Request Register
    pub SOFTLBREQ: RWRegister<u32>,
    /// Software Last Single Request Register
    pub SOFTLSREQ: RWRegister<u32>,
    /// Configuration Register
    pub CONFIG: RWRegister<u32>,
    /// Synchronization Register
    pub SYNC: RWRegister<u32>,
    _reserved0: [u32; 50],
    /// Channel registers
    pub CH: [channel::RegisterBlock; MAX_CHANNELS],
}

const _: () = assert!(core::mem::offset_of!(RegisterBlock, ENBLDCHNS) == 0x1C);
const _: () = assert!(core::mem::offset_of!(RegisterBlock, CONFIG) == 0x30);
// LPC_GPDMACH0 lives 0x100 past LPC_GPDMA.
const _: () = assert!(core::mem::offset_of!(RegisterBlock, CH) == 0x100);

pub mod ENBLDCHNS {
    fields! {
        ENABLEDCHANNELS @ 0 : 8,
    }
}

pub mod CONFIG {
    fields! {
        /* Controller enable */
        E @ 0 : 1,
        /* AHB master endianness; 0 is little endian */
        M @ 1 : 1,
    }
}

pub mod SYNC {
    fields! {
        DMACSYNC @ 0 : 16,
    }
}
