//! DMA channel

use crate::{
    peripheral::Request,
    ral::{self, gpdma, Static},
};

/// A DMA channel
///
/// You should rely on your HAL, or on the [`Driver`](crate::Driver), to allocate
/// `Channel`s. If you're designing the HAL, use [`Dma::find_channel`](crate::Dma::find_channel)
/// or [`Dma::channel`](crate::Dma::channel) to create channels.
///
/// The `Channel` stores memory addresses independent of the memory lifetime. You must make
/// sure that the channel's state is valid before enabling a transfer!
pub struct Channel {
    /// Our channel number, expected to be between 0 to (CHANNELS - 1)
    index: usize,
    /// Reference to the controller registers
    controller: Static<gpdma::RegisterBlock>,
    /// Reference to this channel's registers
    registers: Static<ral::channel::RegisterBlock>,
}

impl Channel {
    /// # Safety
    ///
    /// `controller` must point at the GPDMA registers, and `index` must be a valid
    /// channel for that controller.
    pub(crate) unsafe fn new(controller: Static<gpdma::RegisterBlock>, index: usize) -> Self {
        Channel {
            index,
            controller,
            registers: Static(&controller.CH[index]),
        }
    }

    /// Returns the DMA channel number
    ///
    /// Channels are unique and numbered within the half-open range `[0, CHANNELS)`.
    pub fn channel(&self) -> usize {
        self.index
    }

    fn mask(&self) -> u32 {
        1 << self.index
    }

    /// Reset the channel's registers
    ///
    /// `reset` should be called during channel initialization to put the
    /// channel into a known, good state. This also disables the channel.
    pub fn reset(&mut self) {
        let ch = &*self.registers;
        ral::write_reg!(ral::channel, ch, CONFIG, 0);
        ral::write_reg!(ral::channel, ch, CONTROL, 0);
        ral::write_reg!(ral::channel, ch, LLI, 0);
        ral::write_reg!(ral::channel, ch, SRCADDR, 0);
        ral::write_reg!(ral::channel, ch, DESTADDR, 0);
    }

    /// Program the channel's transfer control word
    ///
    /// This replaces the entire control word, including the terminal count
    /// interrupt enable. Call [`set_interrupt_on_completion`](Channel::set_interrupt_on_completion)
    /// afterwards if you want the interrupt.
    ///
    /// `control.transfer_size` is truncated to the twelve bit transfer size field.
    pub fn configure(&mut self, control: Control) {
        let ch = &*self.registers;
        ral::write_reg!(ral::channel, ch, CONTROL, control.raw());
    }

    /// Returns the raw transfer control word
    pub fn control(&self) -> u32 {
        let ch = &*self.registers;
        ral::read_reg!(ral::channel, ch, CONTROL)
    }

    /// Select the peripheral request line that sources the transfer
    ///
    /// Ignored by the hardware for memory sources.
    pub fn set_source_peripheral(&mut self, request: Request) {
        let ch = &*self.registers;
        ral::modify_reg!(ral::channel, ch, CONFIG, SRCPERIPHERAL: request.raw() as u32);
    }

    /// Select the peripheral request line that receives the transfer
    ///
    /// Ignored by the hardware for memory destinations.
    pub fn set_destination_peripheral(&mut self, request: Request) {
        let ch = &*self.registers;
        ral::modify_reg!(ral::channel, ch, CONFIG, DESTPERIPHERAL: request.raw() as u32);
    }

    /// Set the transfer type, which also selects the flow controller
    pub fn set_transfer_type(&mut self, transfer_type: TransferType) {
        let ch = &*self.registers;
        ral::modify_reg!(ral::channel, ch, CONFIG, TRANSFERTYPE: transfer_type as u32);
    }

    /// Set the source address for a DMA transfer
    ///
    /// `saddr` should be a memory location that can provide the DMA controller
    /// with data.
    pub fn set_source_address<T>(&self, saddr: *const T) {
        // Immutable write OK. 32-bit aligned store on SRCADDR.
        let ch = &*self.registers;
        ral::write_reg!(ral::channel, ch, SRCADDR, saddr as u32);
    }

    /// Set the destination address for a DMA transfer
    ///
    /// `daddr` should be a memory location that can store data from the
    /// DMA controller.
    pub fn set_destination_address<T>(&self, daddr: *const T) {
        // Immutable write OK. 32-bit aligned store on DESTADDR.
        let ch = &*self.registers;
        ral::write_reg!(ral::channel, ch, DESTADDR, daddr as u32);
    }

    /// Returns the raw source address
    pub fn source_address(&self) -> u32 {
        let ch = &*self.registers;
        ral::read_reg!(ral::channel, ch, SRCADDR)
    }

    /// Returns the raw destination address
    pub fn destination_address(&self) -> u32 {
        let ch = &*self.registers;
        ral::read_reg!(ral::channel, ch, DESTADDR)
    }

    /// Enable or disable interrupt generation when the transfer completes
    ///
    /// You're responsible for registering your interrupt handler.
    pub fn set_interrupt_on_completion(&mut self, intr: bool) {
        let ch = &*self.registers;
        ral::modify_reg!(ral::channel, ch, CONTROL, I: intr as u32);
        ral::modify_reg!(ral::channel, ch, CONFIG, ITC: intr as u32);
    }

    /// Enable or disable interrupt generation when the transfer fails
    pub fn set_interrupt_on_error(&mut self, intr: bool) {
        let ch = &*self.registers;
        ral::modify_reg!(ral::channel, ch, CONFIG, IE: intr as u32);
    }

    /// Enable the DMA channel, which lets it respond to requests
    ///
    /// # Safety
    ///
    /// This could initiate a DMA transaction that uses an invalid source or destination.
    /// Caller must ensure that the source and destination set in the channel are valid for
    /// the lifetime of the transfer.
    pub unsafe fn enable(&self) {
        let ch = &*self.registers;
        ral::modify_reg!(ral::channel, ch, CONFIG, E: 1);
    }

    /// Disable the DMA channel, preventing any DMA transfers
    ///
    /// Data in the channel's FIFO is lost.
    pub fn disable(&self) {
        let ch = &*self.registers;
        ral::modify_reg!(ral::channel, ch, CONFIG, E: 0);
    }

    /// Indicates if this DMA channel is enabled
    pub fn is_enabled(&self) -> bool {
        let ch = &*self.registers;
        ral::read_reg!(ral::channel, ch, CONFIG, E == 1)
    }

    /// Indicates if this DMA channel holds data in its FIFO
    pub fn is_active(&self) -> bool {
        let ch = &*self.registers;
        ral::read_reg!(ral::channel, ch, CONFIG, A == 1)
    }

    /// Indicates if the DMA transfer has completed
    pub fn is_complete(&self) -> bool {
        self.controller.INTTCSTAT.read() & self.mask() != 0
    }

    /// Clears completion indication
    pub fn clear_complete(&self) {
        // Immutable write OK. Write-one-to-clear, other channels unaffected.
        self.controller.INTTCCLEAR.write(self.mask());
    }

    /// Indicates if the DMA channel is in an error state
    pub fn is_error(&self) -> bool {
        self.controller.INTERRSTAT.read() & self.mask() != 0
    }

    /// Clears the error flag
    pub fn clear_error(&self) {
        // Immutable write OK. Write-one-to-clear, other channels unaffected.
        self.controller.INTERRCLR.write(self.mask());
    }
}

// It's OK to send a channel across an execution context.
// They can't be cloned or copied, so there's no chance of
// them being (mutably) shared.
unsafe impl Send for Channel {}

/// Number of transfers that make up a burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum BurstSize {
    One = 0,
    Four = 1,
    Eight = 2,
    Sixteen = 3,
    ThirtyTwo = 4,
    SixtyFour = 5,
    OneHundredTwentyEight = 6,
    TwoHundredFiftySix = 7,
}

/// Size of a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Width {
    /// 8 bits
    Byte = 0,
    /// 16 bits
    HalfWord = 1,
    /// 32 bits
    Word = 2,
}

/// Transfer endpoints, with the DMA controller as flow controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TransferType {
    MemoryToMemory = 0,
    MemoryToPeripheral = 1,
    PeripheralToMemory = 2,
    PeripheralToPeripheral = 3,
}

/// A channel's transfer control settings
///
/// The default describes a single, word-sized transfer with fixed
/// source and destination addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    /// Number of transfers, in units of the source width
    pub transfer_size: u16,
    pub source_burst: BurstSize,
    pub destination_burst: BurstSize,
    pub source_width: Width,
    pub destination_width: Width,
    /// Advance the source address after each transfer
    pub source_increment: bool,
    /// Advance the destination address after each transfer
    pub destination_increment: bool,
}

impl Default for Control {
    fn default() -> Self {
        Control {
            transfer_size: 1,
            source_burst: BurstSize::One,
            destination_burst: BurstSize::One,
            source_width: Width::Word,
            destination_width: Width::Word,
            source_increment: false,
            destination_increment: false,
        }
    }
}

impl Control {
    /// Returns the control word for these settings
    ///
    /// The terminal count interrupt enable is never set.
    pub fn raw(&self) -> u32 {
        use ral::channel::CONTROL::*;
        let field = |value: u32, offset: u32, mask: u32| (value << offset) & mask;
        field(self.transfer_size as u32, TRANSFERSIZE::offset, TRANSFERSIZE::mask)
            | field(self.source_burst as u32, SBSIZE::offset, SBSIZE::mask)
            | field(self.destination_burst as u32, DBSIZE::offset, DBSIZE::mask)
            | field(self.source_width as u32, SWIDTH::offset, SWIDTH::mask)
            | field(self.destination_width as u32, DWIDTH::offset, DWIDTH::mask)
            | field(self.source_increment as u32, SI::offset, SI::mask)
            | field(self.destination_increment as u32, DI::offset, DI::mask)
    }
}

#[cfg(test)]
mod tests {
    use super::{BurstSize, Control, TransferType, Width};
    use crate::{peripheral::Request, ral::testing::Memory, Dma};

    const CH2: usize = 0x100 + 2 * 0x20;
    const CONTROL: usize = 0x0C;
    const CONFIG: usize = 0x10;

    #[test]
    fn default_control_word() {
        // size 1, word widths at bits 18 and 21
        assert_eq!(Control::default().raw(), 0x0048_0001);
    }

    #[test]
    fn control_word_fields() {
        let control = Control {
            transfer_size: 0x1234,
            source_burst: BurstSize::TwoHundredFiftySix,
            destination_burst: BurstSize::Four,
            source_width: Width::Byte,
            destination_width: Width::HalfWord,
            source_increment: true,
            destination_increment: false,
        };
        // Transfer size is truncated to 12 bits.
        assert_eq!(
            control.raw(),
            0x234 | (7 << 12) | (1 << 15) | (0 << 18) | (1 << 21) | (1 << 26)
        );
    }

    #[test]
    fn configure_replaces_control_word() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };
        let mut channel = unsafe { dma.channel(2) };

        memory.write(CH2 + CONTROL, 0xFFFF_FFFF);
        channel.configure(Control::default());
        assert_eq!(memory.read(CH2 + CONTROL), 0x0048_0001);
        assert_eq!(channel.control(), 0x0048_0001);
    }

    #[test]
    fn peripheral_selectors() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };
        let mut channel = unsafe { dma.channel(2) };

        channel.set_source_peripheral(Request::I2S_CHANNEL_0);
        assert_eq!((memory.read(CH2 + CONFIG) >> 1) & 0xF, 0b0101);

        channel.set_destination_peripheral(Request::UART3_RX);
        assert_eq!((memory.read(CH2 + CONFIG) >> 6) & 0xF, 0b1111);

        // Reselecting replaces the field instead of OR-ing into it.
        channel.set_source_peripheral(Request::SSP1_TX);
        assert_eq!((memory.read(CH2 + CONFIG) >> 1) & 0xF, 0b0010);
        assert_eq!(memory.read(CH2 + CONFIG), (2 << 1) | (15 << 6));
    }

    #[test]
    fn transfer_type_field() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };
        let mut channel = unsafe { dma.channel(2) };

        channel.set_transfer_type(TransferType::PeripheralToMemory);
        assert_eq!(memory.read(CH2 + CONFIG), 0x02 << 11);
        channel.set_transfer_type(TransferType::MemoryToPeripheral);
        assert_eq!(memory.read(CH2 + CONFIG), 0x01 << 11);
    }

    #[test]
    fn enable_disable() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };
        let mut channel = unsafe { dma.channel(2) };
        channel.set_transfer_type(TransferType::PeripheralToMemory);

        unsafe { channel.enable() };
        assert!(channel.is_enabled());
        assert_eq!(memory.read(CH2 + CONFIG), (0x02 << 11) | 1);

        channel.disable();
        assert!(!channel.is_enabled());
        assert_eq!(memory.read(CH2 + CONFIG), 0x02 << 11);
    }

    #[test]
    fn interrupt_enables() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };
        let mut channel = unsafe { dma.channel(2) };
        channel.configure(Control::default());

        channel.set_interrupt_on_completion(true);
        channel.set_interrupt_on_error(true);
        assert_eq!(memory.read(CH2 + CONTROL), 0x8048_0001);
        assert_eq!(memory.read(CH2 + CONFIG), (1 << 15) | (1 << 14));

        channel.set_interrupt_on_completion(false);
        assert_eq!(memory.read(CH2 + CONTROL), 0x0048_0001);
        assert_eq!(memory.read(CH2 + CONFIG), 1 << 14);
    }

    #[test]
    fn per_channel_flags() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };
        let channel = unsafe { dma.channel(2) };

        memory.write(0x04, 0b0100);
        memory.write(0x0C, 0b0001);
        assert!(channel.is_complete());
        assert!(!channel.is_error());

        channel.clear_complete();
        channel.clear_error();
        assert_eq!(memory.read(0x08), 0b100);
        assert_eq!(memory.read(0x10), 0b100);
    }

    #[test]
    fn reset_clears_everything() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };
        let mut channel = unsafe { dma.channel(2) };
        for offset in (0..0x14).step_by(4) {
            memory.write(CH2 + offset, 0xDEAD_BEEF);
        }
        channel.reset();
        for offset in (0..0x14).step_by(4) {
            assert_eq!(memory.read(CH2 + offset), 0, "offset {offset:#X}");
        }
    }
}
