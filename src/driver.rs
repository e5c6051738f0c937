//! Single channel DMA driver
//!
//! The [`Driver`] claims one channel from a [`Dma`], programs it once, and then
//! leaves the hardware to run. It's built for peripheral sampling: the default
//! [`Config`] moves ADC results into memory, one word per request.

use crate::{
    channel::{Channel, Control, TransferType},
    controller::Endian,
    interrupt::InterruptLine,
    peripheral::Request,
    Dma, Error, Result,
};

use core::sync::atomic;

/// Driver configuration
///
/// The default configuration
///
/// - uses a little endian AHB master.
/// - enables sync logic on all sixteen request lines.
/// - performs single, word-sized transfers without incrementing either address.
/// - sources the transfer from the ADC, and moves it to memory.
/// - enables the completion and error interrupts.
/// - waits forever for the controller to enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub endian: Endian,
    /// Request lines that need the sync logic; see [`Dma::enable_sync`].
    pub sync: u32,
    pub control: Control,
    pub source: Request,
    /// Leave `None` when the destination is memory.
    pub destination: Option<Request>,
    pub transfer_type: TransferType,
    pub interrupt_on_completion: bool,
    pub interrupt_on_error: bool,
    /// Bound on controller enable attempts; see [`Dma::enable_controller_blocking`].
    pub enable_attempts: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endian: Endian::Little,
            sync: 0xFFFF,
            control: Control::default(),
            source: Request::ADC,
            destination: None,
            transfer_type: TransferType::PeripheralToMemory,
            interrupt_on_completion: true,
            interrupt_on_error: true,
            enable_attempts: None,
        }
    }
}

/// A DMA driver that owns one channel
///
/// A `Driver` starts uninitialized. [`init`](Driver::init) claims the lowest free
/// channel and programs it. Until `init` succeeds, operations that change the
/// channel do nothing: the address setters silently return, and the `try_`
/// variants and [`start`](Driver::start) return [`Error::NotInitialized`]. Use
/// [`is_initialized`](Driver::is_initialized) to tell the cases apart.
///
/// Create only one `Driver` per [`Dma`].
pub struct Driver<'a, const CHANNELS: usize> {
    dma: &'a Dma<CHANNELS>,
    channel: Option<Channel>,
}

impl<'a, const CHANNELS: usize> Driver<'a, CHANNELS> {
    /// Create an uninitialized driver
    pub const fn new(dma: &'a Dma<CHANNELS>) -> Self {
        Driver { dma, channel: None }
    }

    /// Claim a channel, enable the controller, and program the channel
    ///
    /// Errors leave the driver uninitialized. There's no retry; call `init` again
    /// if you'd like to try again.
    ///
    /// Calling `init` on an initialized driver disables and releases the
    /// previous channel before claiming a new one.
    pub fn init(&mut self, config: &Config) -> Result<()> {
        if let Some(channel) = self.channel.take() {
            channel.disable();
        }

        self.dma.enable_clock();

        // Safety: we're the only holder of channels from this Dma.
        let mut channel = match unsafe { self.dma.find_channel() } {
            Ok(channel) => channel,
            Err(err) => {
                log::error!("No open DMA channels found.");
                return Err(err);
            }
        };
        log::info!("DMA channel found: channel {}", channel.channel());

        channel.clear_complete();
        channel.clear_error();

        self.dma.enable_sync(config.sync);
        if let Err(err) = self
            .dma
            .enable_controller_blocking(config.endian, config.enable_attempts)
        {
            log::error!("{}", err);
            return Err(err);
        }

        // Set up everything, but don't start any transfers.
        channel.reset();
        channel.configure(config.control);
        channel.set_source_peripheral(config.source);
        if let Some(destination) = config.destination {
            channel.set_destination_peripheral(destination);
        }
        channel.set_transfer_type(config.transfer_type);
        channel.set_interrupt_on_completion(config.interrupt_on_completion);
        channel.set_interrupt_on_error(config.interrupt_on_error);

        self.channel = Some(channel);
        log::info!("DMA setup successfully completed!");
        Ok(())
    }

    /// Returns `true` if the driver owns a configured channel
    pub fn is_initialized(&self) -> bool {
        self.channel.is_some()
    }

    /// Returns the claimed channel's number, if the driver is initialized
    pub fn channel(&self) -> Option<usize> {
        self.channel.as_ref().map(Channel::channel)
    }

    fn initialized(&self) -> Result<&Channel> {
        self.channel.as_ref().ok_or(Error::NotInitialized)
    }

    /// Enable the channel, then unmask the DMA interrupt
    ///
    /// Make sure that the source and destination addresses are valid for the
    /// lifetime of the transfers before you start.
    pub fn start<L: InterruptLine + ?Sized>(&mut self, line: &mut L) -> Result<()> {
        let channel = self.initialized()?;
        // Configuration must land before the channel can act on it.
        atomic::fence(atomic::Ordering::SeqCst);
        // Safety: the driver programmed the channel in init. The caller is
        // responsible for the addresses.
        unsafe { channel.enable() };
        line.unmask();
        Ok(())
    }

    /// Disable the channel
    ///
    /// The channel stays claimed and configured. Does nothing if the driver
    /// is uninitialized.
    pub fn stop(&mut self) {
        if let Some(channel) = &self.channel {
            channel.disable();
        }
    }

    /// Disable the controller, and release the channel
    ///
    /// The driver is uninitialized afterwards.
    pub fn deinit(&mut self) {
        self.channel = None;
        self.dma.disable_controller();
    }

    /// Set the transfer's source address
    ///
    /// Does nothing if the driver is uninitialized.
    pub fn set_source_address<T>(&mut self, saddr: *const T) {
        let _ = self.try_set_source_address(saddr);
    }

    /// Set the transfer's destination address
    ///
    /// Does nothing if the driver is uninitialized.
    pub fn set_destination_address<T>(&mut self, daddr: *const T) {
        let _ = self.try_set_destination_address(daddr);
    }

    /// Set the transfer's source address, or report that the driver isn't initialized
    pub fn try_set_source_address<T>(&mut self, saddr: *const T) -> Result<()> {
        self.initialized()?.set_source_address(saddr);
        Ok(())
    }

    /// Set the transfer's destination address, or report that the driver isn't initialized
    pub fn try_set_destination_address<T>(&mut self, daddr: *const T) -> Result<()> {
        self.initialized()?.set_destination_address(daddr);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Driver};
    use crate::{ral::testing::Memory, Dma, Endian, Error, InterruptLine};

    const ENBLDCHNS: usize = 0x1C;
    const CONFIG: usize = 0x30;
    const SYNC: usize = 0x34;
    const INTTCCLEAR: usize = 0x08;
    const INTERRCLR: usize = 0x10;
    const PCONP: usize = 0xC4;

    fn channel(index: usize) -> usize {
        0x100 + index * 0x20
    }
    const SRCADDR: usize = 0x00;
    const DESTADDR: usize = 0x04;
    const CONTROL: usize = 0x0C;
    const CH_CONFIG: usize = 0x10;

    #[derive(Default)]
    struct Line {
        unmasked: u32,
    }

    impl InterruptLine for Line {
        fn unmask(&mut self) {
            self.unmasked += 1;
        }
    }

    #[test]
    fn init_programs_lowest_free_channel() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };
        memory.write(ENBLDCHNS, 0b0000_0111);
        memory.write(channel(3) + CH_CONFIG, 0xFFFF_FFFF);

        let mut driver = Driver::new(&dma);
        assert!(!driver.is_initialized());
        assert_eq!(driver.init(&Config::default()), Ok(()));

        assert!(driver.is_initialized());
        assert_eq!(driver.channel(), Some(3));
        assert_eq!(syscon.read(PCONP), 1 << 29);
        assert_eq!(memory.read(SYNC), 0xFFFF);
        assert_eq!(memory.read(CONFIG) & 0b11, 0b01);
        assert_eq!(memory.read(INTTCCLEAR), 1 << 3);
        assert_eq!(memory.read(INTERRCLR), 1 << 3);
        // Default control word, plus the terminal count interrupt enable.
        assert_eq!(memory.read(channel(3) + CONTROL), 0x8048_0001);
        // ADC source, peripheral-to-memory, both interrupt masks, not enabled.
        assert_eq!(
            memory.read(channel(3) + CH_CONFIG),
            (4 << 1) | (2 << 11) | (1 << 14) | (1 << 15)
        );
    }

    #[test]
    fn init_without_free_channel_stays_uninitialized() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };
        memory.write(ENBLDCHNS, 0xFF);

        let mut driver = Driver::new(&dma);
        assert_eq!(driver.init(&Config::default()), Err(Error::NoFreeChannel));
        assert!(!driver.is_initialized());
        assert_eq!(driver.channel(), None);
        // The controller was never enabled.
        assert_eq!(memory.read(CONFIG), 0);
    }

    #[test]
    fn init_honors_config() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };

        let config = Config {
            endian: Endian::Big,
            sync: 0x0010,
            destination: Some(crate::Request::DAC),
            transfer_type: crate::TransferType::PeripheralToPeripheral,
            interrupt_on_completion: false,
            interrupt_on_error: false,
            enable_attempts: Some(3),
            ..Config::default()
        };
        let mut driver = Driver::new(&dma);
        assert_eq!(driver.init(&config), Ok(()));
        assert_eq!(driver.channel(), Some(0));
        assert_eq!(memory.read(CONFIG) & 0b11, 0b11);
        assert_eq!(memory.read(SYNC), 0x0010);
        assert_eq!(memory.read(channel(0) + CONTROL), 0x0048_0001);
        assert_eq!(
            memory.read(channel(0) + CH_CONFIG),
            (4 << 1) | (7 << 6) | (3 << 11)
        );
    }

    #[test]
    fn uninitialized_calls_do_nothing() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };
        for index in 0..8 {
            memory.write(channel(index) + SRCADDR, 0x1111_1111);
            memory.write(channel(index) + DESTADDR, 0x2222_2222);
        }

        let mut driver = Driver::new(&dma);
        let mut line = Line::default();
        driver.set_source_address(0x4003_4010 as *const u32);
        driver.set_destination_address(0x2007_C000 as *const u32);
        driver.stop();
        assert_eq!(
            driver.try_set_source_address(0x4003_4010 as *const u32),
            Err(Error::NotInitialized)
        );
        assert_eq!(
            driver.try_set_destination_address(0x2007_C000 as *const u32),
            Err(Error::NotInitialized)
        );
        assert_eq!(driver.start(&mut line), Err(Error::NotInitialized));
        assert_eq!(line.unmasked, 0);

        for index in 0..8 {
            assert_eq!(memory.read(channel(index) + SRCADDR), 0x1111_1111);
            assert_eq!(memory.read(channel(index) + DESTADDR), 0x2222_2222);
            assert_eq!(memory.read(channel(index) + CH_CONFIG), 0);
        }
    }

    #[test]
    fn addresses_after_init() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };

        let mut driver = Driver::new(&dma);
        driver.init(&Config::default()).unwrap();
        driver.set_source_address(0x4003_4010 as *const u32);
        assert_eq!(
            driver.try_set_destination_address(0x2007_C000 as *const u32),
            Ok(())
        );
        assert_eq!(memory.read(channel(0) + SRCADDR), 0x4003_4010);
        assert_eq!(memory.read(channel(0) + DESTADDR), 0x2007_C000);
    }

    #[test]
    fn start_enables_then_unmasks() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };

        let mut driver = Driver::new(&dma);
        let mut line = Line::default();
        driver.init(&Config::default()).unwrap();
        assert_eq!(memory.read(channel(0) + CH_CONFIG) & 1, 0);

        assert_eq!(driver.start(&mut line), Ok(()));
        assert_eq!(memory.read(channel(0) + CH_CONFIG) & 1, 1);
        assert_eq!(line.unmasked, 1);

        driver.stop();
        assert_eq!(memory.read(channel(0) + CH_CONFIG) & 1, 0);
        assert!(driver.is_initialized());
    }

    #[test]
    fn deinit_shuts_down() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };

        let mut driver = Driver::new(&dma);
        let mut line = Line::default();
        driver.init(&Config::default()).unwrap();
        driver.start(&mut line).unwrap();
        // Hardware would reflect the enabled channel here.
        memory.write(ENBLDCHNS, 0b1);

        driver.deinit();
        assert!(!driver.is_initialized());
        assert_eq!(memory.read(CONFIG) & 1, 0);
        assert_eq!(memory.read(channel(0) + CH_CONFIG) & 1, 0);
        assert_eq!(driver.start(&mut line), Err(Error::NotInitialized));
    }

    #[test]
    fn reinit_releases_previous_channel() {
        let memory = Memory::gpdma();
        let syscon = Memory::syscon();
        let dma = unsafe { Dma::<8>::new(memory.as_ptr(), syscon.as_ptr()) };

        let mut driver = Driver::new(&dma);
        let mut line = Line::default();
        driver.init(&Config::default()).unwrap();
        driver.start(&mut line).unwrap();

        memory.write(ENBLDCHNS, 0b1);
        driver.init(&Config::default()).unwrap();
        assert_eq!(memory.read(channel(0) + CH_CONFIG) & 1, 0);
        // Our model's ENBLDCHNS doesn't follow the channel's enable bit.
        assert_eq!(driver.channel(), Some(1));
    }
}
