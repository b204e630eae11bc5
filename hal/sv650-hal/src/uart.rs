//! UART receive abstractions for the ECU diagnostic line
//!
//! The ECU only talks; the reader never transmits. Frame boundaries are
//! signalled by gaps between bytes, so every byte handed to the decoder
//! carries the instant it arrived.

use embassy_time::Instant;

/// ECU diagnostic line speed
pub const ECU_BAUDRATE: u32 = 7800;

/// A received byte and its arrival time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawByte {
    /// Byte value as read from the line
    pub byte: u8,
    /// Monotonic arrival instant
    pub at: Instant,
}

impl RawByte {
    /// Pair a byte with its arrival instant
    pub const fn new(byte: u8, at: Instant) -> Self {
        Self { byte, at }
    }
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read pending data into `buf`
    ///
    /// Returns the number of bytes read; `0` means nothing is pending.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Receiver that timestamps every byte on arrival
///
/// Implementations should stamp the byte as close to the receive interrupt
/// as possible. Stamping at the time the byte is pulled from a FIFO hides the
/// inter-byte gaps the framer depends on.
pub trait TimedRx {
    /// Error type for receive operations
    type Error;

    /// Pull the next byte in arrival order
    ///
    /// Returns `Ok(None)` when no byte is pending.
    fn read_timed(&mut self) -> Result<Option<RawByte>, Self::Error>;
}

/// Monotonic time source
pub trait Clock {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Polled receiver that stamps bytes as they are read
///
/// For boards without a timestamping receive interrupt. Stamping accuracy is
/// bounded by how often the owner polls, so the poll period must stay well
/// under the framer's inter-byte timeout.
pub struct StampedRx<R, C> {
    rx: R,
    clock: C,
}

impl<R: UartRx, C: Clock> StampedRx<R, C> {
    /// Wrap a receiver and a clock
    pub fn new(rx: R, clock: C) -> Self {
        Self { rx, clock }
    }

    /// Release the wrapped receiver and clock
    pub fn into_inner(self) -> (R, C) {
        (self.rx, self.clock)
    }
}

impl<R: UartRx, C: Clock> TimedRx for StampedRx<R, C> {
    type Error = R::Error;

    fn read_timed(&mut self) -> Result<Option<RawByte>, Self::Error> {
        let mut buf = [0u8; 1];
        if self.rx.read(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(RawByte::new(buf[0], self.clock.now())))
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: ECU_BAUDRATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// Time on the wire for one character, in microseconds
    ///
    /// Counts the start bit, data bits, parity bit (if any) and stop bits.
    pub fn char_time_us(&self) -> u32 {
        let data: u32 = match self.data_bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
            DataBits::Nine => 9,
        };
        let parity: u32 = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        let stop: u32 = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        let bits = 1 + data + parity + stop;
        (bits * 1_000_000).div_ceil(self.baudrate.max(1))
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
