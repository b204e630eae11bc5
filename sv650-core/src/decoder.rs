//! Byte-in, result-out decode pipeline
//!
//! [`Decoder`] owns the frame assembler and the link monitor. Every byte is
//! pushed through the assembler; each completed frame is checksummed and
//! decoded, and the outcome is reported to the link monitor.

use embassy_time::Instant;
use sv650_hal::{OutputPin, RawByte, TimedRx};
use sv650_protocol::{AssemblerStats, FrameAssembler};

use crate::config::{ConfigError, DecoderConfig};
use crate::decode::{decode, DecodeResult};
use crate::monitor::{LinkMonitor, LinkSettings, LinkStatus};

/// Decoder counters
///
/// Saturating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderStats {
    /// Frames decoded
    pub frames: u32,
    /// Frames that failed the checksum
    pub checksum_failures: u32,
}

/// Streaming SV650 decoder
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    config: DecoderConfig<'a>,
    assembler: FrameAssembler,
    link: LinkMonitor,
    stats: DecoderStats,
}

impl<'a> Decoder<'a> {
    /// Create a decoder, validating the configuration
    pub fn new(config: DecoderConfig<'a>, link: LinkSettings) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            assembler: FrameAssembler::new(config.layout),
            link: LinkMonitor::new(link),
            stats: DecoderStats::default(),
        })
    }

    pub fn config(&self) -> &DecoderConfig<'a> {
        &self.config
    }

    /// Feed one byte received at `at`
    ///
    /// Returns a result for every completed frame, valid or not.
    pub fn feed(&mut self, byte: u8, at: Instant) -> Option<DecodeResult<'a>> {
        #[cfg(feature = "defmt")]
        let discards = self.assembler.stats().stale_discards;

        let frame = self.assembler.feed(byte, at);

        #[cfg(feature = "defmt")]
        if self.assembler.stats().stale_discards != discards {
            defmt::debug!("Stale partial frame dropped at {}", at);
        }

        let frame = frame?;
        let result = decode(&self.config, &frame);
        self.stats.frames = self.stats.frames.saturating_add(1);

        if result.checksum_valid {
            #[cfg(feature = "defmt")]
            defmt::trace!("Frame {=[u8]:02x}", frame.as_bytes());
        } else {
            self.stats.checksum_failures = self.stats.checksum_failures.saturating_add(1);
            #[cfg(feature = "defmt")]
            defmt::warn!("Checksum failed: {=[u8]:02x}", frame.as_bytes());
        }

        #[cfg(feature = "defmt")]
        let before = self.link.status(at);

        self.link.frame_decoded(at, result.checksum_valid);

        #[cfg(feature = "defmt")]
        {
            let after = self.link.status(at);
            if before != after {
                defmt::info!("ECU link {} -> {}", before, after);
            }
        }

        Some(result)
    }

    /// Feed one timestamped byte
    pub fn feed_raw(&mut self, raw: RawByte) -> Option<DecodeResult<'a>> {
        self.feed(raw.byte, raw.at)
    }

    /// Drain a receiver until a frame completes or it runs dry
    pub fn poll<R: TimedRx>(
        &mut self,
        rx: &mut R,
    ) -> Result<Option<DecodeResult<'a>>, R::Error> {
        while let Some(raw) = rx.read_timed()? {
            if let Some(result) = self.feed_raw(raw) {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Link health at `now`
    pub fn link_status(&self, now: Instant) -> LinkStatus {
        self.link.status(now)
    }

    pub fn link(&self) -> &LinkMonitor {
        &self.link
    }

    /// Drive the EFI warning lamp for `now`
    pub fn drive_lamp<P: OutputPin>(&self, now: Instant, lamp: &mut P) {
        self.link.drive_lamp(now, lamp);
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    pub fn assembler_stats(&self) -> AssemblerStats {
        self.assembler.stats()
    }

    /// Drop any partial frame
    ///
    /// For use after the receiver reports an overrun or framing error.
    pub fn resync(&mut self) {
        self.assembler.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SV650;
    use crate::temperature::TemperatureReading;
    use embassy_time::Duration;
    use sv650_hal::{Clock, StampedRx, UartRx};

    const CAPTURE: [u8; 8] = [0x5A, 0x40, 0x00, 0x20, 0x00, 0x6E, 0x00, 0xD7];

    /// 7800 baud byte spacing, rounded up
    const BYTE_US: u64 = 1_300;

    fn decoder() -> Decoder<'static> {
        Decoder::new(SV650, LinkSettings::default()).unwrap()
    }

    fn us(micros: u64) -> Instant {
        Instant::from_micros(micros)
    }

    /// Feed bytes at line rate from `start`, collecting results
    fn feed_from(
        decoder: &mut Decoder<'static>,
        start: u64,
        bytes: &[u8],
        out: &mut heapless::Vec<DecodeResult<'static>, 4>,
    ) -> u64 {
        let mut t = start;
        for &byte in bytes {
            if let Some(result) = decoder.feed(byte, us(t)) {
                out.push(result).unwrap();
            }
            t += BYTE_US;
        }
        t
    }

    #[test]
    fn test_known_frame_decodes() {
        let mut decoder = decoder();
        let mut out = heapless::Vec::new();
        feed_from(&mut decoder, 0, &CAPTURE, &mut out);

        assert_eq!(out.len(), 1);
        let result = out[0];
        assert!(result.checksum_valid);
        assert_eq!(result.fault.condition().code.as_str(), "C21");
        assert!(!result.trim.is_active());
        assert_eq!(result.temperature, TemperatureReading::Valid(189));
        assert_eq!(decoder.link_status(us(8 * BYTE_US)), LinkStatus::Ok);
    }

    #[test]
    fn test_corrupt_checksum_reported() {
        let mut decoder = decoder();
        let mut bytes = CAPTURE;
        bytes[7] ^= 0x01;
        let mut out = heapless::Vec::new();
        feed_from(&mut decoder, 0, &bytes, &mut out);

        assert_eq!(out.len(), 1);
        assert!(!out[0].checksum_valid);
        assert_eq!(
            decoder.stats(),
            DecoderStats {
                frames: 1,
                checksum_failures: 1
            }
        );
        assert_eq!(decoder.link().bad_streak(), 1);
    }

    #[test]
    fn test_back_to_back_frames_in_order() {
        let mut second = [0x5A, 0x00, 0x80, 0x00, 0x00, 0x6E, 0x00, 0x00];
        second[7] = SV650.checksum.closing_byte(&second[..7]);

        let mut decoder = decoder();
        let mut out = heapless::Vec::new();
        let t = feed_from(&mut decoder, 0, &CAPTURE, &mut out);
        feed_from(&mut decoder, t, &second, &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].fault.condition().code.as_str(), "C21");
        assert_eq!(out[1].fault.condition().code.as_str(), "C41");
        assert!(out.iter().all(|r| r.checksum_valid));
        assert_eq!(decoder.assembler_stats().stale_discards, 0);
    }

    #[test]
    fn test_gap_mid_frame_resyncs() {
        let mut decoder = decoder();
        let mut out = heapless::Vec::new();

        let t = feed_from(&mut decoder, 0, &CAPTURE[..5], &mut out);
        assert!(out.is_empty());

        // Line idles well past the 4 ms timeout, then a full frame follows
        let resume = t + Duration::from_millis(10).as_micros();
        feed_from(&mut decoder, resume, &CAPTURE, &mut out);

        assert_eq!(out.len(), 1);
        assert!(out[0].checksum_valid);
        assert_eq!(out[0].fault.condition().code.as_str(), "C21");
        assert_eq!(decoder.assembler_stats().stale_discards, 1);
        assert_eq!(decoder.assembler_stats().bytes_discarded, 5);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = DecoderConfig {
            temperature: crate::temperature::TemperatureSource {
                byte_index: 8,
                ..SV650.temperature
            },
            ..SV650
        };
        assert_eq!(
            Decoder::new(config, LinkSettings::default()).err(),
            Some(ConfigError::TemperatureOutOfFrame)
        );
    }

    struct Script<'s> {
        bytes: core::slice::Iter<'s, RawByte>,
    }

    impl TimedRx for Script<'_> {
        type Error = ();

        fn read_timed(&mut self) -> Result<Option<RawByte>, ()> {
            Ok(self.bytes.next().copied())
        }
    }

    #[test]
    fn test_poll_drains_receiver() {
        let mut stream: heapless::Vec<RawByte, 16> = heapless::Vec::new();
        for (i, &byte) in CAPTURE.iter().chain(CAPTURE[..3].iter()).enumerate() {
            stream.push(RawByte::new(byte, us(i as u64 * BYTE_US))).unwrap();
        }
        let mut rx = Script {
            bytes: stream.iter(),
        };
        let mut decoder = decoder();

        let first = decoder.poll(&mut rx).unwrap();
        assert!(first.is_some_and(|r| r.checksum_valid));
        assert_eq!(decoder.poll(&mut rx), Ok(None));
        assert_eq!(decoder.assembler_stats().frames, 1);

        decoder.resync();
        assert_eq!(decoder.stats().frames, 1);
    }

    struct Fifo<'s> {
        pending: &'s [u8],
    }

    impl UartRx for Fifo<'_> {
        type Error = ();

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending = &self.pending[n..];
            Ok(n)
        }
    }

    struct Ticker(core::cell::Cell<u64>);

    impl Clock for Ticker {
        fn now(&self) -> Instant {
            let t = self.0.get();
            self.0.set(t + BYTE_US);
            us(t)
        }
    }

    #[test]
    fn test_poll_stops_on_empty_fifo() {
        let mut rx = StampedRx::new(
            Fifo {
                pending: &CAPTURE[..6],
            },
            Ticker(core::cell::Cell::new(0)),
        );
        let mut decoder = decoder();

        assert_eq!(decoder.poll(&mut rx), Ok(None));
        assert_eq!(decoder.assembler_stats().frames, 0);
        // Nothing invented while the FIFO is dry
        assert_eq!(decoder.poll(&mut rx), Ok(None));

        let (_, clock) = rx.into_inner();
        let mut rx = StampedRx::new(
            Fifo {
                pending: &CAPTURE[6..],
            },
            clock,
        );
        let result = decoder.poll(&mut rx).unwrap();
        assert!(result.is_some_and(|r| r.checksum_valid));
    }

    #[test]
    fn test_bad_data_after_repeated_failures() {
        let mut decoder = decoder();
        let mut bytes = CAPTURE;
        bytes[7] = 0;
        let mut t = 0;
        for _ in 0..crate::monitor::MAX_BAD_FRAMES {
            let mut out = heapless::Vec::new();
            t = feed_from(&mut decoder, t, &bytes, &mut out);
        }
        assert_eq!(decoder.link_status(us(t)), LinkStatus::BadData);
    }
}
