/*! Decoder descriptors and the dispatch loop that runs every enabled
decoder against each captured burst.

`rustradio` has nothing shaped like this (a block graph doesn't fan one
input out to a registry of independent parsers): each decoder gets its
own timing parameters and slicer, is run against every burst regardless
of whether an earlier decoder already matched, and reports a
[`DecodeStatus`] rather than unwinding — a bad CRC or a sync pattern
that didn't match is business as usual, not an error. The dispatch loop
itself is written as a [`crate::block::Block`], in keeping with this
crate's rule that every pipeline stage is one.
*/

use crate::Error;
use crate::bitbuffer::Bitbuffer;
use crate::block::{Block, BlockRet};
use crate::pulse_data::PulseBurst;
use crate::slicer::{self, Coding, TimingParams};
use crate::stream::{NCReadStream, NCWriteStream};
use crate::value::Record;
use log::trace;

/// Result of running one decoder against one sliced burst.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeStatus {
    /// The burst matched this decoder and a record was produced.
    Decoded(Record),
    /// The sync/preamble pattern for this decoder was not found.
    NoSync,
    /// A sync pattern matched but the row was the wrong length.
    WrongLength,
    /// The row length matched but a checksum/parity check failed.
    InvalidChecksum,
    /// The row passed structural and checksum checks but its field
    /// values are out of the physically plausible range for this model
    /// (e.g. a humidity reading above 100%) — a decode-time sanity guard
    /// against a checksum that happens to pass on noise.
    ImplausibleValue,
}

/// Which family of envelope the decoder expects its bursts to have been
/// captured from; matched against the active pulse detector's modulation
/// before a burst is even sliced, so an FSK-only decoder never wastes
/// time slicing an OOK burst.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modulation {
    /// On-off keying.
    Ook,
    /// Frequency-shift keying.
    Fsk,
}

/// A function that turns one sliced row into a decode result.
pub type DecodeFn = fn(&Bitbuffer) -> DecodeStatus;

/// One registered protocol decoder: timing, coding, and the parse
/// function, plus the structural minimums worth checking before even
/// calling it.
pub struct Decoder {
    /// Human-readable protocol name, used as the `model` field and in
    /// logs (e.g. `"LaCrosse-TX141THBv2"`).
    pub name: &'static str,
    /// Modulation family this decoder expects.
    pub modulation: Modulation,
    /// Pulse-to-bit coding and timing this decoder's bursts use.
    pub timing: TimingParams,
    /// Which slicer to run the burst through.
    pub coding: Coding,
    /// Minimum number of repeated rows required before attempting a
    /// decode (most of these protocols retransmit for redundancy).
    pub min_repeats: usize,
    /// Minimum row length, in bits, worth decoding.
    pub min_bits: usize,
    /// The decode function itself.
    pub decode: DecodeFn,
    /// Ordered list of field names this decoder can emit, used to build
    /// a tabular sink's header via [`DecoderRegistry::field_names`].
    pub field_names: &'static [&'static str],
}

impl Decoder {
    /// Slice `burst` with this decoder's coding/timing, then run its
    /// decode function against the first row that repeats at least
    /// `min_repeats` times. Callers filter by [`Decoder::modulation`]
    /// before calling this, so a burst never gets sliced by a decoder
    /// whose modulation it wasn't captured under.
    #[must_use]
    pub fn try_decode(&self, burst: &PulseBurst) -> DecodeStatus {
        let bb = slicer::slice(self.coding, burst, &self.timing);
        let Some(row) = bb.find_repeated_row(self.min_repeats, self.min_bits) else {
            return DecodeStatus::NoSync;
        };
        if bb.row(row).len() < self.min_bits {
            return DecodeStatus::WrongLength;
        }
        (self.decode)(&bb)
    }
}

/// The set of decoders a dispatch loop runs against each burst.
#[derive(Default)]
pub struct DecoderRegistry {
    decoders: Vec<Decoder>,
}

impl DecoderRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one decoder.
    pub fn register(&mut self, d: Decoder) {
        self.decoders.push(d);
    }

    /// Number of registered decoders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// True if no decoders are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Union of field names across every registered decoder, first-seen
    /// order, for initializing a tabular sink via [`crate::sink::Sink::start`].
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for d in &self.decoders {
            for name in d.field_names {
                if !seen.iter().any(|n: &String| n == name) {
                    seen.push((*name).to_owned());
                }
            }
        }
        seen
    }

    /// Run every registered decoder whose [`Decoder::modulation`] matches
    /// `modulation` against `burst`, in registration order, collecting
    /// every successful decode — more than one decoder can legitimately
    /// match the same burst, so dispatch does not stop at the first
    /// match. Decoders for the other modulation are skipped before
    /// slicing, not after: a burst the AM detector captured never gets
    /// run through an FSK decoder's slicer.
    #[must_use]
    pub fn decode_all(&self, burst: &PulseBurst, modulation: Modulation) -> Vec<Record> {
        let mut out = Vec::new();
        for d in self.decoders.iter().filter(|d| d.modulation == modulation) {
            match d.try_decode(burst) {
                DecodeStatus::Decoded(record) => {
                    trace!("decoder {} matched", d.name);
                    out.push(record);
                }
                status => trace!("decoder {} did not match: {status:?}", d.name),
            }
        }
        out
    }
}

/// The dispatch [`Block`]: reads bursts, runs every registered decoder
/// against each, and writes out every produced [`Record`].
pub struct DecoderDispatch {
    src: NCReadStream<PulseBurst>,
    dst: NCWriteStream<Record>,
    registry: DecoderRegistry,
    modulation: Modulation,
}

impl DecoderDispatch {
    /// Build a dispatch block over the given registry. `modulation` is
    /// the modulation family of the pulse detector feeding `src` — every
    /// burst arriving on this stream is assumed to have been captured
    /// under it.
    #[must_use]
    pub fn new(src: NCReadStream<PulseBurst>, dst: NCWriteStream<Record>, registry: DecoderRegistry, modulation: Modulation) -> Self {
        Self {
            src,
            dst,
            registry,
            modulation,
        }
    }
}

impl Block for DecoderDispatch {
    fn block_name(&self) -> &str {
        "DecoderDispatch"
    }

    fn work(&mut self) -> Result<BlockRet, Error> {
        let Some(burst) = self.src.pop() else {
            if self.src.eof() {
                self.dst.close();
                return Ok(BlockRet::Eof);
            }
            return Ok(BlockRet::Noop);
        };
        for record in self.registry.decode_all(&burst, self.modulation) {
            self.dst.push(record);
        }
        Ok(BlockRet::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitbuffer::Bitbuffer;
    use crate::value::RecordBuilder;

    fn always_decode(_: &Bitbuffer) -> DecodeStatus {
        DecodeStatus::Decoded(RecordBuilder::new().string("model", "Test").build())
    }

    fn never_decode(_: &Bitbuffer) -> DecodeStatus {
        DecodeStatus::InvalidChecksum
    }

    fn sample_burst() -> PulseBurst {
        let mut pulse = Vec::new();
        let mut gap = Vec::new();
        for _ in 0..3 {
            pulse.push(500);
            gap.push(500);
        }
        PulseBurst {
            pulse,
            gap,
            sample_rate: 250_000,
            ..Default::default()
        }
    }

    #[test]
    fn registry_collects_every_match() {
        let mut reg = DecoderRegistry::new();
        reg.register(Decoder {
            name: "always",
            modulation: Modulation::Ook,
            timing: TimingParams {
                short_width: 500,
                long_width: 500,
                sync_width: 0,
                gap_limit: 10_000,
                reset_limit: 20_000,
                tolerance: 400,
            },
            coding: Coding::Pcm,
            min_repeats: 1,
            min_bits: 1,
            decode: always_decode,
            field_names: &["model"],
        });
        reg.register(Decoder {
            name: "never",
            modulation: Modulation::Ook,
            timing: TimingParams {
                short_width: 500,
                long_width: 500,
                sync_width: 0,
                gap_limit: 10_000,
                reset_limit: 20_000,
                tolerance: 400,
            },
            coding: Coding::Pcm,
            min_repeats: 1,
            min_bits: 1,
            decode: never_decode,
            field_names: &["model"],
        });
        let out = reg.decode_all(&sample_burst(), Modulation::Ook);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("model"), Some(&crate::value::Value::Str("Test".into())));
    }

    #[test]
    fn wrong_modulation_is_skipped_without_slicing() {
        let mut reg = DecoderRegistry::new();
        reg.register(Decoder {
            name: "fsk-only",
            modulation: Modulation::Fsk,
            timing: TimingParams {
                short_width: 500,
                long_width: 500,
                sync_width: 0,
                gap_limit: 10_000,
                reset_limit: 20_000,
                tolerance: 400,
            },
            coding: Coding::Pcm,
            min_repeats: 1,
            min_bits: 1,
            decode: always_decode,
            field_names: &["model"],
        });
        let out = reg.decode_all(&sample_burst(), Modulation::Ook);
        assert!(out.is_empty());
    }
}
