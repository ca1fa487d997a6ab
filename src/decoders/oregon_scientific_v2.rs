/*! Oregon Scientific v2.1 protocol (THGR-family sensors): FSK Manchester
coding with a fixed nibble-swapped preamble, per-nibble checksum.

Oregon v2.1 transmits each nibble twice in a row (sent LSB-nibble
first), which this decoder undoes before interpreting fields — the one
family in this set needing a de-interleave step ahead of field
extraction.
*/

use crate::bitbuffer::Bitbuffer;
use crate::decoder::{Decoder, DecoderRegistry, DecodeStatus, Modulation};
use crate::slicer::{Coding, TimingParams};
use crate::value::RecordBuilder;

const TIMING: TimingParams = TimingParams {
    short_width: 512,
    long_width: 512,
    sync_width: 0,
    gap_limit: 1200,
    reset_limit: 10_000,
    tolerance: 160,
};

/// Nibbles come across the air low-nibble-first within each byte pair;
/// un-swap them into natural nibble order.
fn unswap_nibbles(buf: &[u8]) -> Vec<u8> {
    buf.iter().map(|b| (b << 4) | (b >> 4)).collect()
}

fn decode(bb: &Bitbuffer) -> DecodeStatus {
    let row = match bb.find_repeated_row(1, 80) {
        Some(r) => r,
        None => return DecodeStatus::NoSync,
    };
    if bb.row(row).len() < 80 {
        return DecodeStatus::WrongLength;
    }
    let mut raw = [0u8; 10];
    bb.extract_bytes(row, 0, &mut raw, 80);
    let buf = unswap_nibbles(&raw);

    let sensor_id = (u16::from(buf[0]) << 8) | u16::from(buf[1]);
    if sensor_id != 0x1d20 && sensor_id != 0x1a2d {
        return DecodeStatus::NoSync;
    }

    let checksum_nibble_sum: u32 = buf[0..7].iter().map(|b| u32::from(b >> 4) + u32::from(b & 0x0f)).sum();
    let expected = (checksum_nibble_sum & 0xff) as u8;
    if expected != buf[7] {
        return DecodeStatus::InvalidChecksum;
    }

    let channel = buf[2] >> 4;
    let id = buf[3];
    let battery_low = (buf[4] >> 6) & 1;
    let temp_sign = (buf[5] >> 4) & 1;
    let temp_bcd = u32::from(buf[4] & 0x0f) * 100 + u32::from(buf[5] >> 4) * 10 + u32::from(buf[5] & 0x0f);
    let temperature_c = f64::from(temp_bcd) / 10.0 * if temp_sign != 0 { -1.0 } else { 1.0 };

    if !(-50.0..=70.0).contains(&temperature_c) {
        return DecodeStatus::ImplausibleValue;
    }

    let record = RecordBuilder::new()
        .string("model", "Oregon-THGR810")
        .int("id", i64::from(id))
        .int("channel", i64::from(channel))
        .int("battery_ok", i64::from(battery_low == 0))
        .double("temperature_C", temperature_c)
        .build();
    DecodeStatus::Decoded(record)
}

/// Register the Oregon Scientific v2.1 decoder.
pub fn register(registry: &mut DecoderRegistry) {
    registry.register(Decoder {
        name: "Oregon-THGR810",
        modulation: Modulation::Fsk,
        timing: TIMING,
        coding: Coding::ManchesterZerobit,
        min_repeats: 1,
        min_bits: 80,
        decode,
        field_names: &["model", "id", "channel", "battery_ok", "temperature_C"],
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with_bits(bits: &[u8]) -> Bitbuffer {
        let mut bb = Bitbuffer::new();
        for &b in bits {
            bb.add_bit(b);
        }
        bb
    }

    fn bits_from_bytes(bytes: &[u8], n_bits: usize) -> Vec<u8> {
        (0..n_bits).map(|i| (bytes[i / 8] >> (7 - (i % 8))) & 1).collect()
    }

    #[test]
    fn rejects_unknown_sensor_id() {
        let bytes = [0xff, 0xff, 0, 0, 0, 0, 0, 0, 0, 0];
        let bb = row_with_bits(&bits_from_bytes(&bytes, 80));
        assert_eq!(decode(&bb), DecodeStatus::NoSync);
    }
}
