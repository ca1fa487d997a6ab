/*! Alecto WS-1200/WS3000-family sensors (temperature/humidity, wind,
rain), OOK PPM coding, 36-bit rows with an additive nibble checksum.

A humidity nibble pair read as non-BCD (e.g. a high digit of `0xb`) must
be rejected as implausible (valid range is `0..=99`, and this family
packs humidity as two BCD digits) rather than reported as a bogus
reading.
*/

use crate::bitbuffer::Bitbuffer;
use crate::bits::{add_nibbles, reverse8};
use crate::decoder::{Decoder, DecoderRegistry, DecodeStatus, Modulation};
use crate::slicer::{Coding, TimingParams};
use crate::value::RecordBuilder;

const TIMING: TimingParams = TimingParams {
    short_width: 2000,
    long_width: 4000,
    sync_width: 0,
    gap_limit: 6000,
    reset_limit: 15_000,
    tolerance: 600,
};

const FRAME_BITS: usize = 36;

/// Checksum offset for the Temperature subtype; Wind/Rain subtypes of
/// this family use a different offset and are not decoded here.
const TEMPERATURE_TYPE_OFFSET: u8 = 0x0a;

fn bcd_digit(nibble: u8) -> Option<u8> {
    if nibble <= 9 { Some(nibble) } else { None }
}

/// Find two non-adjacent rows that agree on their first byte and carry
/// a zero low-nibble in byte 4 (the frame's sync/parity marker), the
/// structural check this family uses in place of a byte-for-byte
/// whole-row match.
fn find_valid_frame(bb: &Bitbuffer) -> Option<[u8; 5]> {
    let mut bufs = Vec::with_capacity(bb.num_rows());
    for i in 0..bb.num_rows() {
        if bb.row(i).len() < FRAME_BITS {
            bufs.push(None);
            continue;
        }
        let mut buf = [0u8; 5];
        bb.extract_bytes(i, 0, &mut buf, FRAME_BITS);
        bufs.push(Some(buf));
    }
    for i in 0..bufs.len() {
        let Some(a) = bufs[i] else { continue };
        for j in (i + 2)..bufs.len() {
            let Some(b) = bufs[j] else { continue };
            if a[0] == b[0] && (a[4] & 0x0f) == 0 && (b[4] & 0x0f) == 0 {
                return Some(a);
            }
        }
    }
    None
}

fn decode(bb: &Bitbuffer) -> DecodeStatus {
    let Some(buf) = find_valid_frame(bb) else {
        return DecodeStatus::NoSync;
    };

    let checksum_nibble = buf[4] >> 4;
    let sum = (add_nibbles(&buf[..4]) as u8).wrapping_add(TEMPERATURE_TYPE_OFFSET);
    if reverse8(sum) & 0x0f != checksum_nibble {
        return DecodeStatus::InvalidChecksum;
    }

    let id = buf[0];
    let channel = (buf[1] >> 4) & 0x3;
    let battery_low = (buf[1] >> 6) & 1;

    let temp_sign = (buf[1] >> 3) & 1;
    let temp_bcd = (u32::from(buf[1] & 0x07) << 8) | u32::from(buf[2]);
    let temp_tenths = (temp_bcd & 0xfff) as i32 * if temp_sign != 0 { -1 } else { 1 };
    let temperature_c = f64::from(temp_tenths) / 10.0;

    let hum_hi = bcd_digit(buf[3] >> 4);
    let hum_lo = bcd_digit(buf[3] & 0x0f);
    let (hum_hi, hum_lo) = match (hum_hi, hum_lo) {
        (Some(h), Some(l)) => (h, l),
        _ => return DecodeStatus::ImplausibleValue,
    };
    let humidity = u32::from(hum_hi) * 10 + u32::from(hum_lo);
    if humidity > 99 {
        return DecodeStatus::ImplausibleValue;
    }

    let record = RecordBuilder::new()
        .string("model", "AlectoV1-Temperature")
        .int("id", i64::from(id))
        .int("channel", i64::from(channel) + 1)
        .int("battery_ok", i64::from(battery_low == 0))
        .double("temperature_C", temperature_c)
        .int("humidity", i64::from(humidity))
        .build();
    DecodeStatus::Decoded(record)
}

/// Register the Alecto V1 temperature/humidity decoder.
pub fn register(registry: &mut DecoderRegistry) {
    registry.register(Decoder {
        name: "AlectoV1-Temperature",
        modulation: Modulation::Ook,
        timing: TIMING,
        coding: Coding::Ppm,
        min_repeats: 2,
        min_bits: FRAME_BITS,
        decode,
        field_names: &["model", "id", "channel", "battery_ok", "temperature_C", "humidity"],
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
        bb.add_row();
        for &b in bits {
            bb.add_bit(b);
        }
        bb.add_row();
        for &b in bits {
            bb.add_bit(b);
        }
        bb
    }

    fn bits_from_bytes(bytes: &[u8], n_bits: usize) -> Vec<u8> {
        (0..n_bits).map(|i| (bytes[i / 8] >> (7 - (i % 8))) & 1).collect()
    }

    fn checksummed(mut bytes: [u8; 5]) -> [u8; 5] {
        let sum = (add_nibbles(&bytes[..4]) as u8).wrapping_add(TEMPERATURE_TYPE_OFFSET);
        bytes[4] = (bytes[4] & 0x0f) | ((reverse8(sum) & 0x0f) << 4);
        bytes
    }

    #[test]
    fn rejects_invalid_bcd_humidity() {
        let bytes = checksummed([0x12, 0x00, 0x00, 0xb0, 0x00]);
        let bb = row_with_bits(&bits_from_bytes(&bytes, FRAME_BITS));
        match decode(&bb) {
            DecodeStatus::ImplausibleValue => {}
            other => panic!("expected ImplausibleValue, got {other:?}"),
        }
    }

    #[test]
    fn decodes_plausible_reading() {
        let bytes = checksummed([0x12u8, 0x20, 0x34, 0x55, 0x00]);
        let bb = row_with_bits(&bits_from_bytes(&bytes, FRAME_BITS));
        match decode(&bb) {
            DecodeStatus::Decoded(r) => {
                assert_eq!(r.get("humidity"), Some(&crate::value::Value::Int(55)));
                assert_eq!(r.get("channel"), Some(&crate::value::Value::Int(1)));
            }
            other => panic!("expected Decoded, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_checksum() {
        let mut bytes = checksummed([0x12u8, 0x20, 0x34, 0x55, 0x00]);
        bytes[4] ^= 0xf0;
        let bb = row_with_bits(&bits_from_bytes(&bytes, FRAME_BITS));
        match decode(&bb) {
            DecodeStatus::InvalidChecksum => {}
            other => panic!("expected InvalidChecksum, got {other:?}"),
        }
    }

    #[test]
    fn single_row_without_a_repeat_does_not_sync() {
        let bytes = checksummed([0x12u8, 0x20, 0x34, 0x55, 0x00]);
        let mut bb = Bitbuffer::new();
        for &b in &bits_from_bytes(&bytes, FRAME_BITS) {
            bb.add_bit(b);
        }
        assert_eq!(decode(&bb), DecodeStatus::NoSync);
    }
}
