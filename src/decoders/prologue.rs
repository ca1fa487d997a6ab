/*! Prologue/Nexus-family temperature/humidity sensors: OOK PPM coding,
36-bit rows, no checksum — structural validity (row length, plausible
field ranges) is the only check available for this family.
*/

use crate::bitbuffer::Bitbuffer;
use crate::decoder::{Decoder, DecoderRegistry, DecodeStatus, Modulation};
use crate::slicer::{Coding, TimingParams};
use crate::value::RecordBuilder;

const TIMING: TimingParams = TimingParams {
    short_width: 2000,
    long_width: 4000,
    sync_width: 8400,
    gap_limit: 6000,
    reset_limit: 10_000,
    tolerance: 400,
};

fn decode(bb: &Bitbuffer) -> DecodeStatus {
    let row = match bb.find_repeated_row(3, 36) {
        Some(r) => r,
        None => return DecodeStatus::NoSync,
    };
    if bb.row(row).len() < 36 {
        return DecodeStatus::WrongLength;
    }
    let mut buf = [0u8; 5];
    bb.extract_bytes(row, 0, &mut buf, 36);

    let id = buf[0];
    let battery_low = (buf[1] >> 6) & 1;
    let channel = (buf[1] >> 4) & 0x3;
    let temp_sign = (buf[1] >> 3) & 1;
    let temp_raw = (i32::from(buf[1] & 0x07) << 8) | i32::from(buf[2]);
    let temp_raw = if temp_sign != 0 { temp_raw - 0x800 } else { temp_raw };
    let temperature_c = f64::from(temp_raw) / 10.0;
    let humidity = buf[3] & 0x7f;

    if !(-40.0..=60.0).contains(&temperature_c) {
        return DecodeStatus::ImplausibleValue;
    }
    if humidity > 99 {
        return DecodeStatus::ImplausibleValue;
    }

    let record = RecordBuilder::new()
        .string("model", "Prologue-TH")
        .int("id", i64::from(id))
        .int("channel", i64::from(channel) + 1)
        .int("battery_ok", i64::from(battery_low == 0))
        .double("temperature_C", temperature_c)
        .int("humidity", i64::from(humidity))
        .build();
    DecodeStatus::Decoded(record)
}

/// Register the Prologue/Nexus temperature/humidity decoder.
pub fn register(registry: &mut DecoderRegistry) {
    registry.register(Decoder {
        name: "Prologue-TH",
        modulation: Modulation::Ook,
        timing: TIMING,
        coding: Coding::Ppm,
        min_repeats: 3,
        min_bits: 36,
        decode,
        field_names: &["model", "id", "channel", "battery_ok", "temperature_C", "humidity"],
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with_bits(bits: &[u8]) -> Bitbuffer {
        let mut bb = Bitbuffer::new();
        for _ in 0..3 {
            for &b in bits {
                bb.add_bit(b);
            }
            bb.add_row();
        }
        bb
    }

    fn bits_from_bytes(bytes: &[u8], n_bits: usize) -> Vec<u8> {
        (0..n_bits).map(|i| (bytes[i / 8] >> (7 - (i % 8))) & 1).collect()
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let bytes = [0x01u8, 0x7f, 0xff, 0x63, 0x00];
        let bb = row_with_bits(&bits_from_bytes(&bytes, 36));
        match decode(&bb) {
            DecodeStatus::ImplausibleValue => {}
            other => panic!("expected ImplausibleValue, got {other:?}"),
        }
    }

    #[test]
    fn decodes_plausible_reading() {
        let bytes = [0x01u8, 0x00, 0xc8, 0x45, 0x00];
        let bb = row_with_bits(&bits_from_bytes(&bytes, 36));
        match decode(&bb) {
            DecodeStatus::Decoded(r) => {
                assert_eq!(r.get("humidity"), Some(&crate::value::Value::Int(0x45)));
            }
            other => panic!("expected Decoded, got {other:?}"),
        }
    }
}
