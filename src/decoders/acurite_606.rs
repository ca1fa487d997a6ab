/*! Acurite 606TX temperature sensor: OOK PWM coding, 24-bit rows, plain
byte-sum checksum — the simplest decoder in this set, useful as a
minimal-MIC reference alongside the CRC/LFSR-checked families.
*/

use crate::bitbuffer::Bitbuffer;
use crate::bits::add_bytes;
use crate::decoder::{Decoder, DecoderRegistry, DecodeStatus, Modulation};
use crate::slicer::{Coding, TimingParams};
use crate::value::RecordBuilder;

const TIMING: TimingParams = TimingParams {
    short_width: 200,
    long_width: 400,
    sync_width: 0,
    gap_limit: 600,
    reset_limit: 8000,
    tolerance: 100,
};

fn decode(bb: &Bitbuffer) -> DecodeStatus {
    let row = match bb.find_repeated_row(3, 24) {
        Some(r) => r,
        None => return DecodeStatus::NoSync,
    };
    if bb.row(row).len() < 24 {
        return DecodeStatus::WrongLength;
    }
    let mut buf = [0u8; 3];
    bb.extract_bytes(row, 0, &mut buf, 24);

    let checksum = add_bytes(&buf[0..2]) as u8;
    if checksum != buf[2] {
        return DecodeStatus::InvalidChecksum;
    }

    let id = buf[0];
    let temp_raw = i32::from(buf[1] & 0x7f) - 40;

    let record = RecordBuilder::new()
        .string("model", "Acurite-606TX")
        .int("id", i64::from(id))
        .double("temperature_C", f64::from(temp_raw))
        .build();
    DecodeStatus::Decoded(record)
}

/// Register the Acurite 606TX decoder.
pub fn register(registry: &mut DecoderRegistry) {
    registry.register(Decoder {
        name: "Acurite-606TX",
        modulation: Modulation::Ook,
        timing: TIMING,
        coding: Coding::Pwm,
        min_repeats: 3,
        min_bits: 24,
        decode,
        field_names: &["model", "id", "temperature_C"],
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
    fn decodes_valid_reading() {
        let mut bytes = [0x5Au8, 40 + 40, 0x00];
        bytes[2] = add_bytes(&bytes[0..2]) as u8;
        let bb = row_with_bits(&bits_from_bytes(&bytes, 24));
        match decode(&bb) {
            DecodeStatus::Decoded(r) => {
                assert_eq!(r.get("temperature_C"), Some(&crate::value::Value::Double(40.0)));
            }
            other => panic!("expected Decoded, got {other:?}"),
        }
    }
}
