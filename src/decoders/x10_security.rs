/*! X10 Security remote/sensor: OOK PPM coding, the simplest framing in
this set — a fixed 8-bit address complemented by its own inverse, no
separate checksum field, just "does the second nibble pair equal the
bitwise complement of the first."
*/

use crate::bitbuffer::Bitbuffer;
use crate::decoder::{Decoder, DecoderRegistry, DecodeStatus, Modulation};
use crate::slicer::{Coding, TimingParams};
use crate::value::RecordBuilder;

const TIMING: TimingParams = TimingParams {
    short_width: 560,
    long_width: 1680,
    sync_width: 0,
    gap_limit: 3000,
    reset_limit: 10_000,
    tolerance: 300,
};

const EVENTS: [&str; 4] = ["motion", "contact_open", "contact_closed", "panic"];

fn decode(bb: &Bitbuffer) -> DecodeStatus {
    let row = match bb.find_repeated_row(2, 32) {
        Some(r) => r,
        None => return DecodeStatus::NoSync,
    };
    if bb.row(row).len() < 32 {
        return DecodeStatus::WrongLength;
    }
    let mut buf = [0u8; 4];
    bb.extract_bytes(row, 0, &mut buf, 32);

    if buf[1] != !buf[0] {
        return DecodeStatus::InvalidChecksum;
    }
    if buf[3] != !buf[2] {
        return DecodeStatus::InvalidChecksum;
    }

    let id = buf[0];
    let event_code = (buf[2] >> 5) & 0x03;

    let record = RecordBuilder::new()
        .string("model", "X10-Security")
        .int("id", i64::from(id))
        .string("event", EVENTS[event_code as usize])
        .build();
    DecodeStatus::Decoded(record)
}

/// Register the X10 Security decoder.
pub fn register(registry: &mut DecoderRegistry) {
    registry.register(Decoder {
        name: "X10-Security",
        modulation: Modulation::Ook,
        timing: TIMING,
        coding: Coding::Ppm,
        min_repeats: 2,
        min_bits: 32,
        decode,
        field_names: &["model", "id", "event"],
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
        bb
    }

    fn bits_from_bytes(bytes: &[u8], n_bits: usize) -> Vec<u8> {
        (0..n_bits).map(|i| (bytes[i / 8] >> (7 - (i % 8))) & 1).collect()
    }

    #[test]
    fn decodes_valid_complement_pair() {
        let id = 0x2Cu8;
        let event = 0b010u8 << 5;
        let bytes = [id, !id, event, !event];
        let bb = row_with_bits(&bits_from_bytes(&bytes, 32));
        match decode(&bb) {
            DecodeStatus::Decoded(r) => {
                assert_eq!(r.get("event"), Some(&crate::value::Value::Str("contact_closed".into())));
            }
            other => panic!("expected Decoded, got {other:?}"),
        }
    }

    #[test]
    fn rejects_mismatched_complement() {
        let bytes = [0x2Cu8, 0x00, 0x00, 0xff];
        let bb = row_with_bits(&bits_from_bytes(&bytes, 32));
        assert_eq!(decode(&bb), DecodeStatus::InvalidChecksum);
    }
}
