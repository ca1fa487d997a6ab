/*! Watts Industries WFHT-RF wireless thermostat: OOK PCM coding, 54-bit
rows, nibble-sum checksum across the payload, reporting the currently
set and measured temperatures plus a pairing-mode flag. The id is sent
byte-reflected (each byte's bits in reverse order).
*/

use crate::bitbuffer::Bitbuffer;
use crate::bits::{add_nibbles, reverse8};
use crate::decoder::{Decoder, DecoderRegistry, DecodeStatus, Modulation};
use crate::slicer::{Coding, TimingParams};
use crate::value::RecordBuilder;

const TIMING: TimingParams = TimingParams {
    short_width: 400,
    long_width: 400,
    sync_width: 0,
    gap_limit: 1000,
    reset_limit: 8000,
    tolerance: 150,
};

const FRAME_BITS: usize = 54;

fn decode(bb: &Bitbuffer) -> DecodeStatus {
    let row = match bb.find_repeated_row(2, FRAME_BITS) {
        Some(r) => r,
        None => return DecodeStatus::NoSync,
    };
    if bb.row(row).len() < FRAME_BITS {
        return DecodeStatus::WrongLength;
    }
    let mut buf = [0u8; 7];
    bb.extract_bytes(row, 0, &mut buf, FRAME_BITS);

    let checksum = (add_nibbles(&buf[0..6]) & 0x0f) as u8;
    if checksum != (buf[6] >> 4) {
        return DecodeStatus::InvalidChecksum;
    }

    let id = (u32::from(reverse8(buf[0])) << 16) | (u32::from(reverse8(buf[1])) << 8) | u32::from(reverse8(buf[2]));
    let setpoint_c = f64::from(buf[3]) / 10.0;
    let measured_raw = (u16::from(buf[4]) << 1) | u16::from(buf[5] >> 7);
    let measured_c = f64::from(measured_raw) / 10.0;
    let pairing = (buf[5] >> 6) & 1;

    if !(0.0..=60.0).contains(&setpoint_c) || !(0.0..=60.0).contains(&measured_c) {
        return DecodeStatus::ImplausibleValue;
    }

    let record = RecordBuilder::new()
        .string("model", "Watts-WFHTRF")
        .int("id", i64::from(id))
        .double("setpoint_C", setpoint_c)
        .double("temperature_C", measured_c)
        .int("pairing", i64::from(pairing))
        .build();
    DecodeStatus::Decoded(record)
}

/// Register the Watts WFHT-RF thermostat decoder.
pub fn register(registry: &mut DecoderRegistry) {
    registry.register(Decoder {
        name: "Watts-WFHTRF",
        modulation: Modulation::Ook,
        timing: TIMING,
        coding: Coding::Pcm,
        min_repeats: 2,
        min_bits: FRAME_BITS,
        decode,
        field_names: &["model", "id", "setpoint_C", "temperature_C", "pairing"],
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
    fn decodes_valid_thermostat_reading() {
        // id = 0x010203, setpoint = 26.5C (raw 265 needs measured field; here
        // use setpoint raw 48 -> 4.8C), measured raw 265 -> 26.5C, pairing=1.
        let mut bytes = [
            reverse8(0x01),
            reverse8(0x02),
            reverse8(0x03),
            48,
            (265u16 >> 1) as u8,
            (((265u16 & 1) as u8) << 7) | (1 << 6),
            0x00,
        ];
        bytes[6] = ((add_nibbles(&bytes[0..6]) & 0x0f) as u8) << 4;
        let bb = row_with_bits(&bits_from_bytes(&bytes, FRAME_BITS));
        match decode(&bb) {
            DecodeStatus::Decoded(r) => {
                assert_eq!(r.get("pairing"), Some(&crate::value::Value::Int(1)));
                assert_eq!(r.get("setpoint_C"), Some(&crate::value::Value::Double(4.8)));
                assert_eq!(r.get("temperature_C"), Some(&crate::value::Value::Double(26.5)));
            }
            other => panic!("expected Decoded, got {other:?}"),
        }
    }
}
