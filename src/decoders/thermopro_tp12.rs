/*! ThermoPro TP12 meat thermometer: OOK PCM coding, two independent
probe temperatures per 40-bit row, CRC-8 check byte.
*/

use crate::bitbuffer::Bitbuffer;
use crate::bits::crc8;
use crate::decoder::{Decoder, DecoderRegistry, DecodeStatus, Modulation};
use crate::slicer::{Coding, TimingParams};
use crate::value::RecordBuilder;

const TIMING: TimingParams = TimingParams {
    short_width: 240,
    long_width: 240,
    sync_width: 0,
    gap_limit: 500,
    reset_limit: 4000,
    tolerance: 80,
};

const CRC_POLY: u8 = 0x31;
const CRC_INIT: u8 = 0x00;

fn probe_temp_c(raw: u16) -> Option<f64> {
    if raw == 0x7fff {
        None
    } else {
        Some(f64::from(raw) / 10.0)
    }
}

fn decode(bb: &Bitbuffer) -> DecodeStatus {
    let row = match bb.find_repeated_row(2, 40) {
        Some(r) => r,
        None => return DecodeStatus::NoSync,
    };
    if bb.row(row).len() < 40 {
        return DecodeStatus::WrongLength;
    }
    let mut buf = [0u8; 5];
    bb.extract_bytes(row, 0, &mut buf, 40);

    let checksum = crc8(&buf[0..4], CRC_POLY, CRC_INIT);
    if checksum != buf[4] {
        return DecodeStatus::InvalidChecksum;
    }

    let id = buf[0];
    let probe1_raw = (u16::from(buf[1]) << 4) | u16::from(buf[2] >> 4);
    let probe2_raw = (u16::from(buf[2] & 0x0f) << 8) | u16::from(buf[3]);

    let mut record = RecordBuilder::new()
        .string("model", "ThermoPro-TP12")
        .int("id", i64::from(id))
        .string("mic", "CRC");
    if let Some(t1) = probe_temp_c(probe1_raw) {
        record = record.double("temperature_1_C", t1);
    }
    if let Some(t2) = probe_temp_c(probe2_raw) {
        record = record.double("temperature_2_C", t2);
    }
    DecodeStatus::Decoded(record.build())
}

/// Register the ThermoPro TP12 decoder.
pub fn register(registry: &mut DecoderRegistry) {
    registry.register(Decoder {
        name: "ThermoPro-TP12",
        modulation: Modulation::Ook,
        timing: TIMING,
        coding: Coding::Pcm,
        min_repeats: 2,
        min_bits: 40,
        decode,
        field_names: &["model", "id", "mic", "temperature_1_C", "temperature_2_C"],
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
    fn decodes_two_probes() {
        let mut bytes = [0x42u8, 0x01, 0x05, 0x00, 0x00];
        bytes[4] = crc8(&bytes[0..4], CRC_POLY, CRC_INIT);
        let bb = row_with_bits(&bits_from_bytes(&bytes, 40));
        match decode(&bb) {
            DecodeStatus::Decoded(r) => {
                assert!(r.get("temperature_1_C").is_some());
                assert_eq!(r.get("mic"), Some(&crate::value::Value::Str("CRC".into())));
            }
            other => panic!("expected Decoded, got {other:?}"),
        }
    }
}
