/*! Generic Schrader-style TPMS (tire-pressure monitoring) sensor: FSK
NRZS/PIWM coding, 64-bit rows, CRC-8 (poly 0x07, init 0x00) — the one
decoder in this set exercising the NRZS slicer and reporting pressure
in kPa alongside temperature.
*/

use crate::bitbuffer::Bitbuffer;
use crate::bits::crc8;
use crate::decoder::{Decoder, DecoderRegistry, DecodeStatus, Modulation};
use crate::slicer::{Coding, TimingParams};
use crate::value::RecordBuilder;

const TIMING: TimingParams = TimingParams {
    short_width: 120,
    long_width: 120,
    sync_width: 0,
    gap_limit: 300,
    reset_limit: 4000,
    tolerance: 50,
};

fn decode(bb: &Bitbuffer) -> DecodeStatus {
    let row = match bb.find_repeated_row(1, 64) {
        Some(r) => r,
        None => return DecodeStatus::NoSync,
    };
    if bb.row(row).len() < 64 {
        return DecodeStatus::WrongLength;
    }
    let mut buf = [0u8; 8];
    bb.extract_bytes(row, 0, &mut buf, 64);

    if crc8(&buf[0..7], 0x07, 0x00) != buf[7] {
        return DecodeStatus::InvalidChecksum;
    }

    let id = (u32::from(buf[0]) << 16) | (u32::from(buf[1]) << 8) | u32::from(buf[2]);
    let pressure_kpa = f64::from(buf[3]) * 2.5;
    let temperature_c = f64::from(buf[4]) - 50.0;

    if pressure_kpa > 500.0 {
        return DecodeStatus::ImplausibleValue;
    }

    let record = RecordBuilder::new()
        .string("model", "TPMS-Schrader")
        .string("id", format!("{id:06x}"))
        .double("pressure_kPa", pressure_kpa)
        .double("temperature_C", temperature_c)
        .build();
    DecodeStatus::Decoded(record)
}

/// Register the generic Schrader-style TPMS decoder.
pub fn register(registry: &mut DecoderRegistry) {
    registry.register(Decoder {
        name: "TPMS-Schrader",
        modulation: Modulation::Fsk,
        timing: TIMING,
        coding: Coding::Nrzs,
        min_repeats: 1,
        min_bits: 64,
        decode,
        field_names: &["model", "id", "pressure_kPa", "temperature_C"],
    });
}
