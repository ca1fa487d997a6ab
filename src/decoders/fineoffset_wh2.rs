/*! Fineoffset WH2/WH5 temperature/humidity sensor: OOK PWM coding,
40-bit rows, CRC-8 (poly 0x31, init 0x00) over the first four bytes —
the canonical user of [`crate::bits::crc8le`] in this decoder set.
*/

use crate::bitbuffer::Bitbuffer;
use crate::bits::crc8le;
use crate::decoder::{Decoder, DecoderRegistry, DecodeStatus, Modulation};
use crate::slicer::{Coding, TimingParams};
use crate::value::RecordBuilder;

const TIMING: TimingParams = TimingParams {
    short_width: 500,
    long_width: 1500,
    sync_width: 0,
    gap_limit: 2000,
    reset_limit: 8000,
    tolerance: 250,
};

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

    if crc8le(&buf[0..4], 0x31, 0x00) != buf[4] {
        return DecodeStatus::InvalidChecksum;
    }

    let id = ((u16::from(buf[0]) & 0x0f) << 4) | (buf[1] >> 4) as u16;
    let temp_sign = (buf[1] >> 3) & 1;
    let temp_raw = (i32::from(buf[1] & 0x07) << 8) | i32::from(buf[2]);
    let temp_raw = if temp_sign != 0 { -temp_raw } else { temp_raw };
    let temperature_c = f64::from(temp_raw) / 10.0;
    let humidity = buf[3];

    if humidity > 100 {
        return DecodeStatus::ImplausibleValue;
    }

    let record = RecordBuilder::new()
        .string("model", "Fineoffset-WH2")
        .int("id", i64::from(id))
        .double("temperature_C", temperature_c)
        .int("humidity", i64::from(humidity))
        .build();
    DecodeStatus::Decoded(record)
}

/// Register the Fineoffset WH2/WH5 decoder.
pub fn register(registry: &mut DecoderRegistry) {
    registry.register(Decoder {
        name: "Fineoffset-WH2",
        modulation: Modulation::Ook,
        timing: TIMING,
        coding: Coding::Pwm,
        min_repeats: 2,
        min_bits: 40,
        decode,
        field_names: &["model", "id", "temperature_C", "humidity"],
    });
}
