/*! Efergy e2 Classic energy monitor: FSK Manchester coding, fixed
preamble, 8-byte payload with an additive checksum. The clamp current
sensor reports raw ADC counts plus a per-packet exponent; actual amps
is `raw / 2^exponent / 100` (the device's fixed-point current scale).
*/

use crate::bitbuffer::Bitbuffer;
use crate::bits::add_bytes;
use crate::decoder::{Decoder, DecoderRegistry, DecodeStatus, Modulation};
use crate::slicer::{Coding, TimingParams};
use crate::value::RecordBuilder;

const TIMING: TimingParams = TimingParams {
    short_width: 500,
    long_width: 500,
    sync_width: 0,
    gap_limit: 1000,
    reset_limit: 5000,
    tolerance: 160,
};

/// Seconds between samples; fixed by the device, not carried in the packet.
const SAMPLE_INTERVAL_S: i64 = 6;

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

    let checksum = add_bytes(&buf[0..7]) as u8;
    if checksum != buf[7] {
        return DecodeStatus::InvalidChecksum;
    }

    let id = (u16::from(buf[0]) << 8) | u16::from(buf[1]);
    let battery_low = (buf[2] >> 7) & 1;
    let current_raw = (u32::from(buf[5]) << 8) | u32::from(buf[6]);
    let exponent = (buf[4] & 0x0f).min(15);
    let divisor = f64::from(1u32 << exponent) * 100.0;
    let current_a = f64::from(current_raw) / divisor;

    if current_a > 300.0 {
        return DecodeStatus::ImplausibleValue;
    }

    let record = RecordBuilder::new()
        .string("model", "Efergy-e2CT")
        .int("id", i64::from(id))
        .double("current", current_a)
        .int("interval", SAMPLE_INTERVAL_S)
        .int("battery_ok", i64::from(battery_low == 0))
        .build();
    DecodeStatus::Decoded(record)
}

/// Register the Efergy e2 Classic decoder.
pub fn register(registry: &mut DecoderRegistry) {
    registry.register(Decoder {
        name: "Efergy-e2CT",
        modulation: Modulation::Fsk,
        timing: TIMING,
        coding: Coding::ManchesterZerobit,
        min_repeats: 1,
        min_bits: 64,
        decode,
        field_names: &["model", "id", "current", "interval", "battery_ok"],
    });
}
