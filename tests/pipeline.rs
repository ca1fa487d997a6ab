//! End-to-end tests driving the full `Graph` (pulse detector -> decoder
//! dispatch) against synthetic I/Q bursts built from documented protocol
//! field layouts, rather than exercising decoders directly.

use subghz_rx::block::{Block, BlockRet};
use subghz_rx::decoder::{DecoderDispatch, Modulation};
use subghz_rx::decoders;
use subghz_rx::pulse_detector::AmPulseDetector;
use subghz_rx::stream::{new_nocopy_stream, new_stream};
use subghz_rx::value::Value;
use subghz_rx::{Complex, Float};

/// Build an OOK I/Q burst from a list of (pulse_us, gap_us) pairs at
/// `sample_rate`, repeated `repeats` times with an `inter_message_gap_us`
/// silence between repeats (long enough to force a slicer row break, but
/// short enough to stay inside one burst) and a long trailing silence to
/// flush the last burst out of the detector.
fn synthesize_ook(pairs: &[(u32, u32)], sample_rate: u32, repeats: usize, inter_message_gap_us: u32) -> Vec<Complex> {
    let high = Complex::new(1.0, 0.0);
    let low = Complex::new(0.0, 0.0);
    let us_to_samples = |us: u32| ((u64::from(us) * u64::from(sample_rate)) / 1_000_000).max(1) as usize;
    let mut samples = Vec::new();
    for rep in 0..repeats {
        if rep > 0 {
            samples.extend(std::iter::repeat_n(low, us_to_samples(inter_message_gap_us)));
        }
        for &(pulse_us, gap_us) in pairs {
            samples.extend(std::iter::repeat_n(high, us_to_samples(pulse_us)));
            samples.extend(std::iter::repeat_n(low, us_to_samples(gap_us)));
        }
    }
    samples.extend(std::iter::repeat_n(low, us_to_samples(50_000)));
    samples
}

fn run_pipeline(samples: Vec<Complex>, sample_rate: u32, threshold: Float, reset_limit_us: u32) -> Vec<subghz_rx::value::Record> {
    let (sample_w, sample_r) = new_stream::<Complex>();
    let (burst_w, burst_r) = new_nocopy_stream();
    let (record_w, record_r) = new_nocopy_stream();

    sample_w.write(samples);
    sample_w.close();

    let mut detector = AmPulseDetector::new(sample_r, burst_w, sample_rate, threshold, reset_limit_us);
    let mut dispatch = DecoderDispatch::new(burst_r, record_w, decoders::all(), Modulation::Ook);

    loop {
        let det_done = matches!(detector.work().unwrap(), BlockRet::Eof);
        let disp_done = matches!(dispatch.work().unwrap(), BlockRet::Eof);
        if det_done && disp_done {
            break;
        }
    }
    let mut out = Vec::new();
    while let Some(r) = record_r.pop() {
        out.push(r);
    }
    out
}

#[test]
fn x10_security_burst_decodes_through_full_pipeline() {
    // X10-Security: id=0x2C/!id, event nibble 0b010 (contact_closed)/!event,
    // PPM-coded: short gap (560us) = 0, long gap (1680us) = 1.
    let id = 0x2Cu8;
    let not_id = !id;
    let event = 0b010u8 << 5;
    let not_event = !event;

    let bytes = [id, not_id, event, not_event];
    let mut pairs = Vec::new();
    for byte in bytes {
        for i in (0..8).rev() {
            let bit = (byte >> i) & 1;
            let gap = if bit == 1 { 1680 } else { 560 };
            pairs.push((560, gap));
        }
    }

    let samples = synthesize_ook(&pairs, 100_000, 3, 4000);
    let records = run_pipeline(samples, 100_000, 0.25, 10_000);

    let hit = records.iter().find(|r| r.get("model") == Some(&Value::Str("X10-Security".into())));
    assert!(hit.is_some(), "expected an X10-Security decode, got: {records:?}");
    assert_eq!(
        hit.unwrap().get("event"),
        Some(&Value::Str("contact_closed".into()))
    );
}

#[test]
fn noise_produces_no_decodes() {
    // Random-ish short pulses with no coherent structure should not match
    // any registered decoder.
    let mut pairs = Vec::new();
    for i in 0..40u32 {
        pairs.push((100 + (i % 7) * 37, 150 + (i % 5) * 61));
    }
    let samples = synthesize_ook(&pairs, 100_000, 1, 4000);
    let records = run_pipeline(samples, 100_000, 0.25, 10_000);
    assert!(records.is_empty(), "expected no decodes from noise, got: {records:?}");
}
