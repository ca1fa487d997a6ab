/*! AM (OOK envelope) and FM (frequency-discriminator) pulse detectors:
[`crate::block::Block`]s that turn a raw sample stream into
[`crate::pulse_data::PulseBurst`]es.

Grounded on the same threshold-crossing design `rustradio`'s
`burst_tagger` uses to find a burst's start/end from a magnitude
stream, generalized here to also classify each crossing into a pulse or
gap width and hand a finished burst downstream as soon as a long enough
silence closes it.
*/

use crate::Error;
use crate::block::{Block, BlockRet};
use crate::pulse_data::{BurstMeta, PulseBurst, PulseBurstBuilder};
use crate::stream::{NCWriteStream, ReadStream};
use crate::{Complex, Float};
use log::{debug, trace, warn};

/// A single-pole IIR low-pass, used to track the OOK noise floor the
/// way `rustradio`'s `single_pole_iir_filter` smooths a control signal.
struct SinglePoleIir {
    alpha: Float,
    state: Float,
    initialized: bool,
}

impl SinglePoleIir {
    fn new(alpha: Float) -> Self {
        Self {
            alpha,
            state: 0.0,
            initialized: false,
        }
    }

    fn process(&mut self, sample: Float) -> Float {
        if !self.initialized {
            self.state = sample;
            self.initialized = true;
        } else {
            self.state += self.alpha * (sample - self.state);
        }
        self.state
    }
}

/// Internal edge-tracking state machine, separated from the [`Block`]
/// glue so it can be driven identically by both modulations once the
/// input has been reduced to a single `Float` level per sample.
struct EdgeTracker {
    sample_rate: u32,
    above: bool,
    run_samples: u32,
    builder: PulseBurstBuilder,
    noise_floor: SinglePoleIir,
    signal_level: SinglePoleIir,
    high_estimate: Float,
    low_estimate: Float,
    reset_limit_samples: u32,
    have_burst: bool,
}

impl EdgeTracker {
    fn new(sample_rate: u32, reset_limit_us: u32) -> Self {
        Self {
            sample_rate,
            above: false,
            run_samples: 0,
            builder: PulseBurstBuilder::new(),
            noise_floor: SinglePoleIir::new(0.01),
            signal_level: SinglePoleIir::new(0.1),
            high_estimate: 0.0,
            low_estimate: 0.0,
            reset_limit_samples: us_to_samples(reset_limit_us, sample_rate),
            have_burst: false,
        }
    }

    fn samples_to_us(&self, samples: u32) -> u32 {
        ((u64::from(samples) * 1_000_000) / u64::from(self.sample_rate.max(1))) as u32
    }

    /// Feed one level sample (already above/below the detector's own
    /// threshold decision). Returns a finished burst if this sample's
    /// gap just closed one out.
    fn feed(&mut self, level: Float, threshold: Float, rssi_db: Float, noise_db: Float) -> Option<PulseBurst> {
        self.noise_floor.process(if level < threshold { level } else { self.noise_floor.state });
        self.signal_level.process(if level >= threshold { level } else { self.signal_level.state });
        let now_above = level >= threshold;

        if now_above == self.above {
            self.run_samples += 1;
            if !self.above && self.run_samples >= self.reset_limit_samples && self.have_burst {
                let gap_us = self.samples_to_us(self.run_samples);
                self.builder.push_gap(gap_us);
                if self.builder.overflowed() {
                    warn!("pulse_detector: burst overflowed its pulse capacity, closing early");
                }
                let meta = BurstMeta {
                    rssi_db,
                    noise_db,
                    ook_low_estimate: self.low_estimate,
                    ook_high_estimate: self.high_estimate,
                    sample_rate: self.sample_rate,
                    ..Default::default()
                };
                let finished = std::mem::take(&mut self.builder).finish(meta);
                self.have_burst = false;
                self.run_samples = 0;
                if finished.num_pulses() > 0 {
                    debug!("pulse_detector: burst closed, {} pulses", finished.num_pulses());
                    return Some(finished);
                }
            }
            return None;
        }

        // Edge: commit the run we were accumulating.
        let width_us = self.samples_to_us(self.run_samples);
        if self.above {
            self.builder.push_pulse(width_us);
            self.have_burst = true;
            self.high_estimate = self.signal_level.state;
        } else if self.have_burst {
            self.builder.push_gap(width_us);
        }
        self.low_estimate = self.noise_floor.state;
        trace!("pulse_detector: edge at {width_us}us, now_above={now_above}");
        self.above = now_above;
        self.run_samples = 1;
        None
    }
}

fn us_to_samples(us: u32, sample_rate: u32) -> u32 {
    ((u64::from(us) * u64::from(sample_rate)) / 1_000_000).max(1) as u32
}

/// OOK/AM pulse detector: reads a complex sample stream, tracks its
/// envelope magnitude, and emits a burst each time a long gap closes it.
pub struct AmPulseDetector {
    src: ReadStream<Complex>,
    dst: NCWriteStream<PulseBurst>,
    tracker: EdgeTracker,
    threshold: Float,
}

impl AmPulseDetector {
    /// Construct an AM detector. `threshold` is a fixed envelope-
    /// magnitude-squared level; `reset_limit_us` is the gap width beyond
    /// which a burst is considered complete.
    #[must_use]
    pub fn new(
        src: ReadStream<Complex>,
        dst: NCWriteStream<PulseBurst>,
        sample_rate: u32,
        threshold: Float,
        reset_limit_us: u32,
    ) -> Self {
        Self {
            src,
            dst,
            tracker: EdgeTracker::new(sample_rate, reset_limit_us),
            threshold,
        }
    }
}

impl Block for AmPulseDetector {
    fn block_name(&self) -> &str {
        "AmPulseDetector"
    }

    fn work(&mut self) -> Result<BlockRet, Error> {
        let samples = self.src.drain(4096);
        if samples.is_empty() {
            if self.src.eof() {
                self.dst.close();
                return Ok(BlockRet::Eof);
            }
            return Ok(BlockRet::Noop);
        }
        for s in samples {
            let mag2 = s.norm_sqr();
            let rssi_db = 10.0 * (mag2.max(1e-12)).log10();
            let noise_db = 10.0 * (self.tracker.noise_floor.state.max(1e-12)).log10();
            if let Some(burst) = self.tracker.feed(mag2, self.threshold, rssi_db, noise_db) {
                self.dst.push(burst);
            }
        }
        Ok(BlockRet::Ok)
    }
}

/// FSK/FM pulse detector: reads a stream of instantaneous-frequency
/// samples (produced upstream by a discriminator) and classifies
/// above/below a center frequency the same way the AM detector
/// classifies above/below an envelope threshold.
pub struct FmPulseDetector {
    src: ReadStream<Float>,
    dst: NCWriteStream<PulseBurst>,
    tracker: EdgeTracker,
    center_hz: Float,
}

impl FmPulseDetector {
    /// Construct an FM detector. `center_hz` splits mark/space; samples
    /// above it count as "pulse" (mark).
    #[must_use]
    pub fn new(
        src: ReadStream<Float>,
        dst: NCWriteStream<PulseBurst>,
        sample_rate: u32,
        center_hz: Float,
        reset_limit_us: u32,
    ) -> Self {
        Self {
            src,
            dst,
            tracker: EdgeTracker::new(sample_rate, reset_limit_us),
            center_hz,
        }
    }
}

impl Block for FmPulseDetector {
    fn block_name(&self) -> &str {
        "FmPulseDetector"
    }

    fn work(&mut self) -> Result<BlockRet, Error> {
        let samples = self.src.drain(4096);
        if samples.is_empty() {
            if self.src.eof() {
                self.dst.close();
                return Ok(BlockRet::Eof);
            }
            return Ok(BlockRet::Noop);
        }
        for f in samples {
            if let Some(burst) = self.tracker.feed(f, self.center_hz, f64::from(f) as Float, 0.0) {
                self.dst.push(burst);
            }
        }
        Ok(BlockRet::Ok)
    }
}
