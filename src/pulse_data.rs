/*! In-memory representation of one detected burst: an alternating
sequence of pulse and gap widths, plus the RF metadata the
[`crate::pulse_detector`] measured while capturing it.

A `PulseBurst` is produced once by the pulse detector, handed to the
decoder dispatch loop, and then discarded: nothing downstream mutates
it, and no decoder sees another decoder's view of it — each decoder
gets its own immutable borrow, read-only for the lifetime of the dispatch
call.
*/

/// Pulse/gap pairs longer than this in one burst almost certainly mean
/// the detector lost its reset-gap threshold; stop accepting more.
pub const MAX_PULSES: usize = 1024;

/// One captured transmission: alternating pulse/gap widths in
/// microseconds, plus the RF conditions under which it was captured.
#[derive(Clone, Debug, Default)]
pub struct PulseBurst {
    /// Pulse (high) widths, in microseconds. `pulse[i]` is always
    /// immediately followed by `gap[i]`.
    pub pulse: Vec<u32>,
    /// Gap (low) widths, in microseconds.
    pub gap: Vec<u32>,

    /// Estimated mark-frequency offset from center, Hz (FSK) or the only
    /// meaningful offset for OOK.
    pub freq1_hz: f32,
    /// Estimated space-frequency offset from center, Hz (FSK only).
    pub freq2_hz: f32,
    /// Received signal strength, dB relative to full scale.
    pub rssi_db: f32,
    /// Estimated noise floor, dB relative to full scale.
    pub noise_db: f32,
    /// Signal-to-noise ratio, dB (`rssi_db - noise_db`).
    pub snr_db: f32,
    /// Smoothed OOK envelope low (space) estimate at burst end.
    pub ook_low_estimate: f32,
    /// Smoothed OOK envelope high (mark) estimate at burst end.
    pub ook_high_estimate: f32,
    /// Sample rate, Hz, in effect while this burst was captured.
    pub sample_rate: u32,
}

impl PulseBurst {
    /// Number of pulse/gap pairs in this burst.
    #[must_use]
    pub fn num_pulses(&self) -> usize {
        self.pulse.len()
    }

    /// True if `pulse` and `gap` have matching, non-overflowing length
    /// and every pulse has a paired gap, per the burst invariant.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.pulse.len() == self.gap.len() && self.pulse.len() <= MAX_PULSES
    }
}

/// Incrementally builds a [`PulseBurst`], used by [`crate::pulse_detector`].
#[derive(Default)]
pub struct PulseBurstBuilder {
    burst: PulseBurst,
    overflowed: bool,
}

impl PulseBurstBuilder {
    /// Start a new, empty burst builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one pulse width. Silently dropped past [`MAX_PULSES`].
    pub fn push_pulse(&mut self, width_us: u32) {
        if self.burst.pulse.len() >= MAX_PULSES {
            self.overflowed = true;
            return;
        }
        self.burst.pulse.push(width_us);
    }

    /// Record the gap width following the most recently pushed pulse.
    pub fn push_gap(&mut self, width_us: u32) {
        if self.burst.gap.len() >= self.burst.pulse.len() {
            // No matching pulse yet to pair this gap with; drop it,
            // mirroring the "a burst always begins with a pulse" invariant.
            return;
        }
        self.burst.gap.push(width_us);
    }

    /// True once [`MAX_PULSES`] has been reached.
    #[must_use]
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Current number of complete pulse/gap pairs recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.burst.gap.len()
    }

    /// True if no complete pulse/gap pairs have been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finish the burst, attaching the given RF metadata.
    #[must_use]
    pub fn finish(mut self, meta: BurstMeta) -> PulseBurst {
        // Drop a trailing, unpaired pulse: the burst ended mid-pulse.
        self.burst.pulse.truncate(self.burst.gap.len());
        self.burst.freq1_hz = meta.freq1_hz;
        self.burst.freq2_hz = meta.freq2_hz;
        self.burst.rssi_db = meta.rssi_db;
        self.burst.noise_db = meta.noise_db;
        self.burst.snr_db = meta.rssi_db - meta.noise_db;
        self.burst.ook_low_estimate = meta.ook_low_estimate;
        self.burst.ook_high_estimate = meta.ook_high_estimate;
        self.burst.sample_rate = meta.sample_rate;
        self.burst
    }
}

/// RF metadata attached to a burst on completion.
#[derive(Clone, Copy, Default)]
pub struct BurstMeta {
    /// See [`PulseBurst::freq1_hz`].
    pub freq1_hz: f32,
    /// See [`PulseBurst::freq2_hz`].
    pub freq2_hz: f32,
    /// See [`PulseBurst::rssi_db`].
    pub rssi_db: f32,
    /// See [`PulseBurst::noise_db`].
    pub noise_db: f32,
    /// See [`PulseBurst::ook_low_estimate`].
    pub ook_low_estimate: f32,
    /// See [`PulseBurst::ook_high_estimate`].
    pub ook_high_estimate: f32,
    /// See [`PulseBurst::sample_rate`].
    pub sample_rate: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_pairs_pulse_and_gap() {
        let mut b = PulseBurstBuilder::new();
        b.push_pulse(100);
        b.push_gap(200);
        b.push_pulse(150);
        b.push_gap(250);
        let burst = b.finish(BurstMeta {
            rssi_db: -10.0,
            noise_db: -40.0,
            ..Default::default()
        });
        assert!(burst.is_valid());
        assert_eq!(burst.num_pulses(), 2);
        assert_eq!(burst.snr_db, 30.0);
    }

    #[test]
    fn trailing_unpaired_pulse_is_dropped() {
        let mut b = PulseBurstBuilder::new();
        b.push_pulse(100);
        b.push_gap(200);
        b.push_pulse(999); // burst ends before its gap
        let burst = b.finish(BurstMeta::default());
        assert_eq!(burst.pulse, vec![100]);
        assert_eq!(burst.gap, vec![200]);
    }

    #[test]
    fn overflow_is_tracked_not_panicked() {
        let mut b = PulseBurstBuilder::new();
        for _ in 0..(MAX_PULSES + 5) {
            b.push_pulse(10);
            b.push_gap(10);
        }
        assert!(b.overflowed());
        let burst = b.finish(BurstMeta::default());
        assert_eq!(burst.num_pulses(), MAX_PULSES);
    }
}
