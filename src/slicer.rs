/*! Pulse-to-bit slicers: pure functions turning a [`crate::pulse_data::PulseBurst`]
into a [`crate::bitbuffer::Bitbuffer`], one per coding scheme.

Every slicer here is a pure function of `(burst, timing)`: no shared
state, no side effects, so the same burst sliced twice by the same
timing parameters always produces the same bits. A [`crate::decoder::Decoder`]
picks its slicer via [`Coding`] and its own [`TimingParams`].
*/

use crate::bitbuffer::Bitbuffer;
use crate::pulse_data::PulseBurst;

/// Timing parameters a decoder supplies to its slicer, in microseconds.
#[derive(Clone, Copy, Debug)]
pub struct TimingParams {
    /// Nominal short pulse/gap/cell width.
    pub short_width: u32,
    /// Nominal long pulse/gap width (unused by some codings).
    pub long_width: u32,
    /// Nominal sync pulse width, if the coding has one (0 if not).
    pub sync_width: u32,
    /// Gap width beyond which a row break is signalled.
    pub gap_limit: u32,
    /// Gap width beyond which the burst is considered over.
    pub reset_limit: u32,
    /// Maximum absolute distance (µs) from the nearer of `short_width`/
    /// `long_width` before a pulse/gap is ambiguous and closes the row.
    pub tolerance: u32,
}

/// Which pulse-to-bit coding scheme a decoder uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coding {
    /// Fixed-width cells: pulse = 1, gap = 0, multi-cell runs expanded.
    Pcm,
    /// Pulse Position Modulation: gap width encodes the bit.
    Ppm,
    /// Pulse Width Modulation: pulse width encodes the bit.
    Pwm,
    /// Differential Manchester with an implicit leading zero start bit.
    ManchesterZerobit,
    /// Differential Manchester Coding: transition presence encodes the bit.
    Dmc,
    /// Non-return-to-zero space, as used by a handful of remote-control
    /// and TPMS families.
    Nrzs,
    /// Pulse-interval width modulation, the "sister" coding of NRZS
    /// handled by decoders that configure the `Nrzs` slicer in PIWM mode.
    Piwm,
}

/// Classify a pulse/gap width against `short`/`long`: nearest of the two
/// wins, ties-at-tolerance are ambiguous.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Classified {
    Short,
    Long,
    Ambiguous,
}

fn classify(width: u32, short: u32, long: u32, tolerance: u32) -> Classified {
    let d_short = width.abs_diff(short);
    let d_long = width.abs_diff(long);
    let nearer = if d_short <= d_long {
        (Classified::Short, d_short)
    } else {
        (Classified::Long, d_long)
    };
    if nearer.1 > tolerance {
        Classified::Ambiguous
    } else {
        nearer.0
    }
}

/// PCM: each `short_width`-sized cell of a pulse is a `1` bit, each cell
/// of a gap is a `0` bit. A pulse/gap wider than one cell expands to
/// several bits of the same value.
#[must_use]
pub fn slice_pcm(burst: &PulseBurst, t: &TimingParams) -> Bitbuffer {
    let mut bb = Bitbuffer::new();
    let cell = t.short_width.max(1);
    for i in 0..burst.num_pulses() {
        let pulse_cells = (burst.pulse[i] + cell / 2) / cell;
        for _ in 0..pulse_cells.max(1) {
            bb.add_bit(1);
        }
        if burst.gap[i] > t.reset_limit {
            break;
        }
        let gap_cells = (burst.gap[i] + cell / 2) / cell;
        for _ in 0..gap_cells.max(1) {
            bb.add_bit(0);
        }
    }
    bb
}

/// PPM: the gap following a pulse encodes the bit — short gap is `0`,
/// long gap is `1`. A gap beyond `gap_limit` closes the row; beyond
/// `reset_limit` ends the burst.
#[must_use]
pub fn slice_ppm(burst: &PulseBurst, t: &TimingParams) -> Bitbuffer {
    let mut bb = Bitbuffer::new();
    for i in 0..burst.num_pulses() {
        if burst.gap[i] > t.reset_limit {
            bb.add_row();
            break;
        }
        if burst.gap[i] > t.gap_limit {
            bb.add_row();
            continue;
        }
        match classify(burst.gap[i], t.short_width, t.long_width, t.tolerance) {
            Classified::Short => bb.add_bit(0),
            Classified::Long => bb.add_bit(1),
            Classified::Ambiguous => bb.add_row(),
        }
    }
    bb
}

/// PWM: the pulse width encodes the bit — short pulse is `1`, long
/// pulse is `0`. A pulse matching `sync_width` (if configured) is
/// skipped rather than emitting a bit.
#[must_use]
pub fn slice_pwm(burst: &PulseBurst, t: &TimingParams) -> Bitbuffer {
    let mut bb = Bitbuffer::new();
    for i in 0..burst.num_pulses() {
        if t.sync_width > 0 && burst.pulse[i].abs_diff(t.sync_width) <= t.tolerance {
            // Sync pulse: ignored, but its gap may still end the burst.
        } else {
            match classify(burst.pulse[i], t.short_width, t.long_width, t.tolerance) {
                Classified::Short => bb.add_bit(1),
                Classified::Long => bb.add_bit(0),
                Classified::Ambiguous => bb.add_row(),
            }
        }
        if burst.gap[i] > t.reset_limit {
            bb.add_row();
            break;
        }
        if burst.gap[i] > t.gap_limit {
            bb.add_row();
        }
    }
    bb
}

/// Build the raw chip stream (one bit per cell) used by the two
/// Manchester-family slicers: a pulse or gap of width `w` contributes
/// `round(w / half_bit)` chips of the corresponding level.
fn chip_stream(burst: &PulseBurst, half_bit: u32, reset_limit: u32) -> Vec<u8> {
    let half = half_bit.max(1);
    let mut chips = Vec::new();
    for i in 0..burst.num_pulses() {
        let n = ((burst.pulse[i] + half / 2) / half).max(1);
        chips.extend(std::iter::repeat_n(1u8, n as usize));
        if burst.gap[i] > reset_limit {
            break;
        }
        let n = ((burst.gap[i] + half / 2) / half).max(1);
        chips.extend(std::iter::repeat_n(0u8, n as usize));
    }
    chips
}

/// Differential Manchester with an implicit leading zero start bit: a
/// transition mid-cell represents `0`, no transition represents `1`.
#[must_use]
pub fn slice_manchester_zerobit(burst: &PulseBurst, t: &TimingParams) -> Bitbuffer {
    let chips = chip_stream(burst, t.short_width, t.reset_limit);
    let mut bb = Bitbuffer::new();
    bb.add_bit(0); // implicit leading zero start bit
    let mut i = 0;
    while i + 1 < chips.len() {
        let (a, b) = (chips[i], chips[i + 1]);
        if a != b {
            bb.add_bit(0);
        } else {
            bb.add_bit(1);
        }
        i += 2;
    }
    bb
}

/// Differential Manchester Coding: presence of a transition at the half-
/// bit boundary encodes the bit (rather than the transition's direction,
/// distinguishing DMC from ordinary Manchester).
#[must_use]
pub fn slice_dmc(burst: &PulseBurst, t: &TimingParams) -> Bitbuffer {
    let chips = chip_stream(burst, t.short_width, t.reset_limit);
    let mut bb = Bitbuffer::new();
    let mut last = chips.first().copied().unwrap_or(0);
    let mut i = 1;
    while i + 1 < chips.len() {
        let mid = chips[i];
        let bit = u8::from(mid != last);
        bb.add_bit(bit);
        last = chips[i + 1];
        i += 2;
    }
    bb
}

/// NRZS: level encodes the bit directly, one bit per `short_width` cell,
/// no differential decoding (used by simple FSK keyfobs).
#[must_use]
pub fn slice_nrzs(burst: &PulseBurst, t: &TimingParams) -> Bitbuffer {
    let chips = chip_stream(burst, t.short_width, t.reset_limit);
    let mut bb = Bitbuffer::new();
    for c in chips {
        bb.add_bit(c);
    }
    bb
}

/// PIWM: pulse-interval width modulation — like PPM but the bit is
/// carried by the *pulse* width relative to the following gap rather
/// than the gap alone; used by a handful of TPMS sensors.
#[must_use]
pub fn slice_piwm(burst: &PulseBurst, t: &TimingParams) -> Bitbuffer {
    let mut bb = Bitbuffer::new();
    for i in 0..burst.num_pulses() {
        match classify(burst.pulse[i], t.short_width, t.long_width, t.tolerance) {
            Classified::Short => bb.add_bit(1),
            Classified::Long => bb.add_bit(0),
            Classified::Ambiguous => bb.add_row(),
        }
        if burst.gap[i] > t.reset_limit {
            bb.add_row();
            break;
        }
    }
    bb
}

/// Dispatch to the slicer named by `coding`.
#[must_use]
pub fn slice(coding: Coding, burst: &PulseBurst, t: &TimingParams) -> Bitbuffer {
    match coding {
        Coding::Pcm => slice_pcm(burst, t),
        Coding::Ppm => slice_ppm(burst, t),
        Coding::Pwm => slice_pwm(burst, t),
        Coding::ManchesterZerobit => slice_manchester_zerobit(burst, t),
        Coding::Dmc => slice_dmc(burst, t),
        Coding::Nrzs => slice_nrzs(burst, t),
        Coding::Piwm => slice_piwm(burst, t),
    }
}
