/*! A receiver framework for low-power sub-GHz sensor and remote-control
devices: weather stations, thermometers, tire-pressure monitors, keyfobs,
energy meters, smoke alarms, utility meters, and similar.

It consumes a stream of complex I/Q samples, extracts per-device digital
frames, and emits structured key-value events for downstream logging,
dashboards, or message brokers.

# Architecture overview

Like [rustradio][rustradio] (which this crate's block/stream/graph
plumbing is adapted from), an application is built from [`block::Block`]s
connected by [`stream::Stream`]s. Unlike a general DSP graph, this crate's
graph is short and fixed in shape:

```text
[ I/Q sample source ]
         |
[ Pulse Detector (AM or FM) ]
         |  (bursts, non-copy stream)
[ Decoder Dispatch ]  --> [ Sink ] [ Sink ] ...
```

The pulse detector turns a sample stream into [`pulse_data::PulseBurst`]s.
The dispatch block runs every enabled [`decoder::Decoder`] against each
burst: a [`slicer`] turns the burst into a [`bitbuffer::Bitbuffer`], the
decoder callback reads bits with the help of [`bits`], and on success a
[`value::Record`] is pushed to every registered [`sink::Sink`].

[rustradio]: https://github.com/ThomasHabets/rustradio
*/
#![warn(missing_docs)]

pub mod bitbuffer;
pub mod bits;
pub mod block;
pub mod decoder;
pub mod decoders;
pub mod graph;
pub mod pulse_data;
pub mod pulse_detector;
pub mod sink;
pub mod slicer;
pub mod stream;
pub mod value;

/// Float type used throughout the pipeline.
pub type Float = f32;

/// Complex (I/Q) sample.
pub type Complex = num_complex::Complex<Float>;

/// Crate-wide error type.
///
/// Decoder rejections are *not* represented here: a decoder's pass/fail
/// status is a [`decoder::DecodeStatus`], returned locally and never
/// propagated as an `Error`. This type covers failures in the ambient
/// machinery around decoding: I/O, sink delivery, and similar.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying I/O failure (reading a sample source, writing a sink).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A sink failed to accept or flush a record.
    #[error("sink {sink} failed: {reason}")]
    Sink {
        /// Name of the sink that failed.
        sink: String,
        /// Reason for the failure.
        reason: String,
    },

    /// A sample source produced a malformed sample.
    #[error("malformed sample: {0}")]
    Sample(String),
}

/// Result type used throughout the pipeline.
pub type Result<T> = std::result::Result<T, Error>;
