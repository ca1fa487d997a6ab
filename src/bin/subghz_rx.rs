//! Demo receiver binary: reads interleaved `f32` I/Q samples from a file
//! (or stdin), runs them through an OOK pulse detector and every
//! registered decoder, and prints matches to stdout.
//!
//! This is a thin driver over the library; the interesting work all
//! happens in [`subghz_rx::graph::Graph`] and [`subghz_rx::decoders`].

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use subghz_rx::block::{Block, BlockRet};
use subghz_rx::decoder::{DecoderDispatch, Modulation};
use subghz_rx::decoders;
use subghz_rx::pulse_detector::AmPulseDetector;
use subghz_rx::sink::{JsonLinesSink, KeyValueSink, Sink};
use subghz_rx::stream::{new_nocopy_stream, new_stream};
use subghz_rx::{Complex, Float};

/// Receive and decode sub-GHz sensor/remote-control transmissions from a
/// captured I/Q recording.
#[derive(Parser, Debug)]
#[command(name = "subghz_rx", version, about)]
struct Args {
    /// Path to a raw interleaved `f32` I/Q file. Reads stdin if omitted.
    #[arg(long)]
    input: Option<String>,

    /// Sample rate of the input, in Hz.
    #[arg(long, default_value_t = 250_000)]
    sample_rate: u32,

    /// OOK envelope threshold (magnitude squared) above which a sample
    /// counts as a pulse.
    #[arg(long, default_value_t = 0.1)]
    threshold: f32,

    /// Gap width, in microseconds, beyond which a burst is considered
    /// complete.
    #[arg(long, default_value_t = 15_000)]
    reset_limit_us: u32,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormatArg::Json)]
    format: OutputFormatArg,

    /// Increase logging verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
enum OutputFormatArg {
    Json,
    KeyValue,
}

fn open_input(path: Option<&str>) -> Result<Box<dyn Read>> {
    match path {
        Some(p) => {
            let f = File::open(p).with_context(|| format!("opening {p}"))?;
            Ok(Box::new(BufReader::new(f)))
        }
        None => Ok(Box::new(io::stdin())),
    }
}

fn read_all_samples(mut r: Box<dyn Read>) -> Result<Vec<Complex>> {
    let mut bytes = Vec::new();
    r.read_to_end(&mut bytes).context("reading samples")?;
    let n = bytes.len() / 8;
    let mut out = Vec::with_capacity(n);
    for chunk in bytes.chunks_exact(8) {
        let i = f32::from_le_bytes(chunk[0..4].try_into().unwrap());
        let q = f32::from_le_bytes(chunk[4..8].try_into().unwrap());
        out.push(Complex::new(i as Float, q as Float));
    }
    Ok(out)
}

fn main() -> Result<()> {
    let args = Args::parse();
    stderrlog::new()
        .module(module_path!())
        .verbosity(usize::from(args.verbose) + 1)
        .init()
        .context("initializing logger")?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)).context("installing Ctrl-C handler")?;

    let samples = read_all_samples(open_input(args.input.as_deref())?)?;
    log::info!("read {} I/Q samples", samples.len());

    let (sample_w, sample_r) = new_stream::<Complex>();
    let (burst_w, burst_r) = new_nocopy_stream();
    let (record_w, record_r) = new_nocopy_stream();

    sample_w.write(samples);
    sample_w.close();

    let registry = decoders::all();
    let field_names = registry.field_names();

    let mut detector = AmPulseDetector::new(sample_r, burst_w, args.sample_rate, args.threshold, args.reset_limit_us);
    let mut dispatch = DecoderDispatch::new(burst_r, record_w, registry, Modulation::Ook);

    let stdout = io::stdout();
    let mut sink: Box<dyn Sink> = match args.format {
        OutputFormatArg::Json => Box::new(JsonLinesSink::new(stdout.lock())),
        OutputFormatArg::KeyValue => Box::new(KeyValueSink::new(stdout.lock())),
    };
    sink.start(&field_names)?;

    loop {
        if !running.load(Ordering::SeqCst) {
            log::warn!("interrupted, stopping early");
            break;
        }
        let det_done = matches!(detector.work()?, BlockRet::Eof);
        let disp_done = matches!(dispatch.work()?, BlockRet::Eof);
        while let Some(record) = record_r.pop() {
            sink.emit(&record)?;
        }
        if det_done && disp_done {
            break;
        }
    }
    sink.flush()?;
    Ok(())
}
