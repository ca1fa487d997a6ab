/*! Output sinks: the contract a decoded [`Record`] crosses on its way
out of the process, and four implementations of it.

`rustradio` has sinks too (`file_sink`, `audio_sink`, `null_sink`), all
implementing `Block` directly against a sample stream. A `Record` sink
is a different shape — it fires once per decode, not once per sample —
so rather than force it through `Block::work()`, this module follows
`rustradio`'s `debug_sink`/`vector_sink` naming and simplicity (a plain
method call, no internal buffering) while changing the signature to fit
records instead of samples.
*/

use crate::value::Record;
use crate::{Error, Result};
use std::io::Write;
use std::net::UdpSocket;

/// Somewhere a decoded [`Record`] can be sent.
pub trait Sink {
    /// Called once, before the first `emit`, with the union of field
    /// names across every enabled decoder. Tabular sinks use this to
    /// build a stable header; line-oriented sinks default to a no-op.
    fn start(&mut self, _field_names: &[String]) -> Result<()> {
        Ok(())
    }

    /// Emit one record. Errors are sink-specific I/O failures; a
    /// caller that wants best-effort delivery across many sinks should
    /// log and continue rather than abort the whole pipeline on one
    /// sink's failure.
    fn emit(&mut self, record: &Record) -> Result<()>;

    /// Flush any buffered output. Default no-op for unbuffered sinks.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes one JSON object per line, newline-delimited — the default
/// rtl_433 wire format, and the easiest for a downstream collector to
/// parse without knowing record boundaries in advance.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap any writer (a file, stdout, a `TcpStream`) as a JSON-lines sink.
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Sink for JsonLinesSink<W> {
    fn emit(&mut self, record: &Record) -> Result<()> {
        let line = serde_json::to_string(record).map_err(|e| Error::Sink {
            sink: "json_lines".into(),
            reason: e.to_string(),
        })?;
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Writes `name=value` pairs separated by spaces, one record per line —
/// the human-readable console format rtl_433 defaults to on a terminal.
pub struct KeyValueSink<W: Write> {
    out: W,
}

impl<W: Write> KeyValueSink<W> {
    /// Wrap a writer as a key-value sink.
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Sink for KeyValueSink<W> {
    fn emit(&mut self, record: &Record) -> Result<()> {
        let mut parts = Vec::with_capacity(record.len());
        for field in record.iter() {
            parts.push(format!("{}={}", field.name, field.value));
        }
        writeln!(self.out, "{}", parts.join(" "))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Writes one CSV row per record, against the column list established by
/// `start()` (the union of field names across enabled decoders) —
/// columns a record doesn't have come out empty, extra fields a record
/// has that aren't in the column list are dropped, matching rtl_433's
/// `-F csv:columns` behavior of a stable schema.
pub struct CsvSink<W: Write> {
    out: W,
    columns: Vec<String>,
    header_written: bool,
}

impl<W: Write> CsvSink<W> {
    /// Build a CSV sink with no columns yet; `start()` fills them in.
    pub fn new(out: W) -> Self {
        Self {
            out,
            columns: Vec::new(),
            header_written: false,
        }
    }

    /// Embedded separators are escaped by a leading backslash rather
    /// than double-quoting, matching this sink's wire format.
    fn csv_escape(s: &str) -> String {
        s.replace(',', "\\,")
    }
}

impl<W: Write> Sink for CsvSink<W> {
    fn start(&mut self, field_names: &[String]) -> Result<()> {
        self.columns = field_names.to_vec();
        Ok(())
    }

    fn emit(&mut self, record: &Record) -> Result<()> {
        if !self.header_written {
            writeln!(self.out, "{}", self.columns.join(","))?;
            self.header_written = true;
        }
        let mut cells = Vec::with_capacity(self.columns.len());
        for col in &self.columns {
            let cell = match record.get(col) {
                Some(v) => Self::csv_escape(&v.to_string()),
                None => String::new(),
            };
            cells.push(cell);
        }
        writeln!(self.out, "{}", cells.join(","))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Sends each record as a single UDP datagram of syslog-formatted text
/// (RFC 3164 style: `<PRI>message`), for feeding a central log
/// collector without an intervening file.
pub struct SyslogUdpSink {
    socket: UdpSocket,
    facility_priority: u8,
}

impl SyslogUdpSink {
    /// Connect a UDP socket to `addr` (host:port) for syslog delivery.
    /// `facility_priority` is the pre-combined RFC 3164 `<PRI>` value
    /// (facility * 8 + severity); callers typically use `local0.info`
    /// = `16*8 + 6 = 134`.
    pub fn connect(addr: &str, facility_priority: u8) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(addr)?;
        Ok(Self {
            socket,
            facility_priority,
        })
    }
}

impl Sink for SyslogUdpSink {
    fn emit(&mut self, record: &Record) -> Result<()> {
        let mut parts = Vec::with_capacity(record.len());
        for field in record.iter() {
            parts.push(format!("{}={}", field.name, field.value));
        }
        let msg = format!("<{}>{}", self.facility_priority, parts.join(" "));
        self.socket.send(msg.as_bytes())?;
        Ok(())
    }
}

/// Convenience: fan one record out to every sink in a list, logging
/// (rather than aborting on) any individual sink's failure.
pub fn emit_to_all(sinks: &mut [Box<dyn Sink>], record: &Record) {
    for sink in sinks.iter_mut() {
        if let Err(e) = sink.emit(record) {
            log::warn!("sink failed: {e}");
        }
    }
}
