/*! Structured decode output: a small tagged-union [`Value`] and an
ordered [`Record`] of named values, the shape every decoder builds and
every [`crate::sink`] serializes.

`rustradio` has no equivalent of this (it moves typed sample streams,
not heterogeneous records), so this module is grounded on the general
shape of rtl_433's `data_t` linked list, re-expressed the way this
crate's other modules are: an owned, `serde`-serializable Rust value
instead of a hand-managed reference-counted C struct. Lifetime
management that the original gets from an explicit retain count falls
out of ordinary Rust ownership here — see `DESIGN.md` for the Open
Question this resolves.
*/

use serde::Serialize;
use std::fmt;

/// One decoded field's value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A signed integer field (counts, raw register values, ids).
    Int(i64),
    /// A floating-point field (temperature, humidity, voltage, ...).
    Double(f64),
    /// A short text field (model name, channel label, direction).
    Str(String),
    /// Raw bytes, hex-encoded on output (undecoded payload, a MAC).
    Blob(#[serde(serialize_with = "serialize_blob_as_hex")] Vec<u8>),
    /// A homogeneous list of values (e.g. per-channel readings).
    Array(Vec<Value>),
    /// A nested record (sub-fields grouped under one key).
    Record(Record),
}

fn serialize_blob_as_hex<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{b:02x}"));
    }
    serializer.serialize_str(&s)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Blob(b) => {
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Record(r) => write!(f, "{r}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}
impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}
impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

/// One `name: value` pair within a [`Record`], in insertion order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Field {
    /// Field name, matched against the common field vocabulary (`model`,
    /// `id`, `temperature_C`, ...).
    pub name: String,
    /// Field value.
    pub value: Value,
    /// An optional printf-style display hint (e.g. `"%04x"` for an id a
    /// decoder wants printed as hex) carried alongside the value. Set by
    /// [`RecordBuilder::format`] for the field that follows it; structured
    /// sinks such as JSON ignore it and emit the plain value.
    pub format: Option<String>,
}

/// An ordered, named set of decoded fields — one decode result.
///
/// Field order is preserved (unlike a `HashMap`) because output sinks
/// such as the key-value sink print fields in the order a decoder added
/// them, matching the conventional `model`, `id`, ... field ordering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: Vec<Field>,
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}

impl Record {
    /// An empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Look up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Append a field, replacing one of the same name if the builder
    /// style fields in `with_*` calls overlap (decoders should not do
    /// this in practice; last write wins).
    fn push(&mut self, name: impl Into<String>, value: Value, format: Option<String>) {
        self.fields.push(Field {
            name: name.into(),
            value,
            format,
        });
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", field.name, field.value)?;
        }
        write!(f, "}}")
    }
}

/// Fluent builder for a [`Record`], replacing rtl_433's variadic
/// `data_make(...)` call with a chain of typed setters. A decoder
/// builds one record and returns it; [`RecordBuilder::build`] consumes
/// the builder.
#[derive(Default)]
pub struct RecordBuilder {
    record: Record,
    pending_format: Option<String>,
}

impl RecordBuilder {
    /// Start building a new record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a printf-style display hint to the next field added,
    /// replacing the `FORMAT` pseudo-tag of a variadic builder: it
    /// consumes exactly the one field that follows it, then clears.
    #[must_use]
    pub fn format(mut self, hint: impl Into<String>) -> Self {
        self.pending_format = Some(hint.into());
        self
    }

    fn take_format(&mut self) -> Option<String> {
        self.pending_format.take()
    }

    /// Add an integer field.
    #[must_use]
    pub fn int(mut self, name: &str, value: i64) -> Self {
        let format = self.take_format();
        self.record.push(name, Value::Int(value), format);
        self
    }

    /// Add a floating-point field.
    #[must_use]
    pub fn double(mut self, name: &str, value: f64) -> Self {
        let format = self.take_format();
        self.record.push(name, Value::Double(value), format);
        self
    }

    /// Add a string field.
    #[must_use]
    pub fn string(mut self, name: &str, value: impl Into<String>) -> Self {
        let format = self.take_format();
        self.record.push(name, Value::Str(value.into()), format);
        self
    }

    /// Add a raw-bytes field.
    #[must_use]
    pub fn blob(mut self, name: &str, value: Vec<u8>) -> Self {
        let format = self.take_format();
        self.record.push(name, Value::Blob(value), format);
        self
    }

    /// Add an array field.
    #[must_use]
    pub fn array(mut self, name: &str, value: Vec<Value>) -> Self {
        let format = self.take_format();
        self.record.push(name, Value::Array(value), format);
        self
    }

    /// Add a nested record field.
    #[must_use]
    pub fn record(mut self, name: &str, value: Record) -> Self {
        let format = self.take_format();
        self.record.push(name, Value::Record(value), format);
        self
    }

    /// Conditionally add a field, only if `cond` is true — replaces the
    /// `COND` pseudo-tag of a variadic builder for fields that are only
    /// meaningful for some protocol variants (e.g. a channel number that
    /// only some models report). A pending `.format()` hint is dropped,
    /// not carried over to the next field, when `cond` is false.
    #[must_use]
    pub fn cond(mut self, cond: bool, name: &str, value: impl Into<Value>) -> Self {
        if cond {
            self.any(name, value)
        } else {
            self.pending_format = None;
            self
        }
    }

    /// Add a field of any [`Value`] variant.
    #[must_use]
    pub fn any(mut self, name: &str, value: impl Into<Value>) -> Self {
        let format = self.take_format();
        self.record.push(name, value.into(), format);
        self
    }

    /// Finish building and return the assembled record.
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_insertion_order() {
        let r = RecordBuilder::new()
            .string("model", "Prologue")
            .int("id", 5)
            .double("temperature_C", 21.5)
            .build();
        let names: Vec<_> = r.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["model", "id", "temperature_C"]);
        assert_eq!(r.get("id"), Some(&Value::Int(5)));
    }

    #[test]
    fn cond_field_is_skipped_when_false() {
        let r = RecordBuilder::new()
            .string("model", "LaCrosse-TX141Bv2")
            .cond(false, "channel", 3i64)
            .build();
        assert!(r.get("channel").is_none());
    }

    #[test]
    fn json_serializes_blob_as_hex() {
        let r = RecordBuilder::new().blob("mac", vec![0xDE, 0xAD]).build();
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"dead\""));
    }

    #[test]
    fn display_matches_key_value_shape() {
        let r = RecordBuilder::new().string("model", "X").int("id", 1).build();
        assert_eq!(format!("{r}"), "{model=X, id=1}");
    }

    #[test]
    fn format_annotates_exactly_the_next_field() {
        let r = RecordBuilder::new()
            .format("%04x")
            .int("id", 28205)
            .int("channel", 2)
            .build();
        let fields: Vec<_> = r.iter().collect();
        assert_eq!(fields[0].format.as_deref(), Some("%04x"));
        assert_eq!(fields[1].format, None);
    }

    #[test]
    fn json_output_ignores_format_hint() {
        let r = RecordBuilder::new().format("%04x").int("id", 5).build();
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"id":5}"#);
    }
}
