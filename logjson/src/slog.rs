//! Adapters for emitting log JSON through `slog`.
//!
//! - [`Logged`] and [`Json`] implement `slog::Value`, handing the rendered
//!   document to the serializer as a nested serde value.
//! - [`JsonDrain`] is a drain that writes one `time|message|{kv}` line per
//!   record, with every key-value pair written by the [`Encoder`].
//!
//! Rendering never fails; a value that cannot be handed over as nested JSON is
//! emitted as `None`.

use std::{fmt::Arguments, io, panic::AssertUnwindSafe};

use parking_lot::Mutex;
use serde_json::value::RawValue;
use slog::{Key, OwnedKVList, Record, Result as SlogResult, Serializer, Value as SlogValue, KV};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    Error, display::Json, encoder::Encoder, location::caller_path, reflect::LogValue,
};

fn emit_rendered(
    rendered: Vec<u8>,
    record: &Record<'_>,
    key: Key,
    serializer: &mut dyn Serializer,
) -> SlogResult {
    let text = String::from_utf8_lossy(&rendered).into_owned();
    match RawValue::from_string(text) {
        Ok(raw) => SlogValue::serialize(&slog::Serde(raw), record, key, serializer),
        Err(_) => serializer.emit_none(key),
    }
}

/// Owned value, rendered through the global instance.
///
/// ```ignore
/// use logjson::slog::Logged;
///
/// let log = slog::Logger::root(drain, slog::o!("service" => Logged(config.clone())));
/// ```
#[derive(Clone, Debug)]
pub struct Logged<T>(pub T);

impl<T: LogValue> SlogValue for Logged<T> {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        emit_rendered(crate::marshal(&self.0), record, key, serializer)
    }
}

/// Borrowed values, through [`LogJsonExt::log_json`](crate::LogJsonExt::log_json):
/// `info!(log, "login"; "user" => user.log_json())`.
impl<T: LogValue + ?Sized> SlogValue for Json<'_, T> {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        emit_rendered(self.render(), record, key, serializer)
    }
}

// =============================================================================
// JsonDrain
// =============================================================================

/// Writes each record as `<RFC 3339 time>|<message>|<kv object>` followed by a
/// newline.
///
/// With [`with_location`](Self::with_location) the message is prefixed by the
/// call site, trimmed by [`caller_path`]. Record pairs come before logger
/// pairs. [`Logged`] and [`Json`] values arrive already rendered by their own
/// instance and are copied into the line as is.
pub struct JsonDrain<W: io::Write> {
    // `Logger::root` needs a `RefUnwindSafe` drain. parking_lot locks do not poison.
    writer: AssertUnwindSafe<Mutex<W>>,
    location: bool,
}

impl<W: io::Write> JsonDrain<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: AssertUnwindSafe(Mutex::new(writer)),
            location: false,
        }
    }

    #[must_use]
    pub fn with_location(mut self, enabled: bool) -> Self {
        self.location = enabled;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer.0.into_inner()
    }

    fn format(&self, record: &Record<'_>, values: &OwnedKVList) -> Result<Vec<u8>, Error> {
        let now = OffsetDateTime::now_utc();
        let mut line = now
            .format(&Rfc3339)
            .unwrap_or_else(|_| now.unix_timestamp().to_string())
            .into_bytes();
        line.push(b'|');
        if self.location {
            line.extend_from_slice(caller_path(record.file(), record.line()).as_bytes());
            line.push(b' ');
        }
        line.extend_from_slice(record.msg().to_string().as_bytes());
        line.push(b'|');

        let mut encoder = Encoder::new();
        encoder.begin_object();
        {
            let mut kv = KvSerializer {
                encoder: &mut encoder,
            };
            record
                .kv()
                .serialize(record, &mut kv)
                .map_err(io::Error::from)?;
            values.serialize(record, &mut kv).map_err(io::Error::from)?;
        }
        encoder.end_object();
        line.extend_from_slice(encoder.as_bytes());
        Ok(line)
    }
}

impl<W: io::Write> slog::Drain for JsonDrain<W> {
    type Ok = ();
    type Err = Error;

    fn log(&self, record: &Record<'_>, values: &OwnedKVList) -> Result<(), Error> {
        let line = self.format(record, values)?;
        let mut writer = self.writer.lock();
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }
}

/// Streams key-value pairs into an open object.
struct KvSerializer<'a> {
    encoder: &'a mut Encoder,
}

impl KvSerializer<'_> {
    fn member(&mut self, key: Key, write: impl FnOnce(&mut Encoder)) -> SlogResult {
        self.encoder.write_str(key);
        write(&mut *self.encoder);
        Ok(())
    }
}

impl Serializer for KvSerializer<'_> {
    fn emit_arguments(&mut self, key: Key, val: &Arguments<'_>) -> SlogResult {
        self.member(key, |encoder| encoder.write_str(&val.to_string()))
    }

    fn emit_str(&mut self, key: Key, val: &str) -> SlogResult {
        self.member(key, |encoder| encoder.write_str(val))
    }

    fn emit_bool(&mut self, key: Key, val: bool) -> SlogResult {
        self.member(key, |encoder| encoder.write_bool(val))
    }

    fn emit_i64(&mut self, key: Key, val: i64) -> SlogResult {
        self.member(key, |encoder| encoder.write_int(val))
    }

    fn emit_u64(&mut self, key: Key, val: u64) -> SlogResult {
        self.member(key, |encoder| encoder.write_uint(val))
    }

    fn emit_f64(&mut self, key: Key, val: f64) -> SlogResult {
        self.member(key, |encoder| encoder.write_float(val))
    }

    fn emit_unit(&mut self, key: Key) -> SlogResult {
        self.member(key, Encoder::write_null)
    }

    fn emit_none(&mut self, key: Key) -> SlogResult {
        self.member(key, Encoder::write_null)
    }

    fn emit_serde(&mut self, key: Key, val: &dyn slog::SerdeValue) -> SlogResult {
        self.member(key, |encoder| {
            match serde_json::value::to_raw_value(val.as_serde()) {
                Ok(raw) => encoder.write_raw(&raw),
                Err(_) => encoder.write_null(),
            }
        })
    }
}
