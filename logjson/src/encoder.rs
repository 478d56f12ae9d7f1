//! Streaming compact JSON token writer.
//!
//! [`Encoder`] writes tokens into an in-memory buffer and tracks the open
//! containers, so callers never deal with separators. Object members are
//! written as a name token followed by a value token.
//!
//! The writer keeps the document well formed no matter what it is fed:
//!
//! - a non-string scalar in name position is written as a string name;
//! - a container opened in name position gets an empty name first;
//! - closing an object right after a name writes a `null` value;
//! - closing a container that is not open is ignored;
//! - a mismatched close closes the innermost open container.
//!
//! Each complete top-level value is followed by a newline.

use std::io;

use serde_json::{
    Value as JsonValue,
    ser::{CompactFormatter, Formatter},
    value::RawValue,
};

#[derive(Clone, Copy, Debug)]
struct Frame {
    object: bool,
    tokens: usize,
}

impl Frame {
    fn expects_name(self) -> bool {
        self.object && self.tokens % 2 == 0
    }
}

/// Output position before a value written by foreign code.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ValueMark {
    len: usize,
    depth: usize,
}

#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
    stack: Vec<Frame>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            stack: Vec::new(),
        }
    }

    /// Number of currently open containers.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Everything written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Clears output and container state, keeping the allocation.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.stack.clear();
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub(crate) fn mark(&self) -> ValueMark {
        ValueMark {
            len: self.buf.len(),
            depth: self.stack.len(),
        }
    }

    /// Completes a value started at `mark`: containers left open are closed,
    /// and a value that wrote nothing at all becomes `null`.
    pub(crate) fn close_value(&mut self, mark: ValueMark) {
        if self.buf.len() == mark.len {
            self.write_null();
            return;
        }
        while self.stack.len() > mark.depth {
            self.end();
        }
    }

    fn in_name_position(&self) -> bool {
        self.stack.last().is_some_and(|frame| frame.expects_name())
    }

    fn before_token(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            if frame.tokens > 0 {
                let separator = if frame.object && frame.tokens % 2 == 1 {
                    b':'
                } else {
                    b','
                };
                self.buf.push(separator);
            }
            frame.tokens += 1;
        }
    }

    fn after_value(&mut self) {
        if self.stack.is_empty() {
            self.buf.push(b'\n');
        }
    }

    // `Vec<u8>` never fails as an `io::Write`; the formatter only passes its
    // result through.
    fn emit(&mut self, write: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) {
        if write(&mut self.buf).is_err() {
            self.buf.extend_from_slice(b"null");
        }
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    pub fn write_null(&mut self) {
        if self.in_name_position() {
            self.write_str("null");
            return;
        }
        self.before_token();
        self.buf.extend_from_slice(b"null");
        self.after_value();
    }

    pub fn write_bool(&mut self, value: bool) {
        if self.in_name_position() {
            self.write_str(if value { "true" } else { "false" });
            return;
        }
        self.before_token();
        self.emit(|buf| CompactFormatter.write_bool(buf, value));
        self.after_value();
    }

    pub fn write_int(&mut self, value: i64) {
        if self.in_name_position() {
            self.write_str(&value.to_string());
            return;
        }
        self.before_token();
        self.emit(|buf| CompactFormatter.write_i64(buf, value));
        self.after_value();
    }

    pub fn write_uint(&mut self, value: u64) {
        if self.in_name_position() {
            self.write_str(&value.to_string());
            return;
        }
        self.before_token();
        self.emit(|buf| CompactFormatter.write_u64(buf, value));
        self.after_value();
    }

    /// Finite values are written as numbers; NaN and the infinities as the
    /// strings `"NaN"`, `"Infinity"` and `"-Infinity"`.
    pub fn write_float(&mut self, value: f64) {
        if !value.is_finite() {
            let text = if value.is_nan() {
                "NaN"
            } else if value.is_sign_positive() {
                "Infinity"
            } else {
                "-Infinity"
            };
            self.write_str(text);
            return;
        }
        if self.in_name_position() {
            self.write_str(&value.to_string());
            return;
        }
        self.before_token();
        self.emit(|buf| CompactFormatter.write_f64(buf, value));
        self.after_value();
    }

    /// Writes an escaped string. In name position this is the member name.
    pub fn write_str(&mut self, value: &str) {
        self.before_token();
        self.emit(|buf| serde_json::to_writer(buf, value).map_err(io::Error::other));
        self.after_value();
    }

    // =========================================================================
    // Containers
    // =========================================================================

    pub fn begin_object(&mut self) {
        self.begin(true);
    }

    pub fn end_object(&mut self) {
        self.end();
    }

    pub fn begin_array(&mut self) {
        self.begin(false);
    }

    pub fn end_array(&mut self) {
        self.end();
    }

    fn begin(&mut self, object: bool) {
        if self.in_name_position() {
            self.write_str("");
        }
        self.before_token();
        self.buf.push(if object { b'{' } else { b'[' });
        self.stack.push(Frame { object, tokens: 0 });
    }

    fn end(&mut self) {
        let Some(frame) = self.stack.last().copied() else {
            return;
        };
        if frame.object && frame.tokens % 2 == 1 {
            self.write_null();
        }
        self.stack.pop();
        self.buf.push(if frame.object { b'}' } else { b']' });
        self.after_value();
    }

    /// Writes pre-rendered JSON as a single value. In name position its text
    /// becomes the member name.
    pub fn write_raw(&mut self, raw: &RawValue) {
        if self.in_name_position() {
            self.write_str(raw.get());
            return;
        }
        self.before_token();
        self.buf.extend_from_slice(raw.get().as_bytes());
        self.after_value();
    }

    /// Writes an already-built JSON value token by token.
    pub fn write_json_value(&mut self, value: &JsonValue) {
        match value {
            JsonValue::Null => self.write_null(),
            JsonValue::Bool(flag) => self.write_bool(*flag),
            JsonValue::Number(number) => {
                if let Some(int) = number.as_i64() {
                    self.write_int(int);
                } else if let Some(uint) = number.as_u64() {
                    self.write_uint(uint);
                } else {
                    self.write_float(number.as_f64().unwrap_or(f64::NAN));
                }
            }
            JsonValue::String(text) => self.write_str(text),
            JsonValue::Array(items) => {
                self.begin_array();
                for item in items {
                    self.write_json_value(item);
                }
                self.end_array();
            }
            JsonValue::Object(members) => {
                self.begin_object();
                for (name, member) in members {
                    self.write_str(name);
                    self.write_json_value(member);
                }
                self.end_object();
            }
        }
    }
}
