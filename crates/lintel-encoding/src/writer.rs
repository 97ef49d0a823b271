//! Streaming JSON writer
//!
//! Emits tokens straight to an `io::Write` sink, driving a
//! `serde_json` formatter for punctuation and indentation. Nothing is
//! buffered beyond what the sink itself buffers.

use std::fmt::Write as _;
use std::io;

use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};

#[derive(Debug, Clone, Copy)]
enum Frame {
    Array { first: bool },
    Object { first: bool },
}

pub struct JsonWriter<W, F = CompactFormatter> {
    writer: W,
    formatter: F,
    stack: Vec<Frame>,
    scratch: String,
}

impl<W: io::Write> JsonWriter<W> {
    /// A writer producing JSON without any whitespace
    pub fn new(writer: W) -> Self {
        Self::with_formatter(writer, CompactFormatter)
    }
}

impl<'a, W: io::Write> JsonWriter<W, PrettyFormatter<'a>> {
    /// A writer indenting nested containers by two spaces
    pub fn pretty(writer: W) -> Self {
        Self::with_formatter(writer, PrettyFormatter::with_indent(b"  "))
    }
}

impl<W: io::Write, F: Formatter> JsonWriter<W, F> {
    pub fn with_formatter(writer: W, formatter: F) -> Self {
        Self {
            writer,
            formatter,
            stack: Vec::new(),
            scratch: String::new(),
        }
    }

    // === Containers ===

    pub fn begin_object(&mut self) -> io::Result<()> {
        self.begin_value()?;
        self.formatter.begin_object(&mut self.writer)?;
        self.stack.push(Frame::Object { first: true });
        Ok(())
    }

    pub fn end_object(&mut self) -> io::Result<()> {
        debug_assert!(matches!(self.stack.last(), Some(Frame::Object { .. })));
        self.stack.pop();
        self.formatter.end_object(&mut self.writer)?;
        self.end_value()
    }

    pub fn begin_array(&mut self) -> io::Result<()> {
        self.begin_value()?;
        self.formatter.begin_array(&mut self.writer)?;
        self.stack.push(Frame::Array { first: true });
        Ok(())
    }

    pub fn end_array(&mut self) -> io::Result<()> {
        debug_assert!(matches!(self.stack.last(), Some(Frame::Array { .. })));
        self.stack.pop();
        self.formatter.end_array(&mut self.writer)?;
        self.end_value()
    }

    /// Write an object key; the next value written belongs to it
    pub fn key(&mut self, name: &str) -> io::Result<()> {
        let first = match self.stack.last_mut() {
            Some(Frame::Object { first }) => std::mem::replace(first, false),
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "object key written outside of an object",
                ))
            }
        };
        self.formatter.begin_object_key(&mut self.writer, first)?;
        self.write_escaped(name)?;
        self.formatter.end_object_key(&mut self.writer)?;
        self.formatter.begin_object_value(&mut self.writer)
    }

    // === Scalars ===

    pub fn string(&mut self, value: &str) -> io::Result<()> {
        self.begin_value()?;
        self.write_escaped(value)?;
        self.end_value()
    }

    pub fn bool(&mut self, value: bool) -> io::Result<()> {
        self.begin_value()?;
        self.formatter.write_bool(&mut self.writer, value)?;
        self.end_value()
    }

    pub fn null(&mut self) -> io::Result<()> {
        self.begin_value()?;
        self.formatter.write_null(&mut self.writer)?;
        self.end_value()
    }

    pub fn i64(&mut self, value: i64) -> io::Result<()> {
        self.begin_value()?;
        self.formatter.write_i64(&mut self.writer, value)?;
        self.end_value()
    }

    pub fn u64(&mut self, value: u64) -> io::Result<()> {
        self.begin_value()?;
        self.formatter.write_u64(&mut self.writer, value)?;
        self.end_value()
    }

    pub fn f64(&mut self, value: f64) -> io::Result<()> {
        self.begin_value()?;
        self.formatter.write_f64(&mut self.writer, value)?;
        self.end_value()
    }

    /// Write `row:col:end_row:end_col` as a string, reusing the scratch buffer
    pub fn position(&mut self, positions: [usize; 4]) -> io::Result<()> {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        let [row, col, end_row, end_col] = positions;
        // Writing into a String cannot fail.
        let _ = write!(scratch, "{row}:{col}:{end_row}:{end_col}");
        let result = self.string(&scratch);
        self.scratch = scratch;
        result
    }

    /// Write an arbitrary JSON value, object keys in map order
    pub fn json(&mut self, value: &serde_json::Value) -> io::Result<()> {
        use serde_json::Value;

        match value {
            Value::Null => self.null(),
            Value::Bool(b) => self.bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    self.i64(i)
                } else if let Some(u) = n.as_u64() {
                    self.u64(u)
                } else {
                    self.f64(n.as_f64().unwrap_or_default())
                }
            }
            Value::String(s) => self.string(s),
            Value::Array(items) => {
                self.begin_array()?;
                for item in items {
                    self.json(item)?;
                }
                self.end_array()
            }
            Value::Object(map) => self.json_map(map),
        }
    }

    pub fn json_map(&mut self, map: &serde_json::Map<String, serde_json::Value>) -> io::Result<()> {
        self.begin_object()?;
        for (k, v) in map {
            self.key(k)?;
            self.json(v)?;
        }
        self.end_object()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    // === Utilities ===

    fn begin_value(&mut self) -> io::Result<()> {
        if let Some(Frame::Array { first }) = self.stack.last_mut() {
            let first = std::mem::replace(first, false);
            self.formatter.begin_array_value(&mut self.writer, first)?;
        }
        Ok(())
    }

    fn end_value(&mut self) -> io::Result<()> {
        match self.stack.last() {
            Some(Frame::Array { .. }) => self.formatter.end_array_value(&mut self.writer),
            Some(Frame::Object { .. }) => self.formatter.end_object_value(&mut self.writer),
            None => Ok(()),
        }
    }

    fn write_escaped(&mut self, value: &str) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, value).map_err(io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(f: impl FnOnce(&mut JsonWriter<&mut Vec<u8>>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        let mut w = JsonWriter::new(&mut buf);
        f(&mut w).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_compact_nesting() {
        let out = compact(|w| {
            w.begin_object()?;
            w.key("a")?;
            w.begin_array()?;
            w.i64(1)?;
            w.bool(true)?;
            w.null()?;
            w.end_array()?;
            w.key("b")?;
            w.string("x\"y")?;
            w.end_object()
        });

        assert_eq!(out, r#"{"a":[1,true,null],"b":"x\"y"}"#);
    }

    #[test]
    fn test_pretty_two_space_indent() {
        let mut buf = Vec::new();
        let mut w = JsonWriter::pretty(&mut buf);
        w.begin_object().unwrap();
        w.key("a").unwrap();
        w.begin_array().unwrap();
        w.i64(1).unwrap();
        w.end_array().unwrap();
        w.key("b").unwrap();
        w.begin_array().unwrap();
        w.end_array().unwrap();
        w.end_object().unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "{\n  \"a\": [\n    1\n  ],\n  \"b\": []\n}"
        );
    }

    #[test]
    fn test_position_reuses_scratch() {
        let out = compact(|w| {
            w.begin_array()?;
            w.position([4, 1, 4, 4])?;
            w.position([10, 2, 12, 6])?;
            w.end_array()
        });

        assert_eq!(out, r#"["4:1:4:4","10:2:12:6"]"#);
    }

    #[test]
    fn test_key_outside_object_fails() {
        let mut buf = Vec::new();
        let mut w = JsonWriter::new(&mut buf);
        assert!(w.key("a").is_err());
    }

    #[test]
    fn test_generic_json() {
        let value = serde_json::json!({"b": [1, 2.5, "s"], "a": {"n": null}});
        let out = compact(|w| w.json(&value));

        assert_eq!(out, r#"{"a":{"n":null},"b":[1,2.5,"s"]}"#);
    }
}
