//! Output sinks: InfluxDB line protocol and JSON lines.
//!
//! Both write to any `Write` (stdout in the binary). Points are rendered
//! into a staging buffer and written out in one go at the end of a cycle.

use std::fmt::Write as _;
use std::io::{self, Write};

use solarpoll_core::{CoreError, EmittedPoint, FieldValue, PointSink};

use crate::cli::OutputFormat;

fn sink_err(e: impl std::fmt::Display) -> CoreError {
    CoreError::Sink {
        message: e.to_string(),
    }
}

/// Build the sink for `format` over stdout.
pub fn stdout_sink(format: OutputFormat) -> Box<dyn PointSink> {
    match format {
        OutputFormat::Line => Box::new(LineProtocolSink::new(io::stdout())),
        OutputFormat::Json => Box::new(JsonSink::new(io::stdout())),
    }
}

// ── Line protocol ────────────────────────────────────────────────────

/// Writes `measurement,tag=v field=1,field2="s" <ns>` lines.
#[derive(Debug)]
pub struct LineProtocolSink<W> {
    out: W,
    staged: String,
}

impl<W: Write> LineProtocolSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            staged: String::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn escape_measurement(name: &str, buf: &mut String) {
    for c in name.chars() {
        if matches!(c, ',' | ' ') {
            buf.push('\\');
        }
        buf.push(c);
    }
}

fn escape_key(key: &str, buf: &mut String) {
    for c in key.chars() {
        if matches!(c, ',' | '=' | ' ') {
            buf.push('\\');
        }
        buf.push(c);
    }
}

fn escape_string_value(value: &str, buf: &mut String) {
    buf.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            buf.push('\\');
        }
        buf.push(c);
    }
    buf.push('"');
}

/// Render one point as a line-protocol line (without the newline).
pub fn render_line(point: &EmittedPoint) -> Result<String, CoreError> {
    let mut line = String::with_capacity(256);
    escape_measurement(&point.measurement, &mut line);

    for (key, value) in &point.tags {
        line.push(',');
        escape_key(key, &mut line);
        line.push('=');
        escape_key(value, &mut line);
    }

    let mut first = true;
    for (key, value) in &point.fields {
        // NaN and infinities have no line-protocol encoding.
        if let FieldValue::Float(v) = value {
            if !v.is_finite() {
                continue;
            }
        }
        line.push(if first { ' ' } else { ',' });
        first = false;
        escape_key(key, &mut line);
        line.push('=');
        match value {
            FieldValue::Float(v) => write!(line, "{v}").map_err(sink_err)?,
            FieldValue::String(s) => escape_string_value(s, &mut line),
        }
    }
    if first {
        return Err(sink_err(format!(
            "point for '{}' has no encodable fields",
            point.measurement
        )));
    }

    let nanos = point
        .timestamp
        .timestamp_nanos_opt()
        .ok_or_else(|| sink_err(format!("timestamp {} out of range", point.timestamp)))?;
    write!(line, " {nanos}").map_err(sink_err)?;
    Ok(line)
}

impl<W: Write + Send> PointSink for LineProtocolSink<W> {
    fn add_point(&mut self, point: &EmittedPoint) -> Result<(), CoreError> {
        let line = render_line(point)?;
        self.staged.push_str(&line);
        self.staged.push('\n');
        Ok(())
    }

    fn flush(&mut self) -> Result<(), CoreError> {
        let staged = std::mem::take(&mut self.staged);
        self.out.write_all(staged.as_bytes()).map_err(sink_err)?;
        self.out.flush().map_err(sink_err)
    }

    fn discard(&mut self) {
        self.staged.clear();
    }
}

// ── JSON lines ───────────────────────────────────────────────────────

/// Writes one compact JSON object per point.
#[derive(Debug)]
pub struct JsonSink<W> {
    out: W,
    staged: Vec<u8>,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            staged: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> PointSink for JsonSink<W> {
    fn add_point(&mut self, point: &EmittedPoint) -> Result<(), CoreError> {
        let mut encoded = serde_json::to_vec(point).map_err(sink_err)?;
        encoded.push(b'\n');
        self.staged.append(&mut encoded);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), CoreError> {
        let staged = std::mem::take(&mut self.staged);
        self.out.write_all(&staged).map_err(sink_err)?;
        self.out.flush().map_err(sink_err)
    }

    fn discard(&mut self) {
        self.staged.clear();
    }
}
