// Metronome - A buffered Statsd client for Rust!
//
// Copyright 2018 Philip Jenvey <pjenvey@mozilla.com>
// Copyright 2018-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Conversion between `Metric` instances and the statsd line format.
//!
//! Each metric is a single line of the form
//!
//! ``` text
//! <name>:<value>|<type>|@<sample rate>|#<tag1>,<tag2>
//! ```
//!
//! The sample rate segment is omitted when the rate is `1` and the tag
//! segment is omitted when there are no tags. Gauge deltas always carry an
//! explicit `+` or `-` sign.

use crate::builder::SampleRate;
use crate::types::{ErrorKind, Metric, MetricError, MetricResult, MetricType, MetricValue};
use std::fmt::Write;

const TAG_PREFIX: &str = "|#";

#[rustfmt::skip]
fn size_hint(metric: &Metric) -> usize {
    // name, value, and type, then any sample rate and tags. counting up front
    // saves reallocating the string while the segments are written.
    let base = metric.name().len() + 1 /* : */ + 21 /* value */ + 1 /* | */ + 2 /* type */;
    let rate = if metric.rate().is_one() { 0 } else { 2 /* |@ */ + 20 };
    let tags = if metric.tags().is_empty() {
        0
    } else {
        TAG_PREFIX.len() + metric.tags().iter().map(|t| t.len()).sum::<usize>() + metric.tags().len() - 1
    };

    base + rate + tags
}

fn write_value(metric: &Metric, out: &mut String) {
    let value = metric.value();

    if metric.is_delta() {
        let _ = match value {
            MetricValue::Signed(v) if v < 0 => write!(out, "-{}", v.unsigned_abs()),
            MetricValue::Signed(v) => write!(out, "+{}", v),
            MetricValue::Unsigned(v) => write!(out, "+{}", v),
            MetricValue::Float(v) if v < 0.0 => write!(out, "-{}", -v),
            MetricValue::Float(v) => write!(out, "+{}", v.abs()),
        };
    } else {
        let _ = match value {
            // avoid "-0", which would read as a delta for gauges
            MetricValue::Float(v) if v == 0.0 => write!(out, "0"),
            v => write!(out, "{}", v),
        };
    }
}

/// Encode a metric as a single statsd line, without a trailing newline.
///
/// # Example
///
/// ```
/// use metronome::{codec, Metric, MetricType, MetricValue};
///
/// let metric = Metric::new(MetricType::Histogram, "num.results", MetricValue::Unsigned(44))
///     .and_then(|m| m.with_sample_rate(0.5))
///     .and_then(|m| m.with_tags(["environment:dev"]))
///     .unwrap();
///
/// assert_eq!("num.results:44|h|@0.5|#environment:dev", codec::encode(&metric));
/// ```
pub fn encode(metric: &Metric) -> String {
    let mut out = String::with_capacity(size_hint(metric));

    out.push_str(metric.name());
    out.push(':');
    write_value(metric, &mut out);
    out.push('|');
    out.push_str(metric.metric_type().code());

    if !metric.rate().is_one() {
        out.push('|');
        let _ = write!(out, "{}", metric.rate());
    }

    if !metric.tags().is_empty() {
        out.push_str(TAG_PREFIX);
        for (i, tag) in metric.tags().iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(tag);
        }
    }

    out
}

fn invalid(line: &str, reason: &str) -> MetricError {
    MetricError::from((ErrorKind::InvalidMetric, format!("{}: {:?}", reason, line)))
}

fn parse_value(raw: &str, line: &str) -> MetricResult<MetricValue> {
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(MetricValue::Signed(v));
    }

    if let Ok(v) = raw.parse::<u64>() {
        return Ok(MetricValue::Unsigned(v));
    }

    // f64 parsing also accepts "inf" and "NaN", those are rejected when the
    // metric is validated.
    raw.parse::<f64>()
        .map(MetricValue::Float)
        .map_err(|_| invalid(line, "Malformed metric value"))
}

/// Decode a single statsd line into a `Metric`.
///
/// The capture timestamp of the returned metric is the time of decoding.
///
/// # Failures
///
/// Fails with `ErrorKind::InvalidMetric` if the line is not a well formed
/// statsd metric or the metric it describes is not valid.
pub fn decode(line: &str) -> MetricResult<Metric> {
    decode_line(line, false)
}

/// Decode a single statsd line, accepting lines this client would never
/// produce but that other statsd clients send.
///
/// Compared to `decode`:
///
/// * Segments other than a sample rate or tags, such as the Datadog
///   container ID (`|c:<id>`) or timestamp (`|T<secs>`) extensions, are
///   ignored.
/// * A sample rate on a gauge or set is ignored since servers don't apply
///   it to those types.
///
/// Malformed names, values, types, sample rates, and tags are still errors.
///
/// # Example
///
/// ```
/// use metronome::codec;
///
/// assert!(codec::decode("page.views:1|c|#env:dev|c:abc123").is_err());
///
/// let metric = codec::decode_lenient("page.views:1|c|#env:dev|c:abc123").unwrap();
/// assert_eq!("page.views:1|c|#env:dev", codec::encode(&metric));
/// ```
pub fn decode_lenient(line: &str) -> MetricResult<Metric> {
    decode_line(line, true)
}

fn decode_line(line: &str, lenient: bool) -> MetricResult<Metric> {
    let (name, rest) = line
        .split_once(':')
        .ok_or_else(|| invalid(line, "Missing ':' after metric name"))?;

    let mut segments = rest.split('|');
    let raw_value = segments.next().unwrap_or_default();
    let type_ = segments
        .next()
        .and_then(MetricType::from_code)
        .ok_or_else(|| invalid(line, "Missing or unknown metric type"))?;

    let mut rate = SampleRate::ONE;
    let mut tags = Vec::new();
    let mut seen_rate = false;
    let mut seen_tags = false;

    for segment in segments {
        if let Some(raw_rate) = segment.strip_prefix('@') {
            if seen_rate || seen_tags {
                return Err(invalid(line, "Unexpected sample rate segment"));
            }
            let parsed = raw_rate
                .parse::<f64>()
                .map_err(|_| invalid(line, "Malformed sample rate"))?;
            rate = SampleRate::try_from(parsed)?;
            seen_rate = true;
        } else if let Some(raw_tags) = segment.strip_prefix('#') {
            if seen_tags {
                return Err(invalid(line, "Unexpected tag segment"));
            }
            tags.extend(raw_tags.split(',').map(str::to_string));
            seen_tags = true;
        } else if !lenient {
            return Err(invalid(line, "Unknown segment"));
        }
    }

    if lenient && !type_.is_sampleable() {
        rate = SampleRate::ONE;
    }

    let delta = type_ == MetricType::Gauge && raw_value.starts_with(['+', '-']);
    let value = parse_value(raw_value, line)?;

    Metric::from_parts(type_, name.to_string(), value, rate, tags, delta)
}

/// Decode every non-empty line of a (possibly multi-line) payload.
pub fn decode_packet(payload: &str) -> Vec<MetricResult<Metric>> {
    payload
        .lines()
        .filter(|line| !line.is_empty())
        .map(decode)
        .collect()
}

/// Decode every non-empty line of a payload using `decode_lenient`.
pub fn decode_packet_lenient(payload: &str) -> Vec<MetricResult<Metric>> {
    payload
        .lines()
        .filter(|line| !line.is_empty())
        .map(decode_lenient)
        .collect()
}
