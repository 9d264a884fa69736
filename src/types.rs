// Metronome - A buffered Statsd client for Rust!
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::builder::SampleRate;
use std::error;
use std::fmt;
use std::io;
use std::time::Instant;

/// Type of metric that knows how to display itself as a wire type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    Counter,
    Gauge,
    Set,
    Histogram,
    Distribution,
    Timer,
}

impl MetricType {
    /// The statsd type code used on the wire for this type of metric.
    pub fn code(&self) -> &'static str {
        match *self {
            MetricType::Counter => "c",
            MetricType::Gauge => "g",
            MetricType::Set => "s",
            MetricType::Histogram => "h",
            MetricType::Distribution => "d",
            MetricType::Timer => "ms",
        }
    }

    /// Parse a statsd type code, returning `None` for unknown codes.
    pub fn from_code(code: &str) -> Option<MetricType> {
        match code {
            "c" => Some(MetricType::Counter),
            "g" => Some(MetricType::Gauge),
            "s" => Some(MetricType::Set),
            "h" => Some(MetricType::Histogram),
            "d" => Some(MetricType::Distribution),
            "ms" => Some(MetricType::Timer),
            _ => None,
        }
    }

    /// Whether the receiver can scale this type of metric by a sample rate.
    pub(crate) fn is_sampleable(&self) -> bool {
        matches!(
            *self,
            MetricType::Counter | MetricType::Histogram | MetricType::Distribution | MetricType::Timer
        )
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.code().fmt(f)
    }
}

/// Holder for primitive metric values that knows how to display itself
///
/// Values compare numerically: the wire format does not distinguish `5`
/// from `5.0`, so neither does equality. Integers and floats are compared
/// exactly, without rounding the integer to the nearest `f64`.
#[derive(Debug, Clone, Copy)]
pub enum MetricValue {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            MetricValue::Signed(v) => v as f64,
            MetricValue::Unsigned(v) => v as f64,
            MetricValue::Float(v) => v,
        }
    }

    fn is_finite(&self) -> bool {
        match *self {
            MetricValue::Float(v) => v.is_finite(),
            _ => true,
        }
    }

    fn is_negative(&self) -> bool {
        match *self {
            MetricValue::Signed(v) => v < 0,
            MetricValue::Unsigned(_) => false,
            MetricValue::Float(v) => v.is_sign_negative() && v != 0.0,
        }
    }

    // Floats with a fractional part (or NaN and infinities) have no integer form.
    fn as_exact_int(&self) -> Option<i128> {
        match *self {
            MetricValue::Signed(v) => Some(i128::from(v)),
            MetricValue::Unsigned(v) => Some(i128::from(v)),
            MetricValue::Float(v) if v.fract() == 0.0 => Some(v as i128),
            MetricValue::Float(_) => None,
        }
    }
}

impl PartialEq for MetricValue {
    fn eq(&self, other: &MetricValue) -> bool {
        match (*self, *other) {
            (MetricValue::Float(a), MetricValue::Float(b)) => a == b,
            (a, b) => match (a.as_exact_int(), b.as_exact_int()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricValue::Signed(v) => v.fmt(f),
            MetricValue::Unsigned(v) => v.fmt(f),
            MetricValue::Float(v) => v.fmt(f),
        }
    }
}

/// A single, validated statsd metric.
///
/// Instances are immutable once constructed. Methods that appear to modify a
/// metric consume it and return a newly validated one. Equality ignores the
/// capture timestamp since it is never sent over the wire.
#[derive(Debug, Clone)]
pub struct Metric {
    name: String,
    type_: MetricType,
    value: MetricValue,
    rate: SampleRate,
    tags: Vec<String>,
    delta: bool,
    timestamp: Instant,
}

impl Metric {
    /// Create a new metric with no tags and a sample rate of `1`.
    ///
    /// # Example
    ///
    /// ```
    /// use metronome::{Metric, MetricType, MetricValue};
    ///
    /// let metric = Metric::new(MetricType::Counter, "some.counter", MetricValue::Signed(1)).unwrap();
    /// assert_eq!("some.counter:1|c", metric.to_string());
    /// ```
    ///
    /// # Failures
    ///
    /// Fails with `ErrorKind::InvalidMetric` if the name is empty or contains
    /// characters outside of `[a-zA-Z0-9_.-]`, if the value is not finite, or
    /// if the metric is a gauge with a negative value.
    pub fn new<N>(type_: MetricType, name: N, value: MetricValue) -> MetricResult<Metric>
    where
        N: Into<String>,
    {
        Self::from_parts(type_, name.into(), value, SampleRate::ONE, Vec::new(), false)
    }

    pub(crate) fn from_parts(
        type_: MetricType,
        name: String,
        value: MetricValue,
        rate: SampleRate,
        tags: Vec<String>,
        delta: bool,
    ) -> MetricResult<Metric> {
        validate_name(&name)?;

        if !value.is_finite() {
            return Err(MetricError::from((ErrorKind::InvalidMetric, "Metric value must be finite")));
        }

        if delta && type_ != MetricType::Gauge {
            return Err(MetricError::from((
                ErrorKind::InvalidMetric,
                "Only gauges may be delta encoded",
            )));
        }

        if type_ == MetricType::Gauge && !delta && value.is_negative() {
            return Err(MetricError::from((
                ErrorKind::InvalidMetric,
                "Absolute gauge values must not be negative, use a delta instead",
            )));
        }

        if !rate.is_one() && !type_.is_sampleable() {
            return Err(MetricError::from((
                ErrorKind::InvalidMetric,
                "Sample rates only apply to counters, histograms, distributions, and timers",
            )));
        }

        for tag in tags.iter() {
            validate_tag(tag)?;
        }

        Ok(Metric {
            name,
            type_,
            value,
            rate,
            tags,
            delta,
            timestamp: Instant::now(),
        })
    }

    /// Return a copy of this metric with the given sample rate.
    pub fn with_sample_rate(self, rate: f64) -> MetricResult<Metric> {
        let rate = SampleRate::try_from(rate)?;
        Self::from_parts(self.type_, self.name, self.value, rate, self.tags, self.delta)
    }

    /// Return a copy of this metric with the given `key:value` tags appended.
    pub fn with_tags<I, T>(self, tags: I) -> MetricResult<Metric>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut all = self.tags;
        all.extend(tags.into_iter().map(Into::into));
        Self::from_parts(self.type_, self.name, self.value, self.rate, all, self.delta)
    }

    /// Create a new gauge that adjusts the value known by the receiver by a
    /// signed amount instead of replacing it.
    ///
    /// # Example
    ///
    /// ```
    /// use metronome::{Metric, MetricValue};
    ///
    /// let metric = Metric::new_delta("foo", MetricValue::Signed(-3)).unwrap();
    /// assert_eq!("foo:-3|g", metric.to_string());
    /// ```
    pub fn new_delta<N>(name: N, value: MetricValue) -> MetricResult<Metric>
    where
        N: Into<String>,
    {
        Self::from_parts(MetricType::Gauge, name.into(), value, SampleRate::ONE, Vec::new(), true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metric_type(&self) -> MetricType {
        self.type_
    }

    pub fn value(&self) -> MetricValue {
        self.value
    }

    pub fn sample_rate(&self) -> f64 {
        self.rate.value()
    }

    pub(crate) fn rate(&self) -> &SampleRate {
        &self.rate
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_delta(&self) -> bool {
        self.delta
    }

    /// The instant at which this metric was captured.
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }
}

impl PartialEq for Metric {
    fn eq(&self, other: &Metric) -> bool {
        self.name == other.name
            && self.type_ == other.type_
            && self.value == other.value
            && self.rate == other.rate
            && self.tags == other.tags
            && self.delta == other.delta
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::codec::encode(self))
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b'-'
}

pub(crate) fn validate_name(name: &str) -> MetricResult<()> {
    if name.is_empty() {
        return Err(MetricError::from((ErrorKind::InvalidMetric, "Metric name must not be empty")));
    }

    if !name.bytes().all(is_name_byte) {
        return Err(MetricError::from((
            ErrorKind::InvalidMetric,
            format!("Metric name {:?} may only contain [a-zA-Z0-9_.-]", name),
        )));
    }

    Ok(())
}

pub(crate) fn validate_tag(tag: &str) -> MetricResult<()> {
    if tag.contains(|c| matches!(c, '|' | ',' | '\n' | '\r')) {
        return Err(MetricError::from((
            ErrorKind::InvalidMetric,
            format!("Tag {:?} must not contain '|', ',' or line breaks", tag),
        )));
    }

    match tag.split_once(':') {
        Some((key, _)) if !key.is_empty() && !key.starts_with('#') => Ok(()),
        _ => Err(MetricError::from((
            ErrorKind::InvalidMetric,
            format!("Tag {:?} must be of the form key:value", tag),
        ))),
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// A metric name, tag, value, or sample rate was malformed.
    InvalidMetric,
    /// The client (or its aggregator) has been shut down.
    ClientClosed,
    /// Configuration or address input was invalid.
    InvalidInput,
    IoError,
}

/// Error generated by this library for invalid metrics, closed clients, or
/// configuration and I/O problems.
///
/// Note that transport failures encountered while actually sending metrics
/// are never returned to callers. They are counted, logged, and passed to
/// the error handler of the client.
#[derive(Debug)]
pub struct MetricError {
    repr: ErrorRepr,
}

#[derive(Debug)]
enum ErrorRepr {
    WithDescription(ErrorKind, &'static str),
    WithDetail(ErrorKind, String),
    IoError(io::Error),
}

impl MetricError {
    /// Return the kind of the error
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::IoError(_) => ErrorKind::IoError,
            ErrorRepr::WithDescription(kind, _) => kind,
            ErrorRepr::WithDetail(kind, _) => kind,
        }
    }
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr {
            ErrorRepr::IoError(ref err) => err.fmt(f),
            ErrorRepr::WithDescription(_, desc) => desc.fmt(f),
            ErrorRepr::WithDetail(_, ref desc) => desc.fmt(f),
        }
    }
}

impl error::Error for MetricError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.repr {
            ErrorRepr::IoError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MetricError {
    fn from(err: io::Error) -> MetricError {
        MetricError {
            repr: ErrorRepr::IoError(err),
        }
    }
}

impl From<(ErrorKind, &'static str)> for MetricError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> MetricError {
        MetricError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

impl From<(ErrorKind, String)> for MetricError {
    fn from((kind, desc): (ErrorKind, String)) -> MetricError {
        MetricError {
            repr: ErrorRepr::WithDetail(kind, desc),
        }
    }
}

pub type MetricResult<T> = Result<T, MetricError>;
