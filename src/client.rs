// Metronome - A buffered Statsd client for Rust!
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::aggregator::Aggregator;
use crate::builder::MetricBuilder;
use crate::codec;
use crate::config::{ClientConfig, DEFAULT_FLUSH_INTERVAL};
use crate::io::BufferStats;
use crate::sinks::{MetricSink, NopMetricSink, SinkStats, UdpMetricSink};
use crate::transport::{BoxedSink, ErrorHandler, Transport};
use crate::types::{ErrorKind, Metric, MetricError, MetricResult, MetricType, MetricValue};
use std::fmt;
use std::panic::RefUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Conversion trait for valid values for counters
///
/// This trait must be implemented for any types that are used as counter
/// values (currently only `i64`). This trait is internal to how values are
/// formatted as part of metrics but is exposed publicly for documentation
/// purposes.
///
/// Typical use of Metronome shouldn't require interacting with this trait.
pub trait ToCounterValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToCounterValue for i64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Signed(self))
    }
}

/// Conversion trait for valid values for timers
///
/// This trait must be implemented for any types that are used as timer
/// values (currently `u64` and `Duration`). This trait is internal to how
/// values are formatted as part of metrics but is exposed publicly for
/// documentation purposes.
///
/// Typical use of Metronome shouldn't require interacting with this trait.
pub trait ToTimerValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToTimerValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToTimerValue for Duration {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        duration_to_millis(self)
    }
}

fn duration_to_millis(d: Duration) -> MetricResult<MetricValue> {
    let as_millis = d.as_millis();
    if as_millis > u64::MAX as u128 {
        Err(MetricError::from((ErrorKind::InvalidMetric, "u64 overflow")))
    } else {
        Ok(MetricValue::Unsigned(as_millis as u64))
    }
}

/// Conversion trait for valid values for gauges
///
/// This trait must be implemented for any types that are used as absolute
/// gauge values (currently `u64` and `f64`). This trait is internal to how
/// values are formatted as part of metrics but is exposed publicly for
/// documentation purposes.
///
/// Typical use of Metronome shouldn't require interacting with this trait.
pub trait ToGaugeValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToGaugeValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToGaugeValue for f64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Float(self))
    }
}

/// Conversion trait for valid values for gauge adjustments
///
/// This trait must be implemented for any types that are used as signed
/// gauge deltas (currently `i64` and `f64`).
///
/// Typical use of Metronome shouldn't require interacting with this trait.
pub trait ToGaugeDeltaValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToGaugeDeltaValue for i64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Signed(self))
    }
}

impl ToGaugeDeltaValue for f64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Float(self))
    }
}

/// Conversion trait for valid values for histograms
///
/// This trait must be implemented for any types that are used as histogram
/// values (currently `u64`, `f64`, and `Duration`). `Duration` values are
/// recorded in milliseconds.
///
/// Typical use of Metronome shouldn't require interacting with this trait.
pub trait ToHistogramValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToHistogramValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToHistogramValue for f64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Float(self))
    }
}

impl ToHistogramValue for Duration {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        duration_to_millis(self)
    }
}

/// Conversion trait for valid values for distributions
///
/// This trait must be implemented for any types that are used as distribution
/// values (currently `u64` and `f64`).
///
/// Typical use of Metronome shouldn't require interacting with this trait.
pub trait ToDistributionValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToDistributionValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToDistributionValue for f64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Float(self))
    }
}

/// Conversion trait for valid values for sets
///
/// This trait must be implemented for any types that are used as counter
/// values (currently only `i64`).
///
/// Typical use of Metronome shouldn't require interacting with this trait.
pub trait ToSetValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToSetValue for i64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Signed(self))
    }
}

/// Trait for incrementing and decrementing counters.
///
/// Counters are simple values incremented or decremented by a client. The
/// rates at which these events occur or average values will be determined
/// by the server receiving them. Examples of counter uses include number
/// of logins to a system or requests received.
///
/// The following types are valid for counters:
/// * `i64`
///
/// See the [Statsd spec](https://github.com/b/statsd_spec) for more
/// information.
///
/// Note that tags are a [Datadog](https://docs.datadoghq.com/developers/dogstatsd/)
/// extension to Statsd and may not be supported by your server.
pub trait Counted<T>
where
    T: ToCounterValue,
{
    /// Increment or decrement the counter by the given amount
    fn count(&self, key: &str, count: T) -> MetricResult<()> {
        self.count_with_tags(key, count).send()
    }

    /// Increment or decrement the counter by the given amount and return
    /// a `MetricBuilder` that can be used to add tags to the metric.
    fn count_with_tags(&self, key: &str, count: T) -> MetricBuilder<'_>;
}

/// Trait for convenience methods for counters
///
/// This trait specifically implements increment and decrement convenience
/// methods for counters with `i64` types.
pub trait CountedExt: Counted<i64> {
    /// Increment the counter by 1
    fn incr(&self, key: &str) -> MetricResult<()> {
        self.incr_with_tags(key).send()
    }

    /// Increment the counter by 1 and return a `MetricBuilder` that can
    /// be used to add tags to the metric.
    fn incr_with_tags(&self, key: &str) -> MetricBuilder<'_> {
        self.count_with_tags(key, 1)
    }

    /// Increment the counter by the given amount
    fn incr_by(&self, key: &str, amount: u64) -> MetricResult<()> {
        self.count(key, counter_amount(amount)?)
    }

    /// Decrement the counter by 1
    fn decr(&self, key: &str) -> MetricResult<()> {
        self.decr_with_tags(key).send()
    }

    /// Decrement the counter by 1 and return a `MetricBuilder` that can
    /// be used to add tags to the metric.
    fn decr_with_tags(&self, key: &str) -> MetricBuilder<'_> {
        self.count_with_tags(key, -1)
    }

    /// Decrement the counter by the given amount
    fn decr_by(&self, key: &str, amount: u64) -> MetricResult<()> {
        self.count(key, -counter_amount(amount)?)
    }
}

fn counter_amount(amount: u64) -> MetricResult<i64> {
    i64::try_from(amount).map_err(|_| MetricError::from((ErrorKind::InvalidMetric, "Counter amount overflows i64")))
}

/// Trait for recording timings in milliseconds.
///
/// Timings are a positive number of milliseconds between a start and end
/// time. Examples include time taken to render a web page or time taken
/// for a database call to return. `Duration` values are converted to
/// milliseconds before being recorded.
///
/// The following types are valid for timers:
/// * `u64`
/// * `Duration`
///
/// See the [Statsd spec](https://github.com/b/statsd_spec) for more
/// information.
///
/// Note that tags are a [Datadog](https://docs.datadoghq.com/developers/dogstatsd/)
/// extension to Statsd and may not be supported by your server.
pub trait Timed<T>
where
    T: ToTimerValue,
{
    /// Record a timing in milliseconds with the given key
    fn time(&self, key: &str, time: T) -> MetricResult<()> {
        self.time_with_tags(key, time).send()
    }

    /// Record a timing in milliseconds with the given key and return a
    /// `MetricBuilder` that can be used to add tags to the metric.
    fn time_with_tags(&self, key: &str, time: T) -> MetricBuilder<'_>;
}

/// Trait for recording gauge values.
///
/// Gauge values are an instantaneous measurement of a value determined
/// by the client. They do not change unless changed by the client. Examples
/// include things like load average or how many connections are active.
///
/// The following types are valid for gauges:
/// * `u64`
/// * `f64`, which must not be negative
///
/// A leading sign on the wire marks a gauge as an adjustment rather than an
/// absolute value, so negative absolute values can't be sent. Use
/// `DeltaGauged` to move a gauge up or down instead.
///
/// See the [Statsd spec](https://github.com/b/statsd_spec) for more
/// information.
///
/// Note that tags are a [Datadog](https://docs.datadoghq.com/developers/dogstatsd/)
/// extension to Statsd and may not be supported by your server.
pub trait Gauged<T>
where
    T: ToGaugeValue,
{
    /// Record a gauge value with the given key
    fn gauge(&self, key: &str, value: T) -> MetricResult<()> {
        self.gauge_with_tags(key, value).send()
    }

    /// Record a gauge value with the given key and return a `MetricBuilder`
    /// that can be used to add tags to the metric.
    fn gauge_with_tags(&self, key: &str, value: T) -> MetricBuilder<'_>;
}

/// Trait for adjusting gauge values relative to their current value.
///
/// The client keeps no state about gauges. The adjustment is sent with an
/// explicit `+` or `-` sign and applied by the server.
///
/// The following types are valid for gauge deltas:
/// * `i64`
/// * `f64`
pub trait DeltaGauged<T>
where
    T: ToGaugeDeltaValue,
{
    /// Adjust a gauge by a signed amount
    fn gauge_delta(&self, key: &str, delta: T) -> MetricResult<()> {
        self.gauge_delta_with_tags(key, delta).send()
    }

    /// Adjust a gauge by a signed amount and return a `MetricBuilder` that
    /// can be used to add tags to the metric.
    fn gauge_delta_with_tags(&self, key: &str, delta: T) -> MetricBuilder<'_>;
}

/// Trait for recording histogram values.
///
/// Histogram values are positive values that can represent anything, whose
/// statistical distribution is calculated by the server. The values can be
/// timings, amount of some resource consumed, size of HTTP responses in
/// some application, etc. Histograms can be thought of as a more general
/// form of timers. `Duration` values are converted to milliseconds before
/// being recorded.
///
/// The following types are valid for histograms:
/// * `u64`
/// * `f64`
/// * `Duration`
///
/// Note that histograms are a Datadog extension to Statsd and may not be
/// supported by your server.
pub trait Histogrammed<T>
where
    T: ToHistogramValue,
{
    /// Record a single histogram value with the given key
    fn histogram(&self, key: &str, value: T) -> MetricResult<()> {
        self.histogram_with_tags(key, value).send()
    }

    /// Record a single histogram value with the given key and return a
    /// `MetricBuilder` that can be used to add tags to the metric.
    fn histogram_with_tags(&self, key: &str, value: T) -> MetricBuilder<'_>;
}

/// Trait for recording distribution values.
///
/// Similar to histograms, but applies globally. A distribution can be used to
/// instrument logical objects, like services, independently from the underlying
/// hosts.
///
/// The following types are valid for distributions:
/// * `u64`
/// * `f64`
///
/// Note that distributions are a Datadog extension to Statsd and may not be
/// supported by your server.
pub trait Distributed<T>
where
    T: ToDistributionValue,
{
    /// Record a single distribution value with the given key
    fn distribution(&self, key: &str, value: T) -> MetricResult<()> {
        self.distribution_with_tags(key, value).send()
    }

    /// Record a single distribution value with the given key and return a
    /// `MetricBuilder` that can be used to add tags to the metric.
    fn distribution_with_tags(&self, key: &str, value: T) -> MetricBuilder<'_>;
}

/// Trait for recording set values.
///
/// Sets count the number of unique elements in a group. You can use them to,
/// for example, count the unique visitors to your site.
///
/// The following types are valid for sets:
/// * `i64`
///
/// See the [Statsd spec](https://github.com/b/statsd_spec) for more
/// information.
pub trait Setted<T>
where
    T: ToSetValue,
{
    /// Record a single set value with the given key
    fn set(&self, key: &str, value: T) -> MetricResult<()> {
        self.set_with_tags(key, value).send()
    }

    /// Record a single set value with the given key and return a
    /// `MetricBuilder` that can be used to add tags to the metric.
    fn set_with_tags(&self, key: &str, value: T) -> MetricBuilder<'_>;
}

/// Trait that encompasses all other traits for sending metrics.
///
/// If you wish to use `StatsdClient` with a generic type or place a
/// `StatsdClient` instance behind a pointer (such as a `Box`) this will allow
/// you to reference all the implemented methods for recording metrics, while
/// using a single trait. An example of this is shown below.
///
/// ```
/// use std::time::Duration;
/// use metronome::{MetricClient, StatsdClient, NopMetricSink};
///
/// let client: Box<dyn MetricClient> = Box::new(StatsdClient::from_sink(
///     "prefix", NopMetricSink));
///
/// client.count("some.counter", 1).unwrap();
/// client.time("some.timer", 42).unwrap();
/// client.time("some.timer", Duration::from_millis(42)).unwrap();
/// client.gauge("some.gauge", 8).unwrap();
/// client.gauge_delta("some.gauge", -3).unwrap();
/// client.histogram("some.histogram", 4).unwrap();
/// client.distribution("some.distribution", 4.5).unwrap();
/// client.set("some.set", 5).unwrap();
/// ```
pub trait MetricClient:
    Counted<i64>
    + CountedExt
    + Timed<u64>
    + Timed<Duration>
    + Gauged<u64>
    + Gauged<f64>
    + DeltaGauged<i64>
    + DeltaGauged<f64>
    + Histogrammed<u64>
    + Histogrammed<f64>
    + Histogrammed<Duration>
    + Distributed<u64>
    + Distributed<f64>
    + Setted<i64>
{
}

/// Typically used to create a `StatsdClient` from a custom sink with
/// buffering, default tags, or an error handler.
///
/// The builder may be used to set each of these options when creating a
/// client. By default, each payload is sent as soon as it is recorded and a
/// no-op error handler is used.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use metronome::prelude::*;
/// use metronome::{MetricError, StatsdClient, NopMetricSink};
///
/// fn my_error_handler(err: MetricError) {
///     eprintln!("Error sending metrics: {}", err);
/// }
///
/// let client = StatsdClient::builder("my.prefix", NopMetricSink)
///     .buffered(1432)
///     .flush_interval(Duration::from_millis(500))
///     .with_error_handler(my_error_handler)
///     .with_tag("environment", "production")
///     .build();
///
/// client.count("something", 123).unwrap();
/// client.count_with_tags("some.counter", 42)
///     .with_tag("region", "us-east-2")
///     .send()
///     .unwrap();
/// ```
pub struct StatsdClientBuilder {
    prefix: String,
    sink: BoxedSink,
    errors: ErrorHandler,
    tags: Vec<String>,
    max_packet_size: Option<usize>,
    flush_interval: Duration,
}

impl StatsdClientBuilder {
    // Set the required fields and defaults for optional fields
    fn new<T>(prefix: &str, sink: T) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        StatsdClientBuilder {
            // required
            prefix: Self::formatted_prefix(prefix),
            sink: Box::new(sink),

            // optional with defaults
            errors: Box::new(nop_error_handler),
            tags: Vec::new(),
            max_packet_size: None,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }

    /// Coalesce metrics into payloads of at most `max_packet_size` bytes
    /// instead of sending each metric on its own.
    ///
    /// A single metric longer than `max_packet_size` is still sent, on its
    /// own, after anything already buffered.
    pub fn buffered(self, max_packet_size: usize) -> Self {
        StatsdClientBuilder {
            max_packet_size: Some(max_packet_size),
            ..self
        }
    }

    /// Set how often buffered metrics are sent even if the buffer isn't full.
    ///
    /// A zero interval means buffered metrics are only sent when the buffer
    /// is full or the client is flushed or shut down. Has no effect unless
    /// the client is `buffered`.
    pub fn flush_interval(self, flush_interval: Duration) -> Self {
        StatsdClientBuilder { flush_interval, ..self }
    }

    /// Set an error handler to use for errors that are not returned to callers
    ///
    /// The error handler is invoked when metrics could not be delivered by the
    /// `MetricSink` and when metrics are dropped because the client has been
    /// shut down. Errors from invalid metrics are returned to the caller
    /// instead.
    ///
    /// The error handler should consume the error without panicking. The error
    /// may be logged, printed to stderr, discarded, etc. - this is up to the
    /// implementation.
    pub fn with_error_handler<F>(mut self, errors: F) -> Self
    where
        F: Fn(MetricError) + Sync + Send + RefUnwindSafe + 'static,
    {
        self.errors = Box::new(errors);
        self
    }

    /// Add a default tag with key and value to every metric published by the
    /// built [StatsdClient].
    pub fn with_tag<K, V>(mut self, key: K, value: V) -> Self
    where
        K: ToString,
        V: ToString,
    {
        self.tags.push(format!("{}:{}", key.to_string(), value.to_string()));
        self
    }

    /// Construct a new `StatsdClient` instance based on current settings.
    pub fn build(self) -> StatsdClient {
        StatsdClient::from_builder(self)
    }

    fn formatted_prefix(prefix: &str) -> String {
        if prefix.is_empty() {
            String::new()
        } else {
            format!("{}.", prefix.trim_end_matches('.'))
        }
    }
}

/// I/O telemetry for a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Payloads sent or dropped by the sink.
    pub sink: SinkStats,
    /// How metrics were buffered. All zeros for unbuffered clients.
    pub buffer: BufferStats,
}

#[derive(Debug)]
enum Pipeline {
    Direct(AtomicBool),
    Buffered(Aggregator),
    Disabled,
}

/// Client for Statsd that implements various traits to record metrics.
///
/// # Traits
///
/// The client is the main entry point for users of this library. It supports
/// several traits for recording metrics of different types.
///
/// * `Counted` for emitting counters.
/// * `Timed` for emitting timings.
/// * `Gauged` for emitting gauge values.
/// * `DeltaGauged` for adjusting gauge values.
/// * `Histogrammed` for emitting histogram values.
/// * `Distributed` for emitting distribution values.
/// * `Setted` for emitting set values.
/// * `MetricClient` for a combination of all of the above.
///
/// For more information about the uses for each type of metric, see the
/// documentation for each mentioned trait.
///
/// # Buffering
///
/// Clients created from a `ClientConfig` buffer metrics by default: lines are
/// joined into payloads no larger than the configured packet size, which are
/// sent when full, every flush interval, when `.flush()` is called, and when
/// the client is shut down or dropped.
///
/// # Threading
///
/// The `StatsdClient` is designed to work in a multithreaded application. All
/// parts of the client can be shared between threads (i.e. it is `Send` and
/// `Sync`). There is no global instance: share a client by reference or by
/// wrapping it in an `Arc`.
///
/// ``` no_run
/// use std::sync::Arc;
/// use std::thread;
/// use metronome::prelude::*;
/// use metronome::{ClientConfig, StatsdClient};
///
/// let client = Arc::new(StatsdClient::from_config(ClientConfig::default()).unwrap());
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let client = Arc::clone(&client);
///         thread::spawn(move || {
///             client.incr("request.handler").unwrap();
///         })
///     })
///     .collect();
///
/// for h in handles {
///     h.join().unwrap();
/// }
///
/// client.shutdown();
/// ```
pub struct StatsdClient {
    prefix: String,
    tags: Vec<String>,
    transport: Arc<Transport>,
    pipeline: Pipeline,
}

impl StatsdClient {
    /// Create a new client that sends metrics over UDP to the host and port
    /// in the given configuration, from a non-blocking socket bound to an
    /// ephemeral local port.
    ///
    /// # Example
    ///
    /// ```
    /// use metronome::prelude::*;
    /// use metronome::{ClientConfig, StatsdClient};
    ///
    /// let config = ClientConfig::default().with_prefix("my.stats");
    /// let client = StatsdClient::from_config(config).unwrap();
    ///
    /// client.incr("some.counter").unwrap();
    /// client.shutdown();
    /// ```
    ///
    /// # Failures
    ///
    /// This method may fail if:
    ///
    /// * It is unable to resolve the hostname of the metric server.
    /// * It is unable to create the local UDP socket.
    pub fn from_config(config: ClientConfig) -> MetricResult<StatsdClient> {
        let sink = UdpMetricSink::connect((config.host(), config.port()))?;
        let mut builder = Self::builder(config.prefix(), sink);
        builder.tags = config.tags().to_vec();

        if config.is_buffered() {
            builder = builder
                .buffered(config.max_packet_size())
                .flush_interval(config.flush_interval().unwrap_or(Duration::ZERO));
        }

        Ok(builder.build())
    }

    /// Create a new client instance that will use the given prefix for
    /// all metrics emitted to the given `MetricSink` implementation. Each
    /// metric is sent as its own payload.
    ///
    /// Note that this client will discard errors from the sink.
    ///
    /// # No-op Example
    ///
    /// ```
    /// use metronome::{StatsdClient, NopMetricSink};
    ///
    /// let prefix = "my.stats";
    /// let client = StatsdClient::from_sink(prefix, NopMetricSink);
    /// ```
    ///
    /// # UDP Socket Example
    ///
    /// ```
    /// use std::net::UdpSocket;
    /// use metronome::{StatsdClient, UdpMetricSink, DEFAULT_PORT};
    ///
    /// let prefix = "my.stats";
    /// let host = ("127.0.0.1", DEFAULT_PORT);
    ///
    /// let socket = UdpSocket::bind("0.0.0.0:0").unwrap();
    /// socket.set_nonblocking(true).unwrap();
    ///
    /// let sink = UdpMetricSink::from(host, socket).unwrap();
    /// let client = StatsdClient::from_sink(prefix, sink);
    /// ```
    pub fn from_sink<T>(prefix: &str, sink: T) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        Self::builder(prefix, sink).build()
    }

    /// Create a new builder with the provided prefix and metric sink.
    ///
    /// A prefix and a metric sink are required to create a new client
    /// instance. All other optional customizations can be set by calling
    /// methods on the returned builder. Any customizations that aren't
    /// set by the caller will use defaults.
    ///
    /// Note, though a metric prefix is required, you may pass an empty
    /// string as a prefix. In this case, the metrics emitted will use only
    /// the bare keys supplied when you call the various methods to emit
    /// metrics.
    ///
    /// General defaults:
    ///
    /// * Metrics are not buffered.
    /// * A no-op error handler will be used by default.
    pub fn builder<T>(prefix: &str, sink: T) -> StatsdClientBuilder
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        StatsdClientBuilder::new(prefix, sink)
    }

    /// Create a client that discards every metric.
    ///
    /// Invalid metrics are still reported to callers. Valid metrics are
    /// dropped as if the client had been shut down.
    pub fn disabled() -> Self {
        StatsdClient {
            prefix: String::new(),
            tags: Vec::new(),
            transport: Arc::new(Transport::new(Box::new(NopMetricSink), Box::new(nop_error_handler))),
            pipeline: Pipeline::Disabled,
        }
    }

    /// Send any buffered metrics now, without waiting for the buffer to fill
    /// or the flush interval to elapse.
    pub fn flush(&self) {
        match self.pipeline {
            Pipeline::Buffered(ref aggregator) => aggregator.flush(),
            Pipeline::Direct(_) => self.transport.flush(),
            Pipeline::Disabled => {}
        }
    }

    /// Send any buffered metrics and stop accepting new ones.
    ///
    /// Metrics recorded after shutdown are dropped (`MetricBuilder::try_send()`
    /// returns `ErrorKind::ClientClosed` for them). Calling this more than once
    /// has no further effect. Dropping a client shuts it down.
    pub fn shutdown(&self) {
        match self.pipeline {
            Pipeline::Buffered(ref aggregator) => aggregator.shutdown(),
            Pipeline::Direct(ref closed) => {
                if !closed.swap(true, Ordering::AcqRel) {
                    self.transport.flush();
                }
            }
            Pipeline::Disabled => {}
        }
    }

    /// Has the client been shut down (or created disabled)?
    pub fn is_closed(&self) -> bool {
        match self.pipeline {
            Pipeline::Buffered(ref aggregator) => aggregator.is_closed(),
            Pipeline::Direct(ref closed) => closed.load(Ordering::Acquire),
            Pipeline::Disabled => true,
        }
    }

    /// Return I/O telemetry like bytes / packets sent or dropped.
    pub fn stats(&self) -> ClientStats {
        let buffer = match self.pipeline {
            Pipeline::Buffered(ref aggregator) => aggregator.stats(),
            _ => BufferStats::default(),
        };

        ClientStats {
            sink: self.transport.stats(),
            buffer,
        }
    }

    /// Start timing an operation. A single timer metric with the elapsed
    /// milliseconds is sent when the returned guard is dropped, including
    /// when it is dropped while unwinding from a panic.
    ///
    /// # Example
    ///
    /// ```
    /// use metronome::{StatsdClient, NopMetricSink};
    ///
    /// let client = StatsdClient::from_sink("my.prefix", NopMetricSink);
    ///
    /// {
    ///     let _timer = client.timed("some.method").with_tag("host", "web01");
    ///     // do some work
    /// }
    /// ```
    pub fn timed(&self, key: &str) -> TimedGuard<'_> {
        TimedGuard {
            client: self,
            key: key.to_string(),
            tags: Vec::new(),
            start: Instant::now(),
        }
    }

    /// Run the given function, sending a timer metric with how long it took.
    pub fn time_fn<F, R>(&self, key: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _timer = self.timed(key);
        f()
    }

    pub(crate) fn default_tags(&self) -> &[String] {
        &self.tags
    }

    pub(crate) fn send_metric(&self, metric: &Metric) -> MetricResult<()> {
        match self.pipeline {
            Pipeline::Buffered(ref aggregator) => aggregator.enqueue(metric),
            Pipeline::Direct(ref closed) if !closed.load(Ordering::Acquire) => {
                self.transport.send(&codec::encode(metric));
                Ok(())
            }
            _ => Err(MetricError::from((ErrorKind::ClientClosed, "Client has been shut down"))),
        }
    }

    pub(crate) fn consume_error(&self, err: MetricError) {
        self.transport.consume_error(err);
    }

    fn builder_for(&self, type_: MetricType, key: &str, value: MetricResult<MetricValue>) -> MetricBuilder<'_> {
        MetricBuilder::new(type_, format!("{}{}", self.prefix, key), value, self)
    }

    // Create a new StatsdClient by consuming the builder
    fn from_builder(builder: StatsdClientBuilder) -> Self {
        let transport = Arc::new(Transport::new(builder.sink, builder.errors));

        let pipeline = match builder.max_packet_size {
            Some(max) => Pipeline::Buffered(Aggregator::new(
                Arc::clone(&transport),
                max,
                Some(builder.flush_interval),
            )),
            None => Pipeline::Direct(AtomicBool::new(false)),
        };

        StatsdClient {
            prefix: builder.prefix,
            tags: builder.tags,
            transport,
            pipeline,
        }
    }
}

impl Default for StatsdClient {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for StatsdClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StatsdClient {{ prefix: {:?}, tags: {:?}, pipeline: {:?}, transport: {:?} }}",
            self.prefix, self.tags, self.pipeline, self.transport,
        )
    }
}

impl<T> Counted<T> for StatsdClient
where
    T: ToCounterValue,
{
    fn count_with_tags(&self, key: &str, value: T) -> MetricBuilder<'_> {
        self.builder_for(MetricType::Counter, key, value.try_to_value())
    }
}

impl CountedExt for StatsdClient {}

impl<T> Timed<T> for StatsdClient
where
    T: ToTimerValue,
{
    fn time_with_tags(&self, key: &str, time: T) -> MetricBuilder<'_> {
        self.builder_for(MetricType::Timer, key, time.try_to_value())
    }
}

impl<T> Gauged<T> for StatsdClient
where
    T: ToGaugeValue,
{
    fn gauge_with_tags(&self, key: &str, value: T) -> MetricBuilder<'_> {
        self.builder_for(MetricType::Gauge, key, value.try_to_value())
    }
}

impl<T> DeltaGauged<T> for StatsdClient
where
    T: ToGaugeDeltaValue,
{
    fn gauge_delta_with_tags(&self, key: &str, delta: T) -> MetricBuilder<'_> {
        self.builder_for(MetricType::Gauge, key, delta.try_to_value()).as_delta()
    }
}

impl<T> Histogrammed<T> for StatsdClient
where
    T: ToHistogramValue,
{
    fn histogram_with_tags(&self, key: &str, value: T) -> MetricBuilder<'_> {
        self.builder_for(MetricType::Histogram, key, value.try_to_value())
    }
}

impl<T> Distributed<T> for StatsdClient
where
    T: ToDistributionValue,
{
    fn distribution_with_tags(&self, key: &str, value: T) -> MetricBuilder<'_> {
        self.builder_for(MetricType::Distribution, key, value.try_to_value())
    }
}

impl<T> Setted<T> for StatsdClient
where
    T: ToSetValue,
{
    fn set_with_tags(&self, key: &str, value: T) -> MetricBuilder<'_> {
        self.builder_for(MetricType::Set, key, value.try_to_value())
    }
}

impl MetricClient for StatsdClient {}

/// Scoped timer returned by `StatsdClient::timed`.
///
/// Sends exactly one timer metric when dropped. Errors are passed to the
/// error handler of the client since they can't be returned from `drop`.
#[must_use = "The timer metric is sent when the guard is dropped"]
#[derive(Debug)]
pub struct TimedGuard<'c> {
    client: &'c StatsdClient,
    key: String,
    tags: Vec<String>,
    start: Instant,
}

impl<'c> TimedGuard<'c> {
    /// Add a `key:value` tag to the timer metric.
    pub fn with_tag<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.tags.push(format!("{}:{}", key.as_ref(), value.as_ref()));
        self
    }

    /// Time elapsed since the guard was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl<'c> Drop for TimedGuard<'c> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        let tags = std::mem::take(&mut self.tags);
        let res = self.client.time_with_tags(&self.key, elapsed).with_tags(tags).send();

        if let Err(err) = res {
            self.client.consume_error(err);
        }
    }
}

fn nop_error_handler(_err: MetricError) {
    // nothing
}

#[cfg(test)]
mod tests {
    use super::{
        Counted, CountedExt, DeltaGauged, Distributed, Gauged, Histogrammed, MetricClient, Setted, StatsdClient,
        Timed,
    };
    use crate::config::ClientConfig;
    use crate::sinks::{NopMetricSink, SpyMetricSink};
    use crate::test::ErrorMetricSink;
    use crate::types::{ErrorKind, MetricError};
    use crossbeam_channel::Receiver;
    use std::panic::{self, AssertUnwindSafe, RefUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn drain(rx: &Receiver<Vec<u8>>) -> Vec<String> {
        rx.try_iter().map(|p| String::from_utf8(p).unwrap()).collect()
    }

    #[test]
    fn test_statsd_client_empty_prefix() {
        let client = StatsdClient::from_sink("", NopMetricSink);
        let res = client.count_with_tags("some.method", 1).try_send();

        assert_eq!("some.method:1|c", res.unwrap().to_string());
    }

    #[test]
    fn test_statsd_client_prefix_trailing_dot() {
        let client = StatsdClient::from_sink("prefix.", NopMetricSink);
        let res = client.count_with_tags("some.method", 1).try_send();

        assert_eq!("prefix.some.method:1|c", res.unwrap().to_string());
    }

    #[test]
    fn test_statsd_client_merging_default_tags_with_tags() {
        let client = StatsdClient::builder("prefix", NopMetricSink)
            .with_tag("hello", "world")
            .with_tag("env", "production")
            .build();
        let res = client
            .count_with_tags("some.counter", 3)
            .with_tag("foo", "bar")
            .with_tag("bucket", "123")
            .try_send();

        assert_eq!(
            "prefix.some.counter:3|c|#hello:world,env:production,foo:bar,bucket:123",
            res.unwrap().to_string()
        );
    }

    #[test]
    fn test_statsd_client_count_with_tags() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let res = client
            .count_with_tags("some.counter", 3)
            .with_tag("foo", "bar")
            .try_send();

        assert_eq!("prefix.some.counter:3|c|#foo:bar", res.unwrap().to_string());
    }

    #[test]
    fn test_statsd_client_incr_with_tags() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let res = client.incr_with_tags("some.counter").with_tag("foo", "bar").try_send();

        assert_eq!("prefix.some.counter:1|c|#foo:bar", res.unwrap().to_string());
    }

    #[test]
    fn test_statsd_client_decr_with_tags() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let res = client.decr_with_tags("some.counter").with_tag("foo", "bar").try_send();

        assert_eq!("prefix.some.counter:-1|c|#foo:bar", res.unwrap().to_string());
    }

    #[test]
    fn test_statsd_client_incr_by_decr_by() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("prefix", sink);

        client.incr_by("some.counter", 5).unwrap();
        client.decr_by("some.counter", 7).unwrap();

        assert_eq!(
            vec!["prefix.some.counter:5|c".to_string(), "prefix.some.counter:-7|c".to_string()],
            drain(&rx)
        );
    }

    #[test]
    fn test_statsd_client_incr_by_overflow() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let err = client.incr_by("some.counter", u64::MAX).unwrap_err();

        assert_eq!(ErrorKind::InvalidMetric, err.kind());
    }

    #[test]
    fn test_statsd_client_gauge_with_tags() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let res = client
            .gauge_with_tags("some.gauge", 4)
            .with_tag("bucket", "A")
            .with_tag("app", "file-server")
            .try_send();

        assert_eq!("prefix.some.gauge:4|g|#bucket:A,app:file-server", res.unwrap().to_string());
    }

    #[test]
    fn test_statsd_client_gauge_absolute_and_delta() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("", sink);

        client.gauge("foo", 70).unwrap();
        client.gauge_delta("foo", -3).unwrap();
        client.gauge_delta("foo", 2.5).unwrap();

        assert_eq!(
            vec!["foo:70|g".to_string(), "foo:-3|g".to_string(), "foo:+2.5|g".to_string()],
            drain(&rx)
        );
    }

    #[test]
    fn test_statsd_client_gauge_negative_absolute() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let err = client.gauge("some.gauge", -1.5).unwrap_err();

        assert_eq!(ErrorKind::InvalidMetric, err.kind());
    }

    #[test]
    fn test_statsd_client_gauge_not_finite() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);

        assert_eq!(ErrorKind::InvalidMetric, client.gauge("some.gauge", f64::NAN).unwrap_err().kind());
        assert_eq!(
            ErrorKind::InvalidMetric,
            client.histogram("some.histogram", f64::INFINITY).unwrap_err().kind()
        );
    }

    #[test]
    fn test_statsd_client_time_duration() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let res = client.time_with_tags("key", Duration::from_millis(157)).try_send();

        assert_eq!("prefix.key:157|ms", res.unwrap().to_string());
    }

    #[test]
    fn test_statsd_client_time_duration_with_overflow() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let res = client.time("key", Duration::from_secs(u64::MAX));

        assert_eq!(ErrorKind::InvalidMetric, res.unwrap_err().kind());
    }

    #[test]
    fn test_statsd_client_time_duration_with_tags() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let res = client
            .time_with_tags("key", Duration::from_millis(157))
            .with_tag("foo", "bar")
            .try_send();

        assert_eq!("prefix.key:157|ms|#foo:bar", res.unwrap().to_string());
    }

    #[test]
    fn test_statsd_client_histogram_with_tags() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let res = client
            .histogram_with_tags("some.histo", 4)
            .with_tag("bucket", "A")
            .try_send();

        assert_eq!("prefix.some.histo:4|h|#bucket:A", res.unwrap().to_string());
    }

    #[test]
    fn test_statsd_client_histogram_duration() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let res = client
            .histogram_with_tags("key", Duration::from_nanos(210_000_000))
            .try_send();

        assert_eq!("prefix.key:210|h", res.unwrap().to_string());
    }

    #[test]
    fn test_statsd_client_distribution_with_tags() {
        let client = StatsdClient::from_sink("prefix", NopMetricSink);
        let res = client
            .distribution_with_tags("some.distr", 0.1)
            .with_tag("environment", "dev")
            .try_send();

        assert_eq!("prefix.some.distr:0.1|d|#environment:dev", res.unwrap().to_string());
    }

    #[test]
    fn test_statsd_client_set_with_tags() {
        let client = StatsdClient::from_sink("myapp", NopMetricSink);
        let res = client.set_with_tags("some.set", 3).with_tag("foo", "bar").try_send();

        assert_eq!("myapp.some.set:3|s|#foo:bar", res.unwrap().to_string());
    }

    #[test]
    fn test_statsd_client_invalid_name() {
        let client = StatsdClient::from_sink("", NopMetricSink);

        for key in ["", "has space", "pipe|name", "colon:name"] {
            let err = client.incr(key).unwrap_err();
            assert_eq!(ErrorKind::InvalidMetric, err.kind(), "key was {:?}", key);
        }
    }

    #[test]
    fn test_statsd_client_with_tags_send_error() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_ref = Arc::clone(&count);

        let handler = move |_err: MetricError| {
            count_ref.fetch_add(1, Ordering::Release);
        };

        let client = StatsdClient::builder("prefix", ErrorMetricSink::always())
            .with_error_handler(handler)
            .build();

        client
            .count_with_tags("some.key", 1)
            .with_tag("test", "a")
            .send()
            .unwrap();
        client.incr("some.key").unwrap();

        assert_eq!(2, count.load(Ordering::Acquire));
        assert_eq!(2, client.stats().sink.packets_dropped);
    }

    #[test]
    fn test_statsd_client_buffered_coalesces() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::builder("prefix", sink)
            .buffered(512)
            .flush_interval(Duration::ZERO)
            .build();

        client.incr("a").unwrap();
        client.gauge("b", 5).unwrap();
        assert!(drain(&rx).is_empty());

        client.flush();

        assert_eq!(vec!["prefix.a:1|c\nprefix.b:5|g".to_string()], drain(&rx));
        assert_eq!(2, client.stats().buffer.buffered_writes);
        assert_eq!(1, client.stats().sink.packets_sent);
    }

    #[test]
    fn test_statsd_client_buffered_flushed_when_dropped() {
        let (rx, sink) = SpyMetricSink::new();

        {
            let client = StatsdClient::builder("prefix", sink).buffered(512).build();
            client.incr("a").unwrap();
        }

        assert_eq!(vec!["prefix.a:1|c".to_string()], drain(&rx));
    }

    #[test]
    fn test_statsd_client_shutdown_twice() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::builder("prefix", sink)
            .buffered(512)
            .flush_interval(Duration::ZERO)
            .build();

        client.incr("a").unwrap();
        client.shutdown();
        client.shutdown();

        assert!(client.is_closed());
        assert_eq!(1, client.stats().buffer.flushes);
        assert_eq!(vec!["prefix.a:1|c".to_string()], drain(&rx));
    }

    #[test]
    fn test_statsd_client_closed_drops_metrics() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("prefix", sink);

        client.shutdown();

        assert!(client.is_closed());
        assert!(client.incr("a").is_ok());
        assert_eq!(
            ErrorKind::ClientClosed,
            client.incr_with_tags("a").try_send().unwrap_err().kind()
        );
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_statsd_client_disabled() {
        let client = StatsdClient::default();

        assert!(client.is_closed());
        assert!(client.incr("some.counter").is_ok());
        assert_eq!(
            ErrorKind::ClientClosed,
            client.incr_with_tags("some.counter").try_send().unwrap_err().kind()
        );
        assert_eq!(
            ErrorKind::InvalidMetric,
            client.incr("not a valid name").unwrap_err().kind()
        );
    }

    #[test]
    fn test_statsd_client_from_config() {
        let config = ClientConfig::default().with_prefix("my.app").with_tag("env", "dev");
        let client = StatsdClient::from_config(config).unwrap();

        let metric = client.incr_with_tags("some.counter").try_send().unwrap();
        client.shutdown();

        assert_eq!("my.app.some.counter:1|c|#env:dev", metric.to_string());
    }

    #[test]
    fn test_statsd_client_timed() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("", sink);

        {
            let _timer = client.timed("example_metric.timer").with_tag("environment", "dev");
            thread::sleep(Duration::from_millis(5));
        }

        let sent = drain(&rx);
        assert_eq!(1, sent.len());

        let metric = crate::codec::decode(&sent[0]).unwrap();
        assert_eq!("example_metric.timer", metric.name());
        assert!(metric.value().as_f64() >= 5.0, "elapsed was {}", metric.value());
        assert_eq!(&["environment:dev".to_string()], metric.tags());
    }

    #[test]
    fn test_statsd_client_timed_during_panic() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("", sink);

        let res = panic::catch_unwind(AssertUnwindSafe(|| {
            let _timer = client.timed("example_metric.timer");
            thread::sleep(Duration::from_millis(5));
            panic!("work failed");
        }));

        assert!(res.is_err());

        let sent = drain(&rx);
        assert_eq!(1, sent.len());
        assert!(sent[0].starts_with("example_metric.timer:"));
        assert!(sent[0].ends_with("|ms"));
    }

    #[test]
    fn test_statsd_client_time_fn() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("prefix", sink);

        let result = client.time_fn("some.method", || 21 * 2);

        assert_eq!(42, result);
        let sent = drain(&rx);
        assert_eq!(1, sent.len());
        assert!(sent[0].starts_with("prefix.some.method:"));
    }

    #[test]
    fn test_statsd_client_concurrent_incr() {
        let (rx, sink) = SpyMetricSink::new();
        let client = Arc::new(
            StatsdClient::builder("", sink)
                .buffered(64)
                .flush_interval(Duration::from_millis(1))
                .build(),
        );

        let threads: Vec<_> = (0..16)
            .map(|_| {
                let client = Arc::clone(&client);
                thread::spawn(move || {
                    for _ in 0..100 {
                        client.incr("foo").unwrap();
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }
        client.shutdown();

        let lines: Vec<String> = drain(&rx)
            .iter()
            .flat_map(|p| p.split('\n').map(str::to_string).collect::<Vec<_>>())
            .collect();

        assert_eq!(1600, lines.len());
        assert!(lines.iter().all(|l| l == "foo:1|c"));
    }

    // The following tests really just ensure that we've actually
    // implemented all the traits we're supposed to correctly. If
    // we hadn't, this wouldn't compile.

    #[test]
    fn test_statsd_client_as_counted() {
        let client: Box<dyn Counted<i64>> = Box::new(StatsdClient::from_sink("prefix", NopMetricSink));

        client.count("some.counter", 5).unwrap();
    }

    #[test]
    fn test_statsd_client_as_countedext() {
        let client: Box<dyn CountedExt> = Box::new(StatsdClient::from_sink("prefix", NopMetricSink));

        client.incr("some.counter").unwrap();
    }

    #[test]
    fn test_statsd_client_as_timed_u64() {
        let client: Box<dyn Timed<u64>> = Box::new(StatsdClient::from_sink("prefix", NopMetricSink));

        client.time("some.timer", 20).unwrap();
    }

    #[test]
    fn test_statsd_client_as_gauged_f64() {
        let client: Box<dyn Gauged<f64>> = Box::new(StatsdClient::from_sink("prefix", NopMetricSink));

        client.gauge("some.gauge", 3.2).unwrap();
    }

    #[test]
    fn test_statsd_client_as_delta_gauged_i64() {
        let client: Box<dyn DeltaGauged<i64>> = Box::new(StatsdClient::from_sink("prefix", NopMetricSink));

        client.gauge_delta("some.gauge", -3).unwrap();
    }

    #[test]
    fn test_statsd_client_as_histogrammed_duration() {
        let client: Box<dyn Histogrammed<Duration>> = Box::new(StatsdClient::from_sink("prefix", NopMetricSink));

        client.histogram("some.histogram", Duration::from_nanos(4)).unwrap();
    }

    #[test]
    fn test_statsd_client_as_distributed_u64() {
        let client: Box<dyn Distributed<u64>> = Box::new(StatsdClient::from_sink("prefix", NopMetricSink));

        client.distribution("some.distribution", 33).unwrap();
    }

    #[test]
    fn test_statsd_client_as_setted() {
        let client: Box<dyn Setted<i64>> = Box::new(StatsdClient::from_sink("myapp", NopMetricSink));

        client.set("some.set", 5).unwrap();
    }

    #[test]
    fn test_statsd_client_as_thread_and_panic_safe() {
        let client: Box<dyn MetricClient + Send + Sync + RefUnwindSafe> = Box::new(
            StatsdClient::builder("prefix", NopMetricSink)
                .buffered(512)
                .build(),
        );

        client.count("some.counter", 3).unwrap();
        client.incr("some.counter").unwrap();
        client.decr("some.counter").unwrap();
        client.time("some.timer", 198).unwrap();
        client.time("some.timer", Duration::from_millis(198)).unwrap();
        client.gauge("some.gauge", 4).unwrap();
        client.gauge("some.gauge", 4.0).unwrap();
        client.gauge_delta("some.gauge", -4).unwrap();
        client.gauge_delta("some.gauge", 4.5).unwrap();
        client.histogram("some.histogram", 32).unwrap();
        client.histogram("some.histogram", 32.0).unwrap();
        client.histogram("some.histogram", Duration::from_nanos(32)).unwrap();
        client.distribution("some.distribution", 248).unwrap();
        client.distribution("some.distribution", 248.0).unwrap();
        client.set("some.set", 5).unwrap();
    }
}
