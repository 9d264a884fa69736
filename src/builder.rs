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

mod sample_rate;
mod sampler;

pub(crate) use self::sample_rate::SampleRate;
use self::sampler::{Sampler, Sampling};

use crate::client::StatsdClient;
use crate::types::{ErrorKind, Metric, MetricError, MetricResult, MetricType, MetricValue};
use log::debug;

/// Parts of a metric collected by a builder before it is validated.
#[derive(Debug, Clone)]
struct MetricParts {
    type_: MetricType,
    name: String,
    value: MetricValue,
    rate: SampleRate,
    tags: Vec<String>,
    delta: bool,
}

#[derive(Debug)]
enum BuilderRepr<'c> {
    Success(MetricParts, &'c StatsdClient),
    Error(MetricError, &'c StatsdClient),
}

/// Builder for adding tags and a sample rate to in-progress metrics.
///
/// This builder adds `key:value` tags and optionally a sample rate to a metric
/// that was previously started by a call to a method on `StatsdClient`. The
/// metric is validated and sent via the client when `MetricBuilder::send()` or
/// `MetricBuilder::try_send()` is invoked. Any errors encountered constructing
/// or validating the metric are returned when those methods are finally
/// invoked.
///
/// Tags configured as defaults on the client always come first, followed by
/// tags added with this builder in the order they were added. Tags use the
/// [Datadog](https://docs.datadoghq.com/developers/dogstatsd/#datagram-format)
/// format and may not be supported by your server.
///
/// NOTE: The only way to instantiate an instance of this builder is via methods in
/// in the `StatsdClient` client.
///
/// # Examples
///
/// ## `.try_send()`
///
/// ```
/// use metronome::prelude::*;
/// use metronome::{StatsdClient, NopMetricSink};
///
/// let client = StatsdClient::from_sink("some.prefix", NopMetricSink);
/// let res = client.count_with_tags("some.key", 1)
///    .with_tag("host", "app11.example.com")
///    .with_tag("segment", "23")
///    .try_send();
///
/// assert_eq!(
///     "some.prefix.some.key:1|c|#host:app11.example.com,segment:23",
///     res.unwrap().to_string()
/// );
/// ```
///
/// ## `.send()`
///
/// ```
/// use metronome::prelude::*;
/// use metronome::{StatsdClient, NopMetricSink};
///
/// let client = StatsdClient::builder("some.prefix", NopMetricSink)
///     .with_error_handler(|e| eprintln!("metric error: {}", e))
///     .build();
///
/// client.histogram_with_tags("some.key", 44)
///    .with_tags(["environment:dev", "region:us-west-1"])
///    .with_sample_rate(0.5)
///    .send()
///    .unwrap();
/// ```
#[must_use = "Did you forget to call .send() after adding tags?"]
#[derive(Debug)]
pub struct MetricBuilder<'c> {
    repr: BuilderRepr<'c>,
}

impl<'c> MetricBuilder<'c> {
    pub(crate) fn new(
        type_: MetricType,
        name: String,
        value: MetricResult<MetricValue>,
        client: &'c StatsdClient,
    ) -> Self {
        let repr = match value {
            Ok(value) => BuilderRepr::Success(
                MetricParts {
                    type_,
                    name,
                    value,
                    rate: SampleRate::ONE,
                    tags: Vec::new(),
                    delta: false,
                },
                client,
            ),
            Err(err) => BuilderRepr::Error(err, client),
        };

        MetricBuilder { repr }
    }

    pub(crate) fn as_delta(mut self) -> Self {
        if let BuilderRepr::Success(ref mut parts, _) = self.repr {
            parts.delta = true;
        }
        self
    }

    /// Add a `key:value` tag to this metric.
    ///
    /// # Example
    ///
    /// ```
    /// use metronome::prelude::*;
    /// use metronome::{StatsdClient, NopMetricSink};
    ///
    /// let client = StatsdClient::from_sink("some.prefix", NopMetricSink);
    /// let res = client.count_with_tags("some.key", 1)
    ///    .with_tag("user", "authenticated")
    ///    .try_send();
    ///
    /// assert_eq!(
    ///    "some.prefix.some.key:1|c|#user:authenticated",
    ///    res.unwrap().to_string()
    /// );
    /// ```
    pub fn with_tag<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if let BuilderRepr::Success(ref mut parts, _) = self.repr {
            parts.tags.push(format!("{}:{}", key.as_ref(), value.as_ref()));
        }
        self
    }

    /// Add several tags, each already in `key:value` form, to this metric.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        if let BuilderRepr::Success(ref mut parts, _) = self.repr {
            parts.tags.extend(tags.into_iter().map(Into::into));
        }
        self
    }

    /// Only send this metric the given fraction of the times it is recorded.
    ///
    /// The rate must be greater than `0` and at most `1` and is only valid
    /// for counters, histograms, distributions, and timers. The decision to
    /// send or drop the metric is made once, when the metric is sent, and
    /// the rate is included in the metric so the server can scale it.
    pub fn with_sample_rate(self, rate: f64) -> Self {
        match self.repr {
            BuilderRepr::Success(mut parts, client) => match SampleRate::try_from(rate) {
                Ok(rate) => {
                    parts.rate = rate;
                    MetricBuilder {
                        repr: BuilderRepr::Success(parts, client),
                    }
                }
                Err(err) => MetricBuilder {
                    repr: BuilderRepr::Error(err, client),
                },
            },
            repr => MetricBuilder { repr },
        }
    }

    /// Validate and send the metric using the client that created this builder.
    ///
    /// The validated metric is returned whether or not it was dropped due to
    /// sampling.
    ///
    /// # Failures
    ///
    /// * `ErrorKind::InvalidMetric` if the name, value, tags, or sample rate
    ///   are not valid for the type of metric.
    /// * `ErrorKind::ClientClosed` if the client has been shut down or was
    ///   created disabled.
    ///
    /// Errors from the underlying sink are never returned. They are passed to
    /// the error handler of the client instead.
    pub fn try_send(self) -> MetricResult<Metric> {
        match self.repr {
            BuilderRepr::Error(err, _) => Err(err),
            BuilderRepr::Success(parts, client) => {
                let mut tags = client.default_tags().to_vec();
                tags.extend(parts.tags);

                let metric = Metric::from_parts(parts.type_, parts.name, parts.value, parts.rate, tags, parts.delta)?;

                if let Some(sampled) = Sampler::new_with_rate(metric.sample_rate()).sample(&metric) {
                    client.send_metric(sampled)?;
                }

                Ok(metric)
            }
        }
    }

    /// Validate and send the metric using the client that created this builder,
    /// returning only errors that indicate a problem with the metric itself.
    ///
    /// Metrics recorded on a closed or disabled client are silently dropped,
    /// the `ErrorKind::ClientClosed` error is only passed to the error handler
    /// of the client.
    ///
    /// # Failures
    ///
    /// Fails with `ErrorKind::InvalidMetric` if the metric is not valid.
    pub fn send(self) -> MetricResult<()> {
        let client = match self.repr {
            BuilderRepr::Success(_, client) => client,
            BuilderRepr::Error(_, client) => client,
        };

        match self.try_send() {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::ClientClosed => {
                debug!("dropped metric on closed client: {}", err);
                client.consume_error(err);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
