// Metronome - A buffered Statsd client for Rust!
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A buffered Statsd client for Rust!
//!
//! Metronome is a thread-safe way to emit Statsd metrics from your
//! application, coalescing them into packets and sending them over UDP
//! without ever blocking or failing the code being measured.
//!
//! ## Features
//!
//! * Support for emitting counters, timers, histograms, distributions, gauges
//!   (absolute and deltas), and sets to Statsd over UDP.
//! * Buffering of metrics into packets up to a maximum size, flushed when
//!   full, on an interval, or when the client is shut down.
//! * Support for alternate backends via the `MetricSink` trait.
//! * Support for [Datadog](https://docs.datadoghq.com/developers/dogstatsd/) style metrics tags.
//! * Sample rates for counters, timers, histograms, and distributions.
//! * Scoped timers that record how long a block of code took, even if it panics.
//!
//! ## Usage
//!
//! ### Simple Use
//!
//! Create a client from a configuration (defaults, optionally overridden by
//! `STATSD_*` environment variables) and send a few metrics.
//!
//! ```rust,no_run
//! use metronome::prelude::*;
//! use metronome::{ClientConfig, StatsdClient};
//!
//! // Note that you'll probably want to actually handle any errors creating
//! // the client when you use it for real in your application. We're just
//! // using .unwrap() here since this is an example!
//! let config = ClientConfig::from_env().unwrap().with_prefix("my.metrics");
//! let client = StatsdClient::from_config(config).unwrap();
//!
//! // Emit metrics!
//! client.incr("some.counter").unwrap();
//! client.time("some.methodCall", 42).unwrap();
//! client.gauge("some.thing", 7).unwrap();
//! client.gauge_delta("some.thing", -2).unwrap();
//!
//! // Send anything still buffered
//! client.shutdown();
//! ```
//!
//! ### Tags
//!
//! Tags may be added to every metric sent by a client, or to individual
//! metrics using the `*_with_tags` methods. Default tags always come first.
//!
//! ```rust
//! use metronome::prelude::*;
//! use metronome::{StatsdClient, NopMetricSink};
//!
//! let client = StatsdClient::builder("my.prefix", NopMetricSink)
//!     .with_tag("env", "prod")
//!     .build();
//!
//! let res = client.time_with_tags("request.time", 84)
//!     .with_tag("method", "GET")
//!     .with_sample_rate(0.5)
//!     .try_send();
//!
//! assert_eq!("my.prefix.request.time:84|ms|@0.5|#env:prod,method:GET", res.unwrap().to_string());
//! ```
//!
//! ### Error Handling
//!
//! Invalid metrics (bad names, tags, values, or sample rates) are always
//! returned to the caller. Errors sending metrics are never returned: they
//! are counted, logged using the `log` crate, and passed to an optional error
//! handler set when building the client.
//!
//! ```rust
//! use metronome::prelude::*;
//! use metronome::{MetricError, StatsdClient, NopMetricSink};
//!
//! fn my_error_handler(err: MetricError) {
//!     eprintln!("Error sending metrics: {}", err);
//! }
//!
//! let client = StatsdClient::builder("my.prefix", NopMetricSink)
//!     .with_error_handler(my_error_handler)
//!     .build();
//!
//! assert!(client.incr("not a valid name").is_err());
//! ```
//!
//! ### Timing Code
//!
//! ```rust
//! use metronome::{StatsdClient, NopMetricSink};
//!
//! let client = StatsdClient::from_sink("my.prefix", NopMetricSink);
//!
//! let answer = client.time_fn("compute.answer", || 6 * 7);
//! assert_eq!(42, answer);
//!
//! {
//!     let _guard = client.timed("some.block");
//!     // timer metric is sent when the guard goes out of scope
//! }
//! ```
//!
//! ### Custom Metric Sinks
//!
//! Any type implementing `MetricSink` can receive payloads. Each payload is
//! one or more metric lines separated by `\n`.
//!
//! ```rust
//! use std::io;
//! use metronome::prelude::*;
//! use metronome::{StatsdClient, MetricSink};
//!
//! pub struct MyMetricSink;
//!
//! impl MetricSink for MyMetricSink {
//!     fn emit(&self, payload: &str) -> io::Result<usize> {
//!         // Your custom metric sink implementation goes here!
//!         Ok(payload.len())
//!     }
//! }
//!
//! let sink = MyMetricSink;
//! let client = StatsdClient::from_sink("my.prefix", sink);
//!
//! client.count("my.counter.thing", 42).unwrap();
//! ```

#![forbid(unsafe_code)]

pub const DEFAULT_PORT: u16 = 8125;

pub use self::builder::MetricBuilder;

pub use self::client::{
    ClientStats, Counted, CountedExt, DeltaGauged, Distributed, Gauged, Histogrammed, MetricClient, Setted,
    StatsdClient, StatsdClientBuilder, Timed, TimedGuard, ToCounterValue, ToDistributionValue, ToGaugeDeltaValue,
    ToGaugeValue, ToHistogramValue, ToSetValue, ToTimerValue,
};

pub use self::config::{ClientConfig, DEFAULT_FLUSH_INTERVAL, DEFAULT_HOST, DEFAULT_MAX_PACKET_SIZE};

pub use self::io::BufferStats;

pub use self::sinks::{MetricSink, NopMetricSink, SinkStats, SocketStats, SpyMetricSink, UdpMetricSink};

pub use self::types::{ErrorKind, Metric, MetricError, MetricResult, MetricType, MetricValue};

mod aggregator;
mod builder;
mod client;
pub mod codec;
mod config;
mod io;
pub mod prelude;
mod sinks;
mod transport;
mod types;
