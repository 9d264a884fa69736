// Metronome - A buffered Statsd client for Rust!
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::types::{validate_tag, ErrorKind, MetricError, MetricResult};
use crate::DEFAULT_PORT;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default host metrics are sent to.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default maximum size of a single payload. This is a rather conservative
/// value, picked to make sure an entire buffer fits in a small UDP packet.
/// Users may want to use a different value based on the configuration of
/// the network their application runs in.
pub const DEFAULT_MAX_PACKET_SIZE: usize = 512;

/// Default interval at which buffered metrics are sent even when the buffer
/// isn't full.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

const ENV_HOST: &str = "STATSD_HOST";
const ENV_PORT: &str = "STATSD_PORT";
const ENV_PREFIX: &str = "STATSD_PREFIX";
const ENV_TAGS: &str = "STATSD_TAGS";
const ENV_BUFFERED: &str = "STATSD_BUFFERED";
const ENV_FLUSH_INTERVAL_MS: &str = "STATSD_FLUSH_INTERVAL_MS";
const ENV_MAX_PACKET_SIZE: &str = "STATSD_MAX_PACKET_SIZE";

/// Settings used to create a `StatsdClient` that sends metrics over UDP.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use metronome::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_host("metrics.example.com")
///     .with_prefix("my.app")
///     .with_tag("environment", "dev")
///     .with_flush_interval(Some(Duration::from_millis(250)));
///
/// assert_eq!(8125, config.port());
/// assert_eq!(&["environment:dev".to_string()], config.tags());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    host: String,
    port: u16,
    prefix: String,
    tags: Vec<String>,
    buffered: bool,
    flush_interval: Option<Duration>,
    max_packet_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            prefix: String::new(),
            tags: Vec::new(),
            buffered: true,
            flush_interval: Some(DEFAULT_FLUSH_INTERVAL),
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by any of the following environment variables
    /// that are set:
    ///
    /// * `STATSD_HOST`
    /// * `STATSD_PORT`
    /// * `STATSD_PREFIX`
    /// * `STATSD_TAGS`, comma separated `key:value` tags
    /// * `STATSD_BUFFERED`, one of `true`, `false`, `1`, or `0`
    /// * `STATSD_FLUSH_INTERVAL_MS`, where `0` disables the flush timer
    /// * `STATSD_MAX_PACKET_SIZE`
    ///
    /// # Failures
    ///
    /// Fails with `ErrorKind::InvalidInput` if any of the values are malformed.
    pub fn from_env() -> MetricResult<ClientConfig> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> MetricResult<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ClientConfig::default();

        if let Some(host) = lookup(ENV_HOST) {
            if host.is_empty() {
                return Err(invalid_var(ENV_HOST, &host));
            }
            config.host = host;
        }

        if let Some(port) = lookup(ENV_PORT) {
            config.port = parse_var(ENV_PORT, &port)?;
        }

        if let Some(prefix) = lookup(ENV_PREFIX) {
            config.prefix = prefix;
        }

        if let Some(tags) = lookup(ENV_TAGS) {
            for tag in tags.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                validate_tag(tag).map_err(|_| invalid_var(ENV_TAGS, &tags))?;
                config.tags.push(tag.to_string());
            }
        }

        if let Some(buffered) = lookup(ENV_BUFFERED) {
            config.buffered = match buffered.to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(invalid_var(ENV_BUFFERED, &buffered)),
            };
        }

        if let Some(interval) = lookup(ENV_FLUSH_INTERVAL_MS) {
            let millis: u64 = parse_var(ENV_FLUSH_INTERVAL_MS, &interval)?;
            config.flush_interval = if millis == 0 {
                None
            } else {
                Some(Duration::from_millis(millis))
            };
        }

        if let Some(size) = lookup(ENV_MAX_PACKET_SIZE) {
            let size: usize = parse_var(ENV_MAX_PACKET_SIZE, &size)?;
            if size == 0 {
                return Err(invalid_var(ENV_MAX_PACKET_SIZE, "0"));
            }
            config.max_packet_size = size;
        }

        Ok(config)
    }

    pub fn with_host<S: Into<String>>(self, host: S) -> Self {
        ClientConfig {
            host: host.into(),
            ..self
        }
    }

    pub fn with_port(self, port: u16) -> Self {
        ClientConfig { port, ..self }
    }

    /// Prefix prepended to every metric name, separated by a `.`.
    pub fn with_prefix<S: Into<String>>(self, prefix: S) -> Self {
        ClientConfig {
            prefix: prefix.into(),
            ..self
        }
    }

    /// Add a default tag sent with every metric, ahead of any per-metric tags.
    pub fn with_tag<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.tags.push(format!("{}:{}", key.as_ref(), value.as_ref()));
        self
    }

    /// Whether metrics are coalesced into packets or each sent on its own.
    pub fn with_buffering(self, buffered: bool) -> Self {
        ClientConfig { buffered, ..self }
    }

    /// Interval for flushing buffered metrics, `None` to only flush when the
    /// buffer is full or the client is flushed or shut down.
    pub fn with_flush_interval(self, flush_interval: Option<Duration>) -> Self {
        ClientConfig { flush_interval, ..self }
    }

    pub fn with_max_packet_size(self, max_packet_size: usize) -> Self {
        ClientConfig {
            max_packet_size,
            ..self
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_buffered(&self) -> bool {
        self.buffered
    }

    pub fn flush_interval(&self) -> Option<Duration> {
        self.flush_interval
    }

    pub fn max_packet_size(&self) -> usize {
        self.max_packet_size
    }
}

fn invalid_var(key: &str, value: &str) -> MetricError {
    MetricError::from((
        ErrorKind::InvalidInput,
        format!("Invalid value for {}: {:?}", key, value),
    ))
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> MetricResult<T> {
    value.trim().parse().map_err(|_| invalid_var(key, value))
}
