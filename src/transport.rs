// Metronome - A buffered Statsd client for Rust!
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::sinks::{MetricSink, SinkStats};
use crate::types::MetricError;
use log::warn;
use std::fmt;
use std::panic::RefUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub(crate) type BoxedSink = Box<dyn MetricSink + Sync + Send + RefUnwindSafe>;
pub(crate) type ErrorHandler = Box<dyn Fn(MetricError) + Sync + Send + RefUnwindSafe>;

// Failed sends are logged at most once per window of 2^6 = 64 seconds.
const REPORT_WINDOW_SHIFT: u32 = 6;
const NEVER_REPORTED: u64 = u64::MAX;

/// Best effort delivery of payloads to a sink.
///
/// Sending never fails from the point of view of the caller. Failures are
/// counted by the sink, passed to the error handler, and logged without
/// flooding the log when the metric server is unreachable for a long time.
pub(crate) struct Transport {
    sink: BoxedSink,
    errors: ErrorHandler,
    created: Instant,
    last_error_report: AtomicU64,
}

impl Transport {
    pub(crate) fn new(sink: BoxedSink, errors: ErrorHandler) -> Transport {
        Transport {
            sink,
            errors,
            created: Instant::now(),
            last_error_report: AtomicU64::new(NEVER_REPORTED),
        }
    }

    pub(crate) fn send(&self, payload: &str) {
        if let Err(e) = self.sink.emit(payload) {
            self.report_io_error("sending metrics", MetricError::from(e));
        }
    }

    pub(crate) fn flush(&self) {
        if let Err(e) = self.sink.flush() {
            self.report_io_error("flushing metrics", MetricError::from(e));
        }
    }

    pub(crate) fn stats(&self) -> SinkStats {
        self.sink.stats()
    }

    /// Pass an error to the user supplied handler without logging it.
    pub(crate) fn consume_error(&self, err: MetricError) {
        (self.errors)(err);
    }

    fn report_io_error(&self, action: &str, err: MetricError) {
        if self.should_log(self.created.elapsed().as_secs()) {
            warn!("{} error: {}", action, err);
        }

        self.consume_error(err);
    }

    /// True for the first error in each reporting window, `now_secs` being
    /// seconds since this transport was created.
    fn should_log(&self, now_secs: u64) -> bool {
        let window = now_secs >> REPORT_WINDOW_SHIFT;
        self.last_error_report.swap(window, Ordering::Relaxed) != window
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("sink", &"...")
            .field("errors", &"...")
            .field("created", &self.created)
            .finish()
    }
}
