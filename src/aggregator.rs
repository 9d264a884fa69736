// Metronome - A buffered Statsd client for Rust!
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Coalescing of metric lines into packets shared by any number of threads.
//!
//! The buffer is only locked long enough to append a line or take a complete
//! payload. Payloads are always sent after the lock has been released so a
//! slow sink never blocks other threads from recording metrics.

use crate::codec;
use crate::io::{BufferStats, PacketBuffer};
use crate::transport::Transport;
use crate::types::{ErrorKind, Metric, MetricError, MetricResult};
use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug)]
struct State {
    buffer: PacketBuffer,
    closed: bool,
}

#[derive(Debug)]
struct Inner {
    state: Mutex<State>,
    transport: Arc<Transport>,
}

impl Inner {
    // Nothing panics while holding the lock, but if a sink ever does the
    // buffer is still consistent and can keep being used.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(&self, metric: &Metric) -> MetricResult<()> {
        let line = codec::encode(metric);
        let mut payloads = Vec::new();

        {
            let mut state = self.lock();
            if state.closed {
                return Err(MetricError::from((ErrorKind::ClientClosed, "Client has been shut down")));
            }

            state.buffer.push(&line, &mut payloads);
        }

        for payload in payloads {
            self.transport.send(&payload);
        }

        Ok(())
    }

    fn flush(&self) {
        let payload = self.lock().buffer.take();

        if let Some(payload) = payload {
            self.transport.send(&payload);
        }

        self.transport.flush();
    }
}

/// Background thread that flushes the buffer on a fixed interval until it
/// is told to stop.
#[derive(Debug)]
struct FlushTimer {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

impl FlushTimer {
    fn start(inner: Arc<Inner>, interval: Duration) -> FlushTimer {
        let (stop, stopped) = bounded(0);
        let thread = thread::spawn(move || run_timer(&inner, interval, &stopped));
        debug!("started flush timer with interval {:?}", interval);
        FlushTimer { stop, thread }
    }

    fn stop(self) {
        // Dropping the only sender disconnects the channel and wakes the timer
        drop(self.stop);
        let _ = self.thread.join();
        debug!("stopped flush timer");
    }
}

fn run_timer(inner: &Inner, interval: Duration, stopped: &Receiver<()>) {
    let ticker = tick(interval);

    loop {
        select! {
            recv(stopped) -> _ => break,
            recv(ticker) -> _ => inner.flush(),
        }
    }
}

/// Buffer of encoded metric lines that is flushed to a `Transport` when it
/// fills up, when the flush timer fires, or when explicitly asked to.
#[derive(Debug)]
pub(crate) struct Aggregator {
    inner: Arc<Inner>,
    timer: Mutex<Option<FlushTimer>>,
}

impl Aggregator {
    /// Create a new aggregator whose payloads are at most `max_packet_size`
    /// bytes long (except for single lines longer than that), flushed every
    /// `flush_interval` if one is given.
    pub(crate) fn new(
        transport: Arc<Transport>,
        max_packet_size: usize,
        flush_interval: Option<Duration>,
    ) -> Aggregator {
        let inner = Arc::new(Inner {
            state: Mutex::new(State {
                buffer: PacketBuffer::new(max_packet_size),
                closed: false,
            }),
            transport,
        });

        let timer = flush_interval
            .filter(|d| !d.is_zero())
            .map(|d| FlushTimer::start(Arc::clone(&inner), d));

        Aggregator {
            inner,
            timer: Mutex::new(timer),
        }
    }

    /// Encode and buffer a metric, sending any payloads that became complete.
    ///
    /// # Failures
    ///
    /// Fails with `ErrorKind::ClientClosed` after `shutdown()` has been called.
    pub(crate) fn enqueue(&self, metric: &Metric) -> MetricResult<()> {
        self.inner.enqueue(metric)
    }

    /// Send whatever is currently buffered. Does nothing if the buffer is empty.
    pub(crate) fn flush(&self) {
        self.inner.flush();
    }

    /// Send anything remaining in the buffer and stop accepting metrics.
    ///
    /// Only the first call has any effect.
    pub(crate) fn shutdown(&self) {
        let remaining = {
            let mut state = self.inner.lock();
            if state.closed {
                None
            } else {
                state.closed = true;
                Some(state.buffer.take())
            }
        };

        let remaining = match remaining {
            Some(remaining) => remaining,
            None => return,
        };

        if let Some(payload) = remaining {
            self.inner.transport.send(&payload);
        }
        self.inner.transport.flush();

        let timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(timer) = timer {
            timer.stop();
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub(crate) fn stats(&self) -> BufferStats {
        self.inner.lock().buffer.stats()
    }
}

impl Drop for Aggregator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::Aggregator;
    use crate::sinks::SpyMetricSink;
    use crate::transport::Transport;
    use crate::types::{ErrorKind, Metric, MetricError, MetricType, MetricValue};
    use crossbeam_channel::Receiver;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn new_aggregator(max: usize, interval: Option<Duration>) -> (Receiver<Vec<u8>>, Aggregator) {
        let (rx, sink) = SpyMetricSink::new();
        let transport = Transport::new(Box::new(sink), Box::new(|_e: MetricError| ()));
        (rx, Aggregator::new(Arc::new(transport), max, interval))
    }

    fn counter(name: &str, value: i64) -> Metric {
        Metric::new(MetricType::Counter, name, MetricValue::Signed(value)).unwrap()
    }

    fn drain(rx: &Receiver<Vec<u8>>) -> Vec<String> {
        rx.try_iter().map(|p| String::from_utf8(p).unwrap()).collect()
    }

    #[test]
    fn test_aggregator_buffers_until_full() {
        let (rx, agg) = new_aggregator(16, None);

        agg.enqueue(&counter("foo", 1)).unwrap();
        agg.enqueue(&counter("bar", 2)).unwrap();
        assert!(drain(&rx).is_empty());

        agg.enqueue(&counter("baz", 3)).unwrap();
        assert_eq!(vec!["foo:1|c\nbar:2|c".to_string()], drain(&rx));
    }

    #[test]
    fn test_aggregator_flush() {
        let (rx, agg) = new_aggregator(512, None);

        agg.enqueue(&counter("foo", 1)).unwrap();
        agg.flush();
        agg.flush();

        assert_eq!(vec!["foo:1|c".to_string()], drain(&rx));
        assert_eq!(1, agg.stats().flushes);
    }

    #[test]
    fn test_aggregator_oversized_line_sent_alone() {
        let (rx, agg) = new_aggregator(16, None);

        agg.enqueue(&counter("foo", 1)).unwrap();
        agg.enqueue(&counter("some.really.long.metric.name", 1)).unwrap();

        assert_eq!(
            vec!["foo:1|c".to_string(), "some.really.long.metric.name:1|c".to_string()],
            drain(&rx)
        );
        assert_eq!(1, agg.stats().standalone_writes);
    }

    #[test]
    fn test_aggregator_shutdown_twice() {
        let (rx, agg) = new_aggregator(512, None);

        agg.enqueue(&counter("foo", 1)).unwrap();
        agg.shutdown();
        agg.shutdown();

        assert!(agg.is_closed());
        assert_eq!(vec!["foo:1|c".to_string()], drain(&rx));
        assert_eq!(1, agg.stats().flushes);
    }

    #[test]
    fn test_aggregator_enqueue_after_shutdown() {
        let (rx, agg) = new_aggregator(512, None);

        agg.shutdown();
        let err = agg.enqueue(&counter("foo", 1)).unwrap_err();

        assert_eq!(ErrorKind::ClientClosed, err.kind());
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_aggregator_flushed_when_dropped() {
        let rx = {
            let (rx, agg) = new_aggregator(512, Some(Duration::from_secs(60)));
            agg.enqueue(&counter("foo", 1)).unwrap();
            rx
        };

        assert_eq!(vec!["foo:1|c".to_string()], drain(&rx));
    }

    #[test]
    fn test_aggregator_timer_flushes() {
        let (rx, agg) = new_aggregator(512, Some(Duration::from_millis(10)));

        agg.enqueue(&counter("foo", 1)).unwrap();
        let payload = rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert_eq!(b"foo:1|c".to_vec(), payload);
        agg.shutdown();
    }

    #[test]
    fn test_aggregator_concurrent_enqueue() {
        let (rx, agg) = new_aggregator(64, Some(Duration::from_millis(1)));
        let agg = Arc::new(agg);

        let threads: Vec<_> = (0..8)
            .map(|t| {
                let agg = Arc::clone(&agg);
                thread::spawn(move || {
                    for i in 0..100 {
                        agg.enqueue(&counter(&format!("thread{}.metric", t), i)).unwrap();
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }
        agg.shutdown();

        let payloads = drain(&rx);
        let lines: usize = payloads.iter().map(|p| p.split('\n').count()).sum();

        assert_eq!(800, lines);
        for payload in payloads {
            assert!(payload.len() <= 64, "payload too long: {:?}", payload);
        }
    }
}
