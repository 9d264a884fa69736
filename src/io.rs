// Metronome - A buffered Statsd client for Rust!
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::mem;

const LINE_SEPARATOR: char = '\n';

/// Counts of how lines written to a packet buffer were handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Lines appended to the buffer.
    pub buffered_writes: u64,
    /// Lines too large for the buffer that were sent as their own payload.
    pub standalone_writes: u64,
    /// Non-empty buffers taken to be sent as a payload.
    pub flushes: u64,
}

/// Buffer that joins lines with a newline separator and hands back complete
/// payloads, each at most `capacity` bytes long.
///
/// Unlike a `Write` implementation, the buffer never performs I/O itself.
/// Payloads that need to be sent are returned to the caller so that they can
/// be sent after any lock protecting the buffer has been released.
#[derive(Debug)]
pub(crate) struct PacketBuffer {
    buf: String,
    capacity: usize,
    stats: BufferStats,
}

impl PacketBuffer {
    pub(crate) fn new(capacity: usize) -> PacketBuffer {
        PacketBuffer {
            buf: String::with_capacity(capacity),
            capacity,
            stats: BufferStats::default(),
        }
    }

    /// Add a single line to the buffer, pushing any payloads that must be sent
    /// as a result onto `out` in the order they must be sent.
    pub(crate) fn push(&mut self, line: &str, out: &mut Vec<String>) {
        if line.len() > self.capacity {
            // if buffer non-empty, take it first to preserve ordering. The
            // oversized line bypasses the buffer entirely as its own payload.
            out.extend(self.take());
            self.stats.standalone_writes += 1;
            out.push(line.to_string());
            return;
        }

        let required = if self.buf.is_empty() {
            line.len()
        } else {
            self.buf.len() + 1 + line.len()
        };

        if required > self.capacity {
            out.extend(self.take());
        }

        if !self.buf.is_empty() {
            self.buf.push(LINE_SEPARATOR);
        }

        self.buf.push_str(line);
        self.stats.buffered_writes += 1;
    }

    /// Take the contents of the buffer as a payload, leaving it empty. Returns
    /// `None` when there is nothing buffered.
    pub(crate) fn take(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }

        self.stats.flushes += 1;
        let next = String::with_capacity(self.capacity);
        Some(mem::replace(&mut self.buf, next))
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn stats(&self) -> BufferStats {
        self.stats
    }
}
