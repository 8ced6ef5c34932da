//! Fragment coalescing for streamed model output.
//!
//! Fragments accumulate in a pending string. A fragment carrying a newline commits at once;
//! anything else arms a single flush deadline that later pushes never postpone, so the
//! visible latency of a burst is bounded by one interval. The buffer never spawns timers:
//! the host loop polls [`StreamBuffer::flush_due`] and sleeps at most
//! [`StreamBuffer::next_timeout_ms`].

use std::time::{Duration, Instant};

pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamBufferOptions {
    pub flush_interval: Duration,
}

impl Default for StreamBufferOptions {
    fn default() -> Self {
        Self {
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

/// Buffers streamed fragments and commits them in coherent chunks.
#[derive(Debug)]
pub struct StreamBuffer {
    pending: String,
    committed: String,
    flush_interval: Duration,
    flush_deadline: Option<Instant>,
}

impl Default for StreamBuffer {
    fn default() -> Self {
        Self::with_options(StreamBufferOptions::default())
    }
}

impl StreamBuffer {
    pub fn new(flush_interval: Duration) -> Self {
        Self {
            pending: String::new(),
            committed: String::new(),
            flush_interval,
            flush_deadline: None,
        }
    }

    pub fn with_options(options: StreamBufferOptions) -> Self {
        Self::new(options.flush_interval)
    }

    /// Appends a fragment. Returns the committed chunk when the fragment forced a flush.
    pub fn push(&mut self, fragment: &str, now: Instant) -> Option<String> {
        if fragment.is_empty() {
            return None;
        }
        self.pending.push_str(fragment);

        if fragment.contains('\n') {
            return self.flush_now();
        }

        if self.flush_deadline.is_none() {
            self.flush_deadline = Some(now + self.flush_interval);
        }
        None
    }

    /// Commits pending text if the armed deadline has passed.
    pub fn flush_due(&mut self, now: Instant) -> Option<String> {
        match self.flush_deadline {
            Some(deadline) if now >= deadline => self.flush_now(),
            _ => None,
        }
    }

    /// Cancels any armed deadline and commits pending text immediately.
    pub fn flush_now(&mut self) -> Option<String> {
        self.flush_deadline = None;
        if self.pending.is_empty() {
            return None;
        }
        let chunk = std::mem::take(&mut self.pending);
        self.committed.push_str(&chunk);
        Some(chunk)
    }

    /// Discards pending and committed text and disarms the deadline. Idempotent.
    pub fn reset(&mut self) {
        self.flush_deadline = None;
        self.pending.clear();
        self.committed.clear();
    }

    pub fn next_timeout_ms(&self, now: Instant, default_ms: i32) -> i32 {
        if let Some(deadline) = self.flush_deadline {
            let remaining = deadline.saturating_duration_since(now);
            let ms = remaining.as_millis().min(i32::MAX as u128) as i32;
            return ms.min(default_ms).max(0);
        }
        default_ms
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.flush_deadline
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }
}
