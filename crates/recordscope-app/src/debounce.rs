// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

/// Trailing-edge debounce: only the latest pushed value is released, once
/// `window` has passed without another push.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T, now: Instant) {
        let deadline = now.checked_add(self.window).unwrap_or(now);
        self.pending = Some((value, deadline));
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Releases the pending value immediately, ignoring the window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use std::time::{Duration, Instant};

    #[test]
    fn releases_after_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.push("ac", start);

        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(300)),
            Some("ac")
        );
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn newer_push_supersedes_and_restarts_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.push("a", start);
        debouncer.push("ac", start + Duration::from_millis(200));

        assert_eq!(debouncer.poll(start + Duration::from_millis(350)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(500))
        );
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(500)),
            Some("ac")
        );
    }

    #[test]
    fn flush_ignores_window() {
        let mut debouncer = Debouncer::new(Duration::from_secs(10));
        debouncer.push(7, Instant::now());
        assert_eq!(debouncer.flush(), Some(7));
        assert_eq!(debouncer.flush(), None);
    }
}
