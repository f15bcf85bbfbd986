//! Per-client fixed-window request limiting.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

pub type SharedLimiter = Arc<Mutex<FixedWindowLimiter>>;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Allows `max_requests` per client in each `window`. Each client's window
/// starts with its first request.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    clients: HashMap<String, Window>,
    last_sweep: Option<Instant>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: HashMap::new(),
            last_sweep: None,
        }
    }

    /// Count a request from `client`. Returns false once the client is over
    /// its allowance for the current window.
    pub fn check(&mut self, client: &str, now: Instant) -> bool {
        self.sweep(now);

        let window = self.window;
        let entry = self
            .clients
            .entry(client.to_string())
            .or_insert(Window {
                started: now,
                count: 0,
            });

        if now.duration_since(entry.started) >= window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }

    /// Clients currently tracked.
    pub fn tracked(&self) -> usize {
        self.clients.len()
    }

    // Drop expired windows at most once per window length.
    fn sweep(&mut self, now: Instant) {
        let due = self
            .last_sweep
            .map_or(true, |last| now.duration_since(last) >= self.window);
        if !due {
            return;
        }
        let window = self.window;
        self.clients
            .retain(|_, w| now.duration_since(w.started) < window);
        self.last_sweep = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let mut limiter = FixedWindowLimiter::new(3, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check("1.2.3.4", now));
        assert!(limiter.check("1.2.3.4", now));
        assert!(limiter.check("1.2.3.4", now));
        assert!(!limiter.check("1.2.3.4", now));
    }

    #[test]
    fn test_clients_counted_separately() {
        let mut limiter = FixedWindowLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check("a", now));
        assert!(limiter.check("b", now));
        assert!(!limiter.check("a", now));
    }

    #[test]
    fn test_window_resets() {
        let mut limiter = FixedWindowLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check("a", start));
        assert!(!limiter.check("a", start + Duration::from_secs(59)));
        assert!(limiter.check("a", start + Duration::from_secs(60)));
    }

    #[test]
    fn test_expired_clients_swept() {
        let mut limiter = FixedWindowLimiter::new(5, Duration::from_secs(10));
        let start = Instant::now();
        limiter.check("a", start);
        limiter.check("b", start);
        assert_eq!(limiter.tracked(), 2);

        limiter.check("c", start + Duration::from_secs(11));
        assert_eq!(limiter.tracked(), 1);
    }

    #[tokio::test]
    async fn test_shared_limiter_under_concurrency() {
        let limiter: SharedLimiter = Arc::new(Mutex::new(FixedWindowLimiter::new(
            50,
            Duration::from_secs(60),
        )));
        let now = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..100 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.lock().await.check("same-client", now)
            }));
        }

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 50);
    }
}
