use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of outbound `User-Agent` values.
///
/// The timetable backend throttles clients that repeat the same identity, so
/// the schedule client asks for a fresh value per request. Any implementation
/// is acceptable as long as it is cheap and thread-safe.
pub trait ClientIdentity: Send + Sync {
    /// Produce the identity string for the next outbound request.
    fn next_identity(&self) -> String;
}

/// Browser identities rotated round-robin.
pub struct RotatingIdentity {
    pool: Vec<String>,
    cursor: AtomicUsize,
}

const DEFAULT_POOL: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36 Edg/125.0.0.0",
];

impl RotatingIdentity {
    /// Rotate over a caller-supplied pool. Empty pools are rejected.
    pub fn new(pool: Vec<String>) -> crate::Result<Self> {
        if pool.is_empty() {
            return Err(crate::Error::Config(
                "identity pool must not be empty".to_string(),
            ));
        }
        Ok(Self {
            pool,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Rotate over a built-in pool of common browser identities.
    pub fn with_defaults() -> Self {
        Self {
            pool: DEFAULT_POOL.iter().map(|s| (*s).to_string()).collect(),
            cursor: AtomicUsize::new(0),
        }
    }
}

impl Default for RotatingIdentity {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ClientIdentity for RotatingIdentity {
    fn next_identity(&self) -> String {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.pool.len();
        self.pool[idx].clone()
    }
}

/// A single fixed identity.
pub struct FixedIdentity(pub String);

impl ClientIdentity for FixedIdentity {
    fn next_identity(&self) -> String {
        self.0.clone()
    }
}
