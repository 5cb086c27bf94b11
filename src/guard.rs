//! Input guard: fixed-window rate limiter with a hard block, plus a
//! pattern-based content filter.
//!
//! The filter is a closed-world heuristic over a denylist. It does not parse
//! anything, so false positives and negatives are expected.

use regex::RegexSet;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::{ConfigError, GuardConfig};
use crate::output::escape_html;

/// Built-in denylist. Tag openers, scripting URIs, inline event handlers,
/// eval calls, global object access, traversal, sensitive paths, template
/// interpolation and raw backticks.
const DENYLIST: &[&str] = &[
    r"(?i)<script",
    r"(?i)javascript:",
    r"(?i)on\w+\s*=",
    r"(?i)eval\s*\(",
    r"(?i)document\.",
    r"(?i)window\.",
    r"\.\./",
    r"/etc/",
    r"\$\{",
    r"`",
];

/// Upper bound for the configured window and block lengths (one year).
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Reasons a line is turned away before execution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    /// The check that crossed the threshold and started the block.
    #[error("Too many commands. Temporarily blocked.")]
    Blocked { retry_after_secs: u64 },
    /// Any check made while the block is active.
    #[error("Rate limited. Try again in {retry_after_secs}s.")]
    RateLimited { retry_after_secs: u64 },
    #[error("Input too long")]
    TooLong,
    #[error("Invalid input detected")]
    Suspicious,
}

impl GuardError {
    /// Seconds until input is accepted again, for rate failures.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::Blocked { retry_after_secs } | Self::RateLimited { retry_after_secs } => {
                Some(*retry_after_secs)
            }
            Self::TooLong | Self::Suspicious => None,
        }
    }
}

#[derive(Debug, Clone)]
struct RateState {
    count: u32,
    window_start: Instant,
    blocked_until: Option<Instant>,
}

impl RateState {
    fn new(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
            blocked_until: None,
        }
    }
}

/// Rate counters exposed for status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSnapshot {
    pub count: u32,
    pub max_per_window: u32,
}

/// Rate limiter and content filter owned by one interpreter.
pub struct InputGuard {
    max_per_window: u32,
    window: Duration,
    block: Duration,
    max_input_len: usize,
    patterns: RegexSet,
    state: RateState,
}

impl InputGuard {
    /// Build a guard, compiling the built-in denylist plus any configured
    /// extra patterns.
    pub fn new(config: &GuardConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Instant::now())
    }

    /// Build a guard whose first window starts at `now`.
    pub fn with_clock(config: &GuardConfig, now: Instant) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("window_secs", config.window_secs),
            ("block_secs", config.block_secs),
        ] {
            if value > MAX_DURATION_SECS {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    max: MAX_DURATION_SECS,
                });
            }
        }

        for pattern in &config.extra_patterns {
            regex::Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }

        let all = DENYLIST
            .iter()
            .map(|p| p.to_string())
            .chain(config.extra_patterns.iter().cloned());
        let patterns = RegexSet::new(all).map_err(|e| ConfigError::InvalidPattern {
            pattern: "<denylist>".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            max_per_window: config.max_commands_per_window,
            window: config.window(),
            block: config.block(),
            max_input_len: config.max_input_len,
            patterns,
            state: RateState::new(now),
        })
    }

    /// Count one submission against the current window.
    ///
    /// The window resets first, but an active block still wins: a block set
    /// late in one window outlives that window's reset.
    pub fn check_rate(&mut self, now: Instant) -> Result<(), GuardError> {
        let state = &mut self.state;

        if now.saturating_duration_since(state.window_start) > self.window {
            state.count = 0;
            state.window_start = now;
        }

        if let Some(until) = state.blocked_until {
            if now < until {
                let retry_after_secs = ceil_secs(until - now);
                debug!(retry_after_secs, "submission rejected during block");
                return Err(GuardError::RateLimited { retry_after_secs });
            }
            state.blocked_until = None;
        }

        state.count += 1;

        if state.count > self.max_per_window {
            // Falls back to `now` only at the platform's Instant limit.
            state.blocked_until = now.checked_add(self.block).or(Some(now));
            warn!(
                count = state.count,
                max = self.max_per_window,
                block_secs = self.block.as_secs(),
                "rate threshold exceeded, blocking input"
            );
            return Err(GuardError::Blocked {
                retry_after_secs: ceil_secs(self.block),
            });
        }

        Ok(())
    }

    /// Validate a trimmed line and return its markup-safe form.
    pub fn sanitize(&self, raw: &str) -> Result<String, GuardError> {
        if raw.chars().count() > self.max_input_len {
            return Err(GuardError::TooLong);
        }
        if self.patterns.is_match(raw) {
            debug!("input matched denylist");
            return Err(GuardError::Suspicious);
        }
        Ok(escape_html(raw))
    }

    pub fn rate_snapshot(&self) -> RateSnapshot {
        RateSnapshot {
            count: self.state.count,
            max_per_window: self.max_per_window,
        }
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard_at(now: Instant) -> InputGuard {
        InputGuard::with_clock(&GuardConfig::default(), now).unwrap()
    }

    #[test]
    fn test_rate_limit_trips_on_31st() {
        let t0 = Instant::now();
        let mut guard = guard_at(t0);

        for i in 0..30 {
            assert!(guard.check_rate(t0 + Duration::from_secs(i)).is_ok());
        }
        let err = guard.check_rate(t0 + Duration::from_secs(30)).unwrap_err();
        assert_eq!(err, GuardError::Blocked { retry_after_secs: 30 });
        assert!(err.retry_after().unwrap() > 0);
    }

    #[test]
    fn test_block_lasts_exactly_block_secs() {
        let t0 = Instant::now();
        let mut guard = guard_at(t0);
        for _ in 0..30 {
            guard.check_rate(t0).unwrap();
        }
        let tripped = t0 + Duration::from_secs(50);
        assert!(guard.check_rate(tripped).is_err());

        // The window resets at 60s but the block keeps rejecting.
        let err = guard.check_rate(t0 + Duration::from_secs(61)).unwrap_err();
        assert_eq!(err, GuardError::RateLimited { retry_after_secs: 19 });

        let almost = tripped + Duration::from_millis(29_999);
        assert_eq!(
            guard.check_rate(almost).unwrap_err(),
            GuardError::RateLimited { retry_after_secs: 1 }
        );

        assert!(guard.check_rate(tripped + Duration::from_secs(30)).is_ok());
    }

    #[test]
    fn test_window_reset() {
        let t0 = Instant::now();
        let mut guard = guard_at(t0);
        for _ in 0..30 {
            guard.check_rate(t0).unwrap();
        }
        assert!(guard.check_rate(t0 + Duration::from_secs(61)).is_ok());
        assert_eq!(guard.rate_snapshot().count, 1);
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let t0 = Instant::now();
        let mut guard = guard_at(t0);
        for _ in 0..30 {
            guard.check_rate(t0).unwrap();
        }
        // Exactly 60s elapsed is still the same window.
        assert!(guard.check_rate(t0 + Duration::from_secs(60)).is_err());
    }

    #[test]
    fn test_sanitize_too_long() {
        let guard = guard_at(Instant::now());
        let line = "a".repeat(201);
        assert_eq!(guard.sanitize(&line), Err(GuardError::TooLong));
        assert!(guard.sanitize(&"a".repeat(200)).is_ok());
        assert_eq!(GuardError::TooLong.to_string(), "Input too long");
    }

    #[test]
    fn test_sanitize_length_counts_chars() {
        let guard = guard_at(Instant::now());
        assert!(guard.sanitize(&"é".repeat(200)).is_ok());
    }

    #[test]
    fn test_sanitize_denylist() {
        let guard = guard_at(Instant::now());
        for line in [
            "echo <script>alert(1)</script>",
            "hello <SCRIPT",
            "javascript:void(0)",
            "img onerror = x",
            "eval (1)",
            "document.cookie",
            "window.location",
            "cat ../secret",
            "cat /etc/passwd",
            "echo ${HOME}",
            "echo `id`",
        ] {
            assert_eq!(guard.sanitize(line), Err(GuardError::Suspicious), "{line}");
        }
        assert_eq!(GuardError::Suspicious.to_string(), "Invalid input detected");
    }

    #[test]
    fn test_length_checked_before_patterns() {
        let guard = guard_at(Instant::now());
        let line = format!("<script{}", "a".repeat(250));
        assert_eq!(guard.sanitize(&line), Err(GuardError::TooLong));
    }

    #[test]
    fn test_sanitize_escapes() {
        let guard = guard_at(Instant::now());
        assert_eq!(
            guard.sanitize(r#"echo <b> & "q" 'a'"#).unwrap(),
            "echo &lt;b&gt; &amp; &quot;q&quot; &#039;a&#039;"
        );
        assert_eq!(guard.sanitize("help").unwrap(), "help");
    }

    #[test]
    fn test_extra_patterns() {
        let cfg = GuardConfig {
            extra_patterns: vec![r"(?i)drop\s+table".to_string()],
            ..Default::default()
        };
        let guard = InputGuard::new(&cfg).unwrap();
        assert_eq!(guard.sanitize("DROP TABLE users"), Err(GuardError::Suspicious));
    }

    #[test]
    fn test_out_of_range_durations_rejected() {
        let cfg = GuardConfig {
            max_commands_per_window: 1,
            block_secs: u64::MAX,
            ..Default::default()
        };
        assert!(matches!(
            InputGuard::new(&cfg),
            Err(ConfigError::OutOfRange { field: "block_secs", .. })
        ));

        let cfg = GuardConfig {
            window_secs: MAX_DURATION_SECS + 1,
            ..Default::default()
        };
        assert!(matches!(
            InputGuard::new(&cfg),
            Err(ConfigError::OutOfRange { field: "window_secs", .. })
        ));
    }

    #[test]
    fn test_longest_block_trips_without_panic() {
        let cfg = GuardConfig {
            max_commands_per_window: 1,
            block_secs: MAX_DURATION_SECS,
            ..Default::default()
        };
        let t0 = Instant::now();
        let mut guard = InputGuard::with_clock(&cfg, t0).unwrap();
        assert!(guard.check_rate(t0).is_ok());
        assert_eq!(
            guard.check_rate(t0).unwrap_err(),
            GuardError::Blocked {
                retry_after_secs: MAX_DURATION_SECS
            }
        );
        assert!(guard.check_rate(t0 + Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_invalid_extra_pattern() {
        let cfg = GuardConfig {
            extra_patterns: vec!["(unclosed".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            InputGuard::new(&cfg),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

}
