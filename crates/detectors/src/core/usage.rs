use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Token accounting for a single detector call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Call accounting for one category's detector invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallUsage {
    pub attempted: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub tokens: TokenUsage,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl CallUsage {
    pub fn success(tokens: TokenUsage, elapsed: Duration) -> Self {
        Self {
            attempted: 1,
            succeeded: 1,
            failed: 0,
            tokens,
            elapsed,
        }
    }

    pub fn failure(elapsed: Duration) -> Self {
        Self {
            attempted: 1,
            succeeded: 0,
            failed: 1,
            tokens: TokenUsage::default(),
            elapsed,
        }
    }

    /// A failed call that still consumed tokens (transport succeeded but the
    /// payload was undecodable).
    pub fn failure_with_tokens(tokens: TokenUsage, elapsed: Duration) -> Self {
        Self {
            attempted: 1,
            succeeded: 0,
            failed: 1,
            tokens,
            elapsed,
        }
    }
}

/// Request-level usage summary, summed across all categories when the
/// orchestration join completes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageSummary {
    pub calls_attempted: u32,
    pub calls_succeeded: u32,
    pub calls_failed: u32,
    pub tokens: TokenUsage,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl UsageSummary {
    pub fn absorb(&mut self, call: &CallUsage) {
        self.calls_attempted += call.attempted;
        self.calls_succeeded += call.succeeded;
        self.calls_failed += call.failed;
        self.tokens.add(&call.tokens);
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        (value.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_absorbs_calls() {
        let mut summary = UsageSummary::default();
        summary.absorb(&CallUsage::success(
            TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 50,
                total_tokens: 150,
            },
            Duration::from_millis(20),
        ));
        summary.absorb(&CallUsage::failure(Duration::from_millis(5)));

        assert_eq!(summary.calls_attempted, 2);
        assert_eq!(summary.calls_succeeded, 1);
        assert_eq!(summary.calls_failed, 1);
        assert_eq!(summary.tokens.total_tokens, 150);
    }
}
