use crate::config::GatewayConfig;
use std::time::Duration;

/// What the engine does with a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    /// 2xx: parse the body.
    Proceed,
    /// 503 with attempts left.
    Retry { delay: Duration },
    /// Anything else outside 2xx, or a 503 on the last attempt.
    Fail,
}

/// Fixed-delay retry on 503 Service Unavailable.
///
/// Only 503 is transient here: the wiki uses it for maxlag rejections and
/// read-only periods. Every other failure is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    /// Total attempts, first one included.
    pub retry_count: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            retry_count: config.retry_count,
            delay: config.retry_delay(),
        }
    }

    /// `attempt` is 1-based.
    pub fn decide(&self, status: u16, attempt: u32) -> Decision {
        if status == 503 && attempt < self.retry_count {
            return Decision::Retry { delay: self.delay };
        }
        if (200..300).contains(&status) {
            Decision::Proceed
        } else {
            Decision::Fail
        }
    }
}
