//! Answer source abstraction
//!
//! Defines the single capability the benchmark needs from the system under
//! test, so the runner can be driven by stubs without spawning processes.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Outcome of asking one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    /// Raw answer text, or the error detail when the call failed
    pub response: String,
    /// Wall-clock time of the call, measured even on failure
    pub duration: Duration,
    pub success: bool,
    pub error: Option<String>,
}

impl Invocation {
    pub fn success(response: impl Into<String>, duration: Duration) -> Self {
        Self {
            response: response.into(),
            duration,
            success: true,
            error: None,
        }
    }

    /// A failed call. The detail doubles as the stored response.
    pub fn failure(detail: impl Into<String>, duration: Duration) -> Self {
        let detail = detail.into();
        Self {
            response: format!("Error: {}", detail),
            duration,
            success: false,
            error: Some(detail),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// Something that answers natural-language questions
///
/// Implementations never return an error: every failure (non-zero exit,
/// timeout, network error) is folded into a failed [`Invocation`] so a
/// single bad question cannot abort a run.
#[async_trait::async_trait]
pub trait AnswerSource: Send + Sync {
    /// Short label used in logs and banners
    fn name(&self) -> &str;

    /// Ask one question. `debug` requests verbose diagnostic output where
    /// the source supports it.
    async fn invoke(&self, question: &str, debug: bool) -> Invocation;
}

/// Helper to measure duration of an async operation
pub async fn measure_async<F, T>(f: F) -> (T, Duration)
where
    F: std::future::Future<Output = T>,
{
    let start = Instant::now();
    let result = f.await;
    (result, start.elapsed())
}
