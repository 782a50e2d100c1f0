//! Subprocess answer source
//!
//! Runs `<program> [args...] [debug_flag] <question>` once per question and
//! captures standard output as the answer.

use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

use super::traits::{AnswerSource, Invocation};
use crate::config::ProcessSourceConfig;

/// Answer source backed by an external command-line program
#[derive(Debug, Clone)]
pub struct ProcessAnswerSource {
    name: String,
    program: String,
    args: Vec<String>,
    debug_flag: String,
    timeout: Option<Duration>,
}

impl ProcessAnswerSource {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            name: format!("process:{}", program),
            program,
            args: Vec::new(),
            debug_flag: "-d".to_string(),
            timeout: None,
        }
    }

    pub fn from_config(config: &ProcessSourceConfig) -> Self {
        let mut source = Self::new(config.program.clone())
            .with_args(config.args.clone())
            .with_debug_flag(config.debug_flag.clone());
        source.timeout = config.timeout();
        source
    }

    /// Arguments placed before the question, e.g. a subcommand
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_debug_flag(mut self, flag: impl Into<String>) -> Self {
        self.debug_flag = flag.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Argument vector for one question; the question is always last
    pub fn command_args(&self, question: &str, debug: bool) -> Vec<String> {
        let mut args = self.args.clone();
        if debug && !self.debug_flag.is_empty() {
            args.push(self.debug_flag.clone());
        }
        args.push(question.to_string());
        args
    }
}

#[async_trait::async_trait]
impl AnswerSource for ProcessAnswerSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, question: &str, debug: bool) -> Invocation {
        let args = self.command_args(question, debug);
        tracing::debug!(program = %self.program, ?args, "Invoking answer program");

        let mut cmd = Command::new(&self.program);
        cmd.args(&args).stdin(Stdio::null()).kill_on_drop(true);

        let start = Instant::now();
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(output) => output,
                // Dropping the future kills the child
                Err(_) => {
                    return Invocation::failure(
                        format!("timed out after {:.1}s", limit.as_secs_f64()),
                        start.elapsed(),
                    )
                }
            },
            None => cmd.output().await,
        };
        let duration = start.elapsed();

        match output {
            Err(e) => Invocation::failure(format!("failed to run {}: {}", self.program, e), duration),
            Ok(out) if out.status.success() => {
                let response = String::from_utf8_lossy(&out.stdout).trim().to_string();
                Invocation::success(response, duration)
            }
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
                let detail = if stderr.is_empty() {
                    format!("Unknown error ({})", out.status)
                } else {
                    stderr
                };
                Invocation::failure(detail, duration)
            }
        }
    }
}
