//! Answer sources
//!
//! Provides a unified trait for the different ways of reaching the system
//! under test:
//! - external program (subprocess per question)
//! - chat-completions HTTP endpoint
//! - canned offline answers

pub mod http;
pub mod process;
pub mod simulated;
pub mod traits;

pub use http::HttpAnswerSource;
pub use process::ProcessAnswerSource;
pub use simulated::SimulatedAnswerSource;
pub use traits::{AnswerSource, Invocation};

use anyhow::Result;

use crate::config::{SourceConfig, SourceKind};

/// Build the configured answer source.
///
/// An HTTP source without an API key degrades to simulated answers.
pub fn build_source(config: &SourceConfig) -> Result<Box<dyn AnswerSource>> {
    let source: Box<dyn AnswerSource> = match config.kind {
        SourceKind::Process => Box::new(ProcessAnswerSource::from_config(&config.process)),
        SourceKind::Http => match std::env::var(&config.http.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Box::new(HttpAnswerSource::new(&config.http, key)?),
            _ => {
                tracing::warn!(
                    "{} is not set, answering with simulated responses",
                    config.http.api_key_env
                );
                Box::new(SimulatedAnswerSource)
            }
        },
        SourceKind::Simulated => Box::new(SimulatedAnswerSource),
    };

    tracing::info!("Answer source: {} ({})", source.name(), config.kind.name());
    Ok(source)
}
