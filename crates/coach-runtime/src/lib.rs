//! # Debate Coach Runtime
//!
//! Tokio-based orchestration of the debate pipeline.
//!
//! | Stage | Component |
//! |-------|-----------|
//! | Evidence | [`coach_evidence::EvidenceFetcher`] |
//! | Prompting | [`prompts`] |
//! | Completion | [`CompletionRequester`] |
//! | Normalize + splice | [`coach_core`] |
//! | Orchestration | [`DebateCoach`] |

pub mod coach;
pub mod config;
pub mod prompts;
pub mod requester;

pub use coach::{Analysis, DebateCoach, Exchange};
pub use config::CoachConfig;
pub use requester::CompletionRequester;
