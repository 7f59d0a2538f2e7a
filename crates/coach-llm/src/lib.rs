//! # Debate Coach LLM
//!
//! Completion providers used by the coaching pipeline.
//!
//! ## Supported Backends
//!
//! | Provider | Type | Key Required |
//! |----------|------|--------------|
//! | Gemini | API | `GEMINI_API_KEY` |
//! | OpenAI | API | `OPENAI_API_KEY` |
//! | Mock | Testing (`COACH_PROVIDER=mock`) | None |
//!
//! ## Quick Start
//!
//! ```rust
//! use coach_llm::{LlmProvider, MockProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let llm = MockProvider::constant("Hello!");
//!     let response = llm.ask("Say hello").await.unwrap();
//!     assert_eq!(response, "Hello!");
//! }
//! ```
//!
//! ## With Gemini
//!
//! ```rust,ignore
//! use coach_llm::GeminiProvider;
//!
//! let api_key = std::env::var("GEMINI_API_KEY").unwrap();
//! let llm = GeminiProvider::flash(&api_key);
//! let response = llm.ask("Give me one argument for school uniforms").await.unwrap();
//! ```

pub mod config;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod unconfigured;

pub use config::{ConfigError, LlmConfig};
pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use openai::OpenAIProvider;
pub use provider::{LlmError, LlmProvider, LlmRequest, LlmResponse};
pub use unconfigured::UnconfiguredProvider;
