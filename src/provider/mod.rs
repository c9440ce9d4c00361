//! LLM provider abstraction for aigent.
//!
//! Wraps rig-core's provider clients behind a [`Provider`] that implements
//! [`ModelClient`](crate::model::ModelClient). Supports Gemini, Anthropic,
//! OpenAI, OpenRouter, and Ollama (local) via `ProviderKind`.

mod client;
mod convert;
mod kind;
mod resolve;

pub use client::Provider;
pub use resolve::resolve_model;
