//! Context window sizes of the models aigent knows about.

use crate::constants::DEFAULT_CONTEXT_WINDOW;

/// A known model and its context window in tokens.
pub struct ModelInfo {
    pub name: &'static str,
    pub context_window: usize,
}

const fn model(name: &'static str, context_window: usize) -> ModelInfo {
    ModelInfo {
        name,
        context_window,
    }
}

pub const GEMINI_MODELS: &[ModelInfo] = &[
    model("gemini-2.5-pro", 1_048_576),
    model("gemini-2.5-flash", 1_048_576),
    model("gemini-2.5-flash-lite", 1_048_576),
    model("gemini-2.0-flash", 1_048_576),
    model("gemini-1.5-pro", 2_097_152),
    model("gemini-1.5-flash", 1_048_576),
];

pub const ANTHROPIC_MODELS: &[ModelInfo] = &[
    model("claude-opus-4-6", 200_000),
    model("claude-sonnet-4-6", 200_000),
    model("claude-haiku-4-5", 200_000),
    model("claude-sonnet-4-5", 200_000),
];

pub const OPENAI_MODELS: &[ModelInfo] = &[
    model("gpt-5", 400_000),
    model("gpt-5-mini", 400_000),
    model("gpt-4.1", 1_047_576),
    model("gpt-4.1-mini", 1_047_576),
    model("o3", 200_000),
    model("o4-mini", 200_000),
];

/// Common Ollama models. Anything else falls back to the default window.
pub const OLLAMA_MODELS: &[ModelInfo] = &[
    model("llama3", 8_192),
    model("llama3.1", 131_072),
    model("mistral", 32_768),
    model("qwen2.5-coder", 32_768),
];

/// Context window for `name`, or [`DEFAULT_CONTEXT_WINDOW`] when unknown.
///
/// OpenRouter ids such as `google/gemini-2.5-flash` are matched on the part
/// after the last slash.
pub fn context_window(name: &str) -> usize {
    let bare = name.rsplit('/').next().unwrap_or(name);
    GEMINI_MODELS
        .iter()
        .chain(ANTHROPIC_MODELS)
        .chain(OPENAI_MODELS)
        .chain(OLLAMA_MODELS)
        .find(|m| m.name == bare)
        .map(|m| m.context_window)
        .unwrap_or(DEFAULT_CONTEXT_WINDOW)
}
