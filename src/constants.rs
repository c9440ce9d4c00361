//! Centralized constants for aigent.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "aigent";

/// Raw user input that ends the session.
pub const EXIT_COMMAND: &str = "exit";

/// Maximum tokens for LLM completions.
pub const MAX_TOKENS: u64 = 4096;

/// Default system prompt prepended to all conversations.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant working in the user's terminal. \
You can run shell commands and read or write files with the provided tools. \
Answer concisely.";

/// Prefix of the synthetic user turn sent after a denied tool call.
pub const DENIAL_MESSAGE: &str = "I do not allow running this function.";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "aigent.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "chat_history.txt";

// --- Provider defaults ---

/// Default provider when none is configured.
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Default LLM model identifier for Gemini.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Default LLM model identifier for Anthropic.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-6";

/// Default LLM model identifier for OpenAI.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1";

/// Default LLM model identifier for OpenRouter.
pub const DEFAULT_OPENROUTER_MODEL: &str = "arcee-ai/trinity-large-preview:free";

/// Default base URL for local Ollama server.
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default LLM model identifier for Ollama.
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3";

// --- Context window ---

/// Default context window size for models not in the registry.
pub const DEFAULT_CONTEXT_WINDOW: usize = 8_192;

/// Context usage ratio at which a warning is shown (80%).
pub const CONTEXT_WARN_THRESHOLD: f64 = 0.80;

/// Context usage ratio at which the warning turns critical (95%).
pub const CONTEXT_DANGER_THRESHOLD: f64 = 0.95;

/// Approximate token overhead per turn (role markers, etc.).
pub const TOKENS_PER_TURN_OVERHEAD: usize = 4;

/// Approximate token overhead for conversation framing.
pub const TOKENS_CONVERSATION_FRAMING: usize = 2;

// --- Loop limits ---

/// Default number of automatic tool rounds before control returns to the user.
pub const MAX_TOOL_ROUNDS_DEFAULT: usize = 25;

/// Default timeout for one model round trip.
pub const MODEL_TIMEOUT_SECS_DEFAULT: u64 = 120;

// --- Tool limits ---

/// Default timeout for a shell command.
pub const SHELL_TIMEOUT_SECS_DEFAULT: u64 = 30;

/// Default cap on each captured shell stream (stdout and stderr separately).
pub const SHELL_MAX_OUTPUT_DEFAULT: usize = 100 * 1024;

/// Environment variables removed from the shell tool's child processes.
pub const SHELL_STRIPPED_ENV_VARS: &[&str] = &[
    "GEMINI_API_KEY",
    "ANTHROPIC_API_KEY",
    "OPENAI_API_KEY",
    "OPENROUTER_API_KEY",
];

/// Default maximum file size (bytes) the read_file tool will read.
pub const READ_FILE_MAX_SIZE_DEFAULT: u64 = 1024 * 1024;

/// Longest argument preview shown in an approval prompt.
pub const PROMPT_PREVIEW_CHARS: usize = 200;
