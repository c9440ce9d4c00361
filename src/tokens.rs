//! Token counting for the transcript.
//!
//! Uses tiktoken-rs. OpenAI models get their exact tokenizer; everything else
//! is approximated with cl100k_base, which is close enough for a warning.

use anyhow::{anyhow, Result};
use tiktoken_rs::{cl100k_base, get_bpe_from_model, CoreBPE};

use crate::constants::{
    CONTEXT_DANGER_THRESHOLD, CONTEXT_WARN_THRESHOLD, TOKENS_CONVERSATION_FRAMING,
    TOKENS_PER_TURN_OVERHEAD,
};
use crate::transcript::Turn;

fn tokenizer(model: &str) -> Result<CoreBPE> {
    get_bpe_from_model(model)
        .or_else(|_| cl100k_base())
        .map_err(|e| anyhow!("failed to load tokenizer: {e}"))
}

/// Approximate prompt size of `turns` plus the preamble.
pub fn count_transcript_tokens(preamble: Option<&str>, turns: &[Turn], model: &str) -> Result<usize> {
    let bpe = tokenizer(model)?;
    let mut total = TOKENS_CONVERSATION_FRAMING;
    if let Some(p) = preamble {
        total += TOKENS_PER_TURN_OVERHEAD + bpe.encode_ordinary(p).len();
    }
    for turn in turns {
        total += TOKENS_PER_TURN_OVERHEAD + bpe.encode_ordinary(&turn.text()).len();
    }
    Ok(total)
}

/// Format a token count for display. Example: "1,234 / 128,000"
pub fn format_token_usage(used: usize, limit: usize) -> String {
    format!("{} / {}", format_number(used), format_number(limit))
}

pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[derive(Debug, PartialEq)]
pub enum ContextStatus {
    Ok { used: usize, limit: usize },
    Warning { used: usize, limit: usize, percent: u8 },
    Critical { used: usize, limit: usize, percent: u8 },
}

pub fn check_context_usage(used: usize, limit: usize) -> ContextStatus {
    let ratio = used as f64 / limit.max(1) as f64;
    let percent = (ratio * 100.0).min(255.0) as u8;
    if ratio >= CONTEXT_DANGER_THRESHOLD {
        ContextStatus::Critical { used, limit, percent }
    } else if ratio >= CONTEXT_WARN_THRESHOLD {
        ContextStatus::Warning { used, limit, percent }
    } else {
        ContextStatus::Ok { used, limit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_048_576), "1,048,576");
        assert_eq!(format_token_usage(1234, 8192), "1,234 / 8,192");
    }

    #[test]
    fn test_check_context_usage_thresholds() {
        assert_eq!(
            check_context_usage(10, 100),
            ContextStatus::Ok { used: 10, limit: 100 }
        );
        assert!(matches!(
            check_context_usage(85, 100),
            ContextStatus::Warning { percent: 85, .. }
        ));
        assert!(matches!(
            check_context_usage(99, 100),
            ContextStatus::Critical { .. }
        ));
    }

    #[test]
    fn test_count_grows_with_transcript() {
        let short = count_transcript_tokens(None, &[Turn::user("hi")], "gpt-4.1").unwrap();
        let long = count_transcript_tokens(
            Some("be brief"),
            &[Turn::user("hi"), Turn::model("hello there, how can I help?")],
            "gemini-2.5-flash",
        )
        .unwrap();
        assert!(short > TOKENS_CONVERSATION_FRAMING);
        assert!(long > short);
    }
}
