//! Write-file tool. Creates or truncates the target, making parent directories as needed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use super::{decode, encode, Tool, ToolError};
use crate::constants::PROMPT_PREVIEW_CHARS;
use crate::diff;
use crate::schema::Schema;

/// Tool that writes string content to a file, creating or truncating it.
///
/// Parent directories are created automatically. Relative paths resolve
/// against the process's working directory.
pub struct WriteFileTool;

impl WriteFileTool {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Deserialize)]
struct WriteFileInput {
    path: String,
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteFileOutput {
    path: String,
    bytes_written: usize,
}

#[async_trait::async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write text to a file, replacing any existing content. Creates parent directories as needed."
    }

    fn input_schema(&self) -> Schema {
        Schema::object()
            .field("path", Schema::String, "Path of the file to write")
            .field("content", Schema::String, "Content of the file")
    }

    fn output_schema(&self) -> Schema {
        Schema::object()
            .field("path", Schema::String, "Path that was written")
            .field("bytesWritten", Schema::Integer, "Number of bytes written")
    }

    fn prompt(&self, input: &Value) -> Result<String, ToolError> {
        let input: WriteFileInput = decode(input)?;
        let preview: String = input.content.chars().take(PROMPT_PREVIEW_CHARS).collect();
        let ellipsis = if input.content.chars().count() > PROMPT_PREVIEW_CHARS {
            "..."
        } else {
            ""
        };
        Ok(format!(
            "Write file to {} with content: {}{}.",
            input.path, preview, ellipsis
        ))
    }

    /// Colored diff against the current file, or an all-additions preview for
    /// a new one. Reads with sync I/O; the user is waiting at the prompt anyway.
    fn preview(&self, input: &Value) -> Option<String> {
        let input: WriteFileInput = decode(input).ok()?;
        let path = Path::new(&input.path);
        if path.is_file() {
            let old = fs::read_to_string(path).ok()?;
            Some(diff::unified_diff(&old, &input.content, &input.path))
        } else {
            Some(diff::new_file_preview(&input.content, &input.path))
        }
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let input: WriteFileInput = decode(&input)?;
        let fail = |e: std::io::Error| ToolError::Failed(format!("Error writing to {}: {}", input.path, e));

        if let Some(parent) = Path::new(&input.path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(fail)?;
            }
        }
        fs::write(&input.path, &input.content).map_err(fail)?;

        encode(&WriteFileOutput {
            path: input.path.clone(),
            bytes_written: input.content.len(),
        })
    }
}
