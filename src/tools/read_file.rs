use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;

use super::{decode, encode, Tool, ToolError};
use crate::schema::Schema;

/// Reads a whole text file. Paths resolve against the process's working
/// directory.
pub struct ReadFileTool {
    max_size: u64,
}

impl ReadFileTool {
    pub fn new(max_size: u64) -> Self {
        Self { max_size }
    }
}

#[derive(Deserialize)]
struct ReadFileInput {
    path: String,
}

#[derive(Serialize)]
struct ReadFileOutput {
    content: String,
}

#[async_trait::async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a text file entirely. Relative paths resolve against the current working directory."
    }

    fn input_schema(&self) -> Schema {
        Schema::object().field("path", Schema::String, "Path to the file to read")
    }

    fn output_schema(&self) -> Schema {
        Schema::object().field("content", Schema::String, "Text read from the file")
    }

    fn prompt(&self, input: &Value) -> Result<String, ToolError> {
        let input: ReadFileInput = decode(input)?;
        Ok(format!("Read file {}.", input.path))
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let input: ReadFileInput = decode(&input)?;
        let fail = |msg: String| ToolError::Failed(format!("Error reading from {}: {}", input.path, msg));

        let metadata = fs::metadata(&input.path).map_err(|e| fail(e.to_string()))?;
        if metadata.is_dir() {
            return Err(fail("is a directory".into()));
        }
        if metadata.len() > self.max_size {
            return Err(fail(format!(
                "file too large: {} bytes (max {})",
                metadata.len(),
                self.max_size
            )));
        }

        let bytes = fs::read(&input.path).map_err(|e| fail(e.to_string()))?;
        let content = String::from_utf8(bytes).map_err(|_| fail("file is not valid UTF-8".into()))?;
        encode(&ReadFileOutput { content })
    }
}
