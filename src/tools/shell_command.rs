//! Shell command tool: runs a command through `sh -c` in a fresh process.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{decode, encode, Tool, ToolError};
use crate::constants::SHELL_STRIPPED_ENV_VARS;
use crate::schema::Schema;

/// Tool that executes shell commands in a child process.
///
/// Each call spawns a new shell, so no working-directory state carries over
/// between calls. stdout and stderr are captured separately and each is
/// capped at `max_output` bytes. Provider API keys are stripped from the
/// child's environment.
pub struct ShellCommandTool {
    default_timeout_secs: u64,
    max_output: usize,
}

impl ShellCommandTool {
    pub fn new(default_timeout_secs: u64, max_output: usize) -> Self {
        Self {
            default_timeout_secs,
            max_output,
        }
    }
}

#[derive(Deserialize)]
struct ShellCommandInput {
    command: String,
    timeout: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShellCommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Truncate `output` to at most `limit` bytes, appending a notice when
/// truncation occurs.
fn cap_output(output: &str, limit: usize) -> String {
    if output.len() <= limit {
        return output.to_string();
    }
    // Find a valid UTF-8 boundary at or before the limit.
    let mut end = limit;
    while end > 0 && !output.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\n... output truncated at {} bytes", &output[..end], limit)
}

/// Keep the first `limit` bytes of a pipe and discard the rest, so a noisy
/// command cannot grow memory past the cap.
async fn read_capped<R>(pipe: Option<R>, limit: usize) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let Some(mut pipe) = pipe else {
        return Ok(buf);
    };
    (&mut pipe).take(limit as u64).read_to_end(&mut buf).await?;
    tokio::io::copy(&mut pipe, &mut tokio::io::sink()).await?;
    Ok(buf)
}

#[async_trait::async_trait]
impl Tool for ShellCommandTool {
    fn name(&self) -> &str {
        "shell_command"
    }

    fn description(&self) -> &str {
        "Execute any shell command and get back its exit code, stdout and stderr. \
Every call runs in a new shell started in the current working directory, so \
state such as `cd` does not persist: prefix the command with `cd <dir> &&` \
whenever it must run somewhere else."
    }

    fn input_schema(&self) -> Schema {
        Schema::object()
            .field("command", Schema::String, "Command to perform in shell")
            .optional_field(
                "timeout",
                Schema::Integer,
                "Timeout in seconds (default 30)",
            )
    }

    fn output_schema(&self) -> Schema {
        Schema::object()
            .field(
                "exitCode",
                Schema::Integer,
                "Exit code of the command. 0 means success.",
            )
            .field("stdout", Schema::String, "Standard output of the command")
            .field("stderr", Schema::String, "Error output of the command")
    }

    fn prompt(&self, input: &Value) -> Result<String, ToolError> {
        let input: ShellCommandInput = decode(input)?;
        Ok(format!("Execute shell command `{}`.", input.command))
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let input: ShellCommandInput = decode(&input)?;
        let timeout_secs = input.timeout.unwrap_or(self.default_timeout_secs).max(1);

        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c").arg(&input.command);
        for var in SHELL_STRIPPED_ENV_VARS {
            cmd.env_remove(var);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| ToolError::Failed(format!("Failed to execute command: {}", e)))?;

        tracing::debug!(command = %input.command, timeout_secs, "spawned shell command");

        // One byte past the cap is enough for cap_output to notice truncation.
        let limit = self.max_output.saturating_add(1);
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let run = async {
            let (stdout, stderr, status) = tokio::join!(
                read_capped(stdout, limit),
                read_capped(stderr, limit),
                child.wait()
            );
            Ok::<_, std::io::Error>((stdout?, stderr?, status?))
        };

        let (stdout, stderr, status) = tokio::time::timeout(Duration::from_secs(timeout_secs), run)
            .await
            .map_err(|_| ToolError::Timeout(timeout_secs))?
            .map_err(|e| ToolError::Failed(format!("Failed to execute command: {}", e)))?;

        let result = ShellCommandOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: cap_output(&String::from_utf8_lossy(&stdout), self.max_output),
            stderr: cap_output(&String::from_utf8_lossy(&stderr), self.max_output),
        };
        encode(&result)
    }
}
