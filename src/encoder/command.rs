//! Subprocess-backed encoder.
//!
//! Runs the resolved `cwebp` / `gif2webp` binary with stdin closed and both
//! output streams captured. The call blocks until the child exits; there is
//! no timeout.

use super::backend::{EncodeError, EncodeRequest, Encoder};
use super::tools::Toolchain;
use std::process::{Command, Stdio};

/// Encoder that shells out to the WebP command-line tools.
#[derive(Debug, Clone)]
pub struct CommandEncoder {
    toolchain: Toolchain,
}

impl CommandEncoder {
    pub fn new(toolchain: Toolchain) -> Self {
        Self { toolchain }
    }
}

impl Encoder for CommandEncoder {
    fn encode(&self, request: &EncodeRequest) -> Result<(), EncodeError> {
        let program = self
            .toolchain
            .path_for(request.tool)
            .ok_or(EncodeError::ToolUnavailable(request.tool))?;

        log::debug!("running {}", request.command_line());

        let output = Command::new(program)
            .args(request.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| EncodeError::Launch {
                tool: request.tool,
                source,
            })?;

        if !output.stdout.is_empty() {
            log::debug!(
                "{} stdout: {}",
                request.tool,
                String::from_utf8_lossy(&output.stdout).trim_end()
            );
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::debug!("{} failed on {}: {stderr}", request.tool, request.source.display());
            return Err(EncodeError::Exit {
                tool: request.tool,
                status: output.status,
                stderr,
            });
        }

        Ok(())
    }
}
