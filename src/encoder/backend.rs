//! Encoder trait and request type.
//!
//! An [`EncodeRequest`] carries everything a subprocess invocation needs:
//! the tool, the flags, and the source and destination paths. Argument order
//! is fixed:
//!
//! ```text
//! <tool> <flags...> -quiet <source> -o <destination>
//! ```

use crate::naming::Tool;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Suppresses encoder progress output.
pub const QUIET_FLAG: &str = "-quiet";
/// Precedes the destination path.
pub const OUTPUT_FLAG: &str = "-o";

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("{0} is not installed")]
    ToolUnavailable(Tool),
    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: Tool,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    Exit {
        tool: Tool,
        status: ExitStatus,
        stderr: String,
    },
}

/// One conversion for an encoder to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRequest {
    pub tool: Tool,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub flags: Vec<String>,
}

impl EncodeRequest {
    /// Arguments after the program name. Paths are passed through as-is.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.flags.iter().map(OsString::from).collect();
        args.push(QUIET_FLAG.into());
        args.push(self.source.clone().into_os_string());
        args.push(OUTPUT_FLAG.into());
        args.push(self.destination.clone().into_os_string());
        args
    }

    /// Shell-like rendering for verbose output and logs.
    ///
    /// Display only: bytes that are not valid UTF-8 are replaced.
    pub fn command_line(&self) -> String {
        let mut line = self.tool.program().to_string();
        for arg in self.args() {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// Runs encode requests.
///
/// Implementations must leave a file at `request.destination` when they
/// return `Ok`.
pub trait Encoder {
    fn encode(&self, request: &EncodeRequest) -> Result<(), EncodeError>;
}

impl<E: Encoder + ?Sized> Encoder for &E {
    fn encode(&self, request: &EncodeRequest) -> Result<(), EncodeError> {
        (**self).encode(request)
    }
}
