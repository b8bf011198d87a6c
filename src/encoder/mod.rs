//! WebP encoding through external binaries.
//!
//! | Piece | Role |
//! |---|---|
//! | [`Encoder`] | the one capability the converter needs: run an [`EncodeRequest`] |
//! | [`CommandEncoder`] | production implementation, spawns `cwebp` / `gif2webp` |
//! | [`Toolchain`] | `PATH` lookup of the binaries, run before any conversion |
//!
//! The converter builds requests (tool choice, argument order) itself, so
//! fake encoders in tests see exactly what a real process would receive.

pub mod backend;
pub mod command;
pub mod tools;

pub use backend::{EncodeError, EncodeRequest, Encoder, OUTPUT_FLAG, QUIET_FLAG};
pub use command::CommandEncoder;
pub use tools::{ToolError, Toolchain};
