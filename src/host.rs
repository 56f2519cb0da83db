//! Host abstraction: the editor-side RPC surface consumed by gitbuf.
//!
//! The editor runtime owns all buffers, windows, and variables; this crate
//! never owns them and only requests mutations through this trait. The trait
//! mirrors the request/response calls the plugin actually needs, so that
//! embedders can back it with their RPC transport and tests can back it with
//! an in-memory implementation.

use crate::error::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// Host-assigned numeric buffer identifier.
pub type BufferId = u64;

/// Editor-side operations available to the plugin.
///
/// All calls are synchronous request/response; the host drives one call at
/// a time per plugin instance, so no interior locking is required here.
pub trait Host {
    /// Environment variables as seen by the editor process.
    fn environ(&self) -> Result<HashMap<String, String>>;

    /// The editor's verbosity level (0 = quiet).
    fn verbosity(&self) -> Result<u64>;

    /// The editor's current working directory.
    fn cwd(&self) -> Result<PathBuf>;

    /// Show an informational message to the user.
    fn echo(&self, message: &str) -> Result<()>;

    /// Expand an editor path expression (`~`, `%`, environment references).
    fn expand(&self, expr: &str) -> Result<String>;

    /// The currently focused buffer.
    fn current_buffer(&self) -> Result<BufferId>;

    /// Open (or focus) a buffer with the given name, returning its id.
    fn open_buffer(&self, name: &str) -> Result<BufferId>;

    /// The name of a buffer.
    fn buffer_name(&self, bufnr: BufferId) -> Result<String>;

    /// The filesystem path backing a buffer, if it is file-backed.
    fn buffer_path(&self, bufnr: BufferId) -> Result<Option<PathBuf>>;

    /// All lines of a buffer.
    fn get_lines(&self, bufnr: BufferId) -> Result<Vec<String>>;

    /// Replace the entire content of a buffer with the given lines.
    ///
    /// The replacement is whole-buffer: prior content is removed even when
    /// the new content is shorter, leaving no residual lines.
    fn set_lines(&self, bufnr: BufferId, lines: &[String]) -> Result<()>;

    /// Read a buffer-local option.
    fn get_option(&self, bufnr: BufferId, name: &str) -> Result<Value>;

    /// Set a buffer-local option.
    fn set_option(&self, bufnr: BufferId, name: &str, value: Value) -> Result<()>;

    /// Read a buffer-local variable, `None` when unset.
    fn get_var(&self, bufnr: BufferId, name: &str) -> Result<Option<Value>>;

    /// Set a buffer-local variable.
    fn set_var(&self, bufnr: BufferId, name: &str, value: Value) -> Result<()>;
}

/// Read a buffer-local option as a boolean.
///
/// Editors report boolean options either as booleans or as 0/1 numbers
/// depending on the transport; both are accepted.
pub fn option_bool(host: &dyn Host, bufnr: BufferId, name: &str) -> Result<bool> {
    let value = host.get_option(bufnr, name)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
        _ => false,
    })
}
