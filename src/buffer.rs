//! Buffer synchronization helpers.
//!
//! Feature commands render into host-owned buffers that are usually kept
//! non-modifiable so users cannot edit generated content. Writing therefore
//! happens under a scoped flip of the `modifiable` flag with guaranteed
//! restore on every exit path, including failure of the write itself.

use crate::error::Result;
use crate::host::{option_bool, BufferId, Host};
use serde_json::{json, Value};

/// Buffer-local variable holding the snapshot taken by [`concrete`].
pub const CONCRETE_VAR: &str = "gitbuf_concrete_content";

/// Scoped flip of a buffer's `modifiable` flag.
///
/// Restores the recorded original value on [`restore`](Self::restore) or,
/// failing that, on drop. Restore is idempotent: the second call is a
/// no-op and never toggles the flag back.
pub struct ModifiableGuard<'a> {
    host: &'a dyn Host,
    bufnr: BufferId,
    was_modifiable: bool,
    restored: bool,
}

impl<'a> ModifiableGuard<'a> {
    /// Restore the original `modifiable` value.
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        self.host
            .set_option(self.bufnr, "modifiable", Value::Bool(self.was_modifiable))
    }
}

impl Drop for ModifiableGuard<'_> {
    fn drop(&mut self) {
        if !self.restored
            && let Err(e) =
                self.host
                    .set_option(self.bufnr, "modifiable", Value::Bool(self.was_modifiable))
        {
            eprintln!(
                "Warning: failed to restore 'modifiable' on buffer {}: {}",
                self.bufnr, e
            );
        }
    }
}

/// Flip a buffer modifiable and return the guard that restores it.
pub fn make_modifiable(host: &dyn Host, bufnr: BufferId) -> Result<ModifiableGuard<'_>> {
    let was_modifiable = option_bool(host, bufnr, "modifiable")?;
    if !was_modifiable {
        host.set_option(bufnr, "modifiable", Value::Bool(true))?;
    }
    Ok(ModifiableGuard {
        host,
        bufnr,
        was_modifiable,
        restored: false,
    })
}

/// Replace the entire content of a buffer.
///
/// The `modifiable` flag is restored even when the write fails; the write
/// error (if any) takes precedence in the returned result.
pub fn replace(host: &dyn Host, bufnr: BufferId, lines: &[String]) -> Result<()> {
    let mut guard = make_modifiable(host, bufnr)?;
    let written = host.set_lines(bufnr, lines);
    let restored = guard.restore();
    written?;
    restored
}

/// Mark the in-memory content of a non-file-backed buffer as persisted.
///
/// Snapshots the current lines into a buffer-local variable and clears the
/// `modified` flag, so a host-side reload does not discard the content.
pub fn concrete(host: &dyn Host, bufnr: BufferId) -> Result<()> {
    let lines = host.get_lines(bufnr)?;
    host.set_var(bufnr, CONCRETE_VAR, json!(lines))?;
    host.set_option(bufnr, "modified", Value::Bool(false))
}
