//! Worktree statusline component.
//!
//! Exposes the resolved worktree root over the dispatcher, for statusline
//! and tabline integrations. Resolution is performed per call against the
//! current editor state; there is deliberately no cross-call cache, since
//! a stale root would survive a workspace change with no way to invalidate
//! it. Callers that batch several component queries should memoize the
//! `full` result themselves for the duration of the batch.

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::host::Host;
use crate::worktree::{find_worktree_from_suspects, list_worktree_suspects};
use serde_json::Value;
use std::path::PathBuf;

fn resolve(host: &dyn Host) -> Result<PathBuf> {
    let verbose = host.verbosity()? > 0;
    find_worktree_from_suspects(host, &list_worktree_suspects(host)?, verbose)
}

/// Register `component:worktree:full` and `component:worktree:name`.
pub fn register(dispatcher: &mut Dispatcher) {
    dispatcher.register("component:worktree:full", |host, _args| {
        let root = resolve(host)?;
        Ok(Value::String(root.display().to_string()))
    });
    dispatcher.register("component:worktree:name", |host, _args| {
        let root = resolve(host)?;
        let name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Value::String(name))
    });
}
