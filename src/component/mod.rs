//! Statusline components exposed over the dispatcher.

pub mod worktree;
