//! gitbuf: host-independent core for exposing git operations as editor buffers.
//!
//! An editor runtime dispatches RPC calls into this crate and receives
//! buffer mutations back through the [`host::Host`] trait. The pipeline for
//! a feature command is: resolve a worktree from candidate directories,
//! run git there with captured output (optionally piped through a
//! post-processor), parse the output into typed rows, render display
//! lines, and synchronize them into a host-owned buffer while preserving
//! its `modifiable` state.

pub mod args;
pub mod branch;
pub mod buffer;
pub mod bufname;
pub mod component;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod process;
pub mod text;
pub mod worktree;

#[cfg(test)]
pub(crate) mod test_support;
