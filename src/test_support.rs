use crate::error::{GitbufError, Result};
use crate::host::{BufferId, Host};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub(crate) fn create_test_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();

    git(path, &["init"]);
    // Ensure the repo uses a deterministic default branch name across environments.
    // This sets HEAD to an unborn `main` branch before the first commit.
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    // Configure git user for commits
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);

    std::fs::write(path.join("README.md"), "# Test\n").unwrap();
    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);

    temp_dir
}

pub(crate) fn git(repo_dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }
}

/// In-memory [`Host`] for tests.
///
/// Buffers live in a `RefCell`; the crate is single-threaded per host, so
/// interior mutability is enough. Buffer 1 exists from the start, unnamed
/// and focused, like a fresh editor instance.
pub(crate) struct TestHost {
    env: HashMap<String, String>,
    verbosity: u64,
    cwd: PathBuf,
    state: RefCell<HostState>,
}

struct HostState {
    buffers: HashMap<BufferId, TestBuffer>,
    current: BufferId,
    next_id: BufferId,
    echoes: Vec<String>,
}

#[derive(Default)]
struct TestBuffer {
    name: String,
    path: Option<PathBuf>,
    lines: Vec<String>,
    options: HashMap<String, Value>,
    vars: HashMap<String, Value>,
}

impl TestHost {
    pub(crate) fn new(cwd: PathBuf) -> Self {
        let mut buffers = HashMap::new();
        buffers.insert(
            1,
            TestBuffer {
                lines: vec![String::new()],
                ..TestBuffer::default()
            },
        );
        Self {
            env: HashMap::new(),
            verbosity: 0,
            cwd,
            state: RefCell::new(HostState {
                buffers,
                current: 1,
                next_id: 2,
                echoes: Vec::new(),
            }),
        }
    }

    pub(crate) fn verbose(mut self) -> Self {
        self.verbosity = 1;
        self
    }

    pub(crate) fn set_buffer_path(&self, bufnr: BufferId, path: PathBuf) {
        let mut state = self.state.borrow_mut();
        state.buffers.get_mut(&bufnr).unwrap().path = Some(path);
    }

    pub(crate) fn lines(&self, bufnr: BufferId) -> Vec<String> {
        self.state.borrow().buffers[&bufnr].lines.clone()
    }

    pub(crate) fn option(&self, bufnr: BufferId, name: &str) -> Option<Value> {
        self.state.borrow().buffers[&bufnr].options.get(name).cloned()
    }

    pub(crate) fn echoes(&self) -> Vec<String> {
        self.state.borrow().echoes.clone()
    }

    fn with_buffer<T>(
        &self,
        bufnr: BufferId,
        f: impl FnOnce(&mut TestBuffer) -> T,
    ) -> Result<T> {
        let mut state = self.state.borrow_mut();
        let buffer = state
            .buffers
            .get_mut(&bufnr)
            .ok_or_else(|| GitbufError::Host(format!("no buffer {}", bufnr)))?;
        Ok(f(buffer))
    }
}

impl Host for TestHost {
    fn environ(&self) -> Result<HashMap<String, String>> {
        Ok(self.env.clone())
    }

    fn verbosity(&self) -> Result<u64> {
        Ok(self.verbosity)
    }

    fn cwd(&self) -> Result<PathBuf> {
        Ok(self.cwd.clone())
    }

    fn echo(&self, message: &str) -> Result<()> {
        self.state.borrow_mut().echoes.push(message.to_string());
        Ok(())
    }

    fn expand(&self, expr: &str) -> Result<String> {
        Ok(expr.to_string())
    }

    fn current_buffer(&self) -> Result<BufferId> {
        Ok(self.state.borrow().current)
    }

    fn open_buffer(&self, name: &str) -> Result<BufferId> {
        let mut state = self.state.borrow_mut();
        if let Some((&id, _)) = state.buffers.iter().find(|(_, b)| b.name == name) {
            state.current = id;
            return Ok(id);
        }
        let id = state.next_id;
        state.next_id += 1;
        state.buffers.insert(
            id,
            TestBuffer {
                name: name.to_string(),
                lines: vec![String::new()],
                ..TestBuffer::default()
            },
        );
        state.current = id;
        Ok(id)
    }

    fn buffer_name(&self, bufnr: BufferId) -> Result<String> {
        self.with_buffer(bufnr, |b| b.name.clone())
    }

    fn buffer_path(&self, bufnr: BufferId) -> Result<Option<PathBuf>> {
        self.with_buffer(bufnr, |b| b.path.clone())
    }

    fn get_lines(&self, bufnr: BufferId) -> Result<Vec<String>> {
        self.with_buffer(bufnr, |b| b.lines.clone())
    }

    fn set_lines(&self, bufnr: BufferId, lines: &[String]) -> Result<()> {
        let modifiable = self
            .with_buffer(bufnr, |b| b.options.get("modifiable").cloned())?
            .map(|v| v == Value::Bool(true) || v == Value::Number(1.into()))
            .unwrap_or(true);
        if !modifiable {
            return Err(GitbufError::Host(format!(
                "buffer {} is not modifiable",
                bufnr
            )));
        }
        self.with_buffer(bufnr, |b| b.lines = lines.to_vec())
    }

    fn get_option(&self, bufnr: BufferId, name: &str) -> Result<Value> {
        let stored = self.with_buffer(bufnr, |b| b.options.get(name).cloned())?;
        Ok(stored.unwrap_or(match name {
            // Editor defaults for a fresh buffer.
            "modifiable" | "swapfile" => Value::Bool(true),
            "modified" => Value::Bool(false),
            _ => Value::Null,
        }))
    }

    fn set_option(&self, bufnr: BufferId, name: &str, value: Value) -> Result<()> {
        self.with_buffer(bufnr, |b| {
            b.options.insert(name.to_string(), value);
        })
    }

    fn get_var(&self, bufnr: BufferId, name: &str) -> Result<Option<Value>> {
        self.with_buffer(bufnr, |b| b.vars.get(name).cloned())
    }

    fn set_var(&self, bufnr: BufferId, name: &str, value: Value) -> Result<()> {
        self.with_buffer(bufnr, |b| {
            b.vars.insert(name.to_string(), value);
        })
    }
}
