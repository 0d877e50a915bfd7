//! Shared test utilities for the prebuild crate.

use crate::error::Result;
use crate::invoker::{BuildInvoker, BuildOutcome, BuildStatus};
use crate::target::BuildTarget;
use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
#[expect(
    clippy::cast_sign_loss,
    reason = "Windows exit codes are the raw DWORD bit pattern"
)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// A stub [`BuildInvoker`] that records targets and fakes build output.
///
/// Each invocation writes `outputs` (paths relative to `root`) with a small
/// payload naming the target, then reports `status`.
#[derive(Debug)]
pub struct StubInvoker {
    root: PathBuf,
    outputs: Vec<String>,
    status: BuildStatus,
    calls: RefCell<Vec<BuildTarget>>,
}

impl StubInvoker {
    /// Create a stub that writes `outputs` under `root` and reports `status`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, outputs: Vec<String>, status: BuildStatus) -> Self {
        Self {
            root: root.into(),
            outputs,
            status,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Targets this stub was asked to build, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<BuildTarget> {
        self.calls.borrow().clone()
    }
}

impl BuildInvoker for StubInvoker {
    fn invoke(&self, target: &BuildTarget) -> Result<BuildOutcome> {
        self.calls.borrow_mut().push(*target);
        for output in &self.outputs {
            let path = self.root.join(output);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, format!("addon for {target}"))?;
        }
        Ok(BuildOutcome {
            target: *target,
            status: self.status,
            stdio_inherited: true,
        })
    }
}
