//! External prebuild tool invocation.
//!
//! The prebuild tool compiles and links the native addon for one target and
//! leaves its output under `build/Release/`. It is run as
//! `<tool> -t <abi> -r <runtime>` with the parent's standard streams so build
//! logs stream live. Its exit status is reported, never escalated: the
//! archive step decides whether usable output was produced.

use crate::error::{PrebuildError, Result};
use crate::target::BuildTarget;
use camino::Utf8PathBuf;
use log::{debug, warn};
use std::fmt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Default prebuild tool program name.
pub const DEFAULT_TOOL: &str = "prebuild";

/// Default upper bound on a single target build (30 minutes).
pub const DEFAULT_BUILD_TIMEOUT: Duration = Duration::from_secs(1800);

/// How a build tool run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// The tool exited with this code.
    Exited(i32),
    /// The tool was terminated by a signal.
    Terminated,
    /// The tool exceeded its time limit and was killed.
    TimedOut,
}

impl BuildStatus {
    /// Whether the tool exited with code zero.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

impl From<ExitStatus> for BuildStatus {
    fn from(status: ExitStatus) -> Self {
        status.code().map_or(Self::Terminated, Self::Exited)
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit code {code}"),
            Self::Terminated => f.write_str("terminated by signal"),
            Self::TimedOut => f.write_str("timed out"),
        }
    }
}

/// Result of running the build tool for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOutcome {
    /// The target that was built.
    pub target: BuildTarget,
    /// How the tool run ended.
    pub status: BuildStatus,
    /// Whether the tool wrote directly to this process's stdout and stderr.
    pub stdio_inherited: bool,
}

/// Runs the external build for a single target.
#[cfg_attr(test, mockall::automock)]
pub trait BuildInvoker {
    /// Build the addon for `target` and report how the tool exited.
    ///
    /// # Errors
    ///
    /// Returns [`PrebuildError::Spawn`] if the tool cannot be started. A
    /// tool that starts and then fails is reported through
    /// [`BuildOutcome::status`], not as an error.
    fn invoke(&self, target: &BuildTarget) -> Result<BuildOutcome>;
}

/// Return the arguments that select `target` on the prebuild tool.
///
/// # Examples
///
/// ```
/// use noble_prebuild::invoker::prebuild_args;
/// use noble_prebuild::target::{Abi, BuildTarget, Runtime};
///
/// let target = BuildTarget::new(Runtime::Electron, Abi::new(98).expect("valid"));
/// assert_eq!(prebuild_args(&target), ["-t", "98", "-r", "electron"]);
/// ```
#[must_use]
pub fn prebuild_args(target: &BuildTarget) -> Vec<String> {
    vec![
        "-t".to_owned(),
        target.abi.to_string(),
        "-r".to_owned(),
        target.runtime.as_str().to_owned(),
    ]
}

/// Invokes the prebuild tool as a child process.
#[derive(Debug, Clone)]
pub struct PrebuildInvoker {
    program: String,
    extra_args: Vec<String>,
    working_dir: Option<Utf8PathBuf>,
    timeout: Duration,
}

impl PrebuildInvoker {
    /// Create an invoker for `program` with the default timeout.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
            working_dir: None,
            timeout: DEFAULT_BUILD_TIMEOUT,
        }
    }

    /// Pass `args` to the tool ahead of the target selection arguments.
    #[must_use]
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Run the tool from `dir` instead of the current directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: Utf8PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    /// Kill the tool if a single build runs longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Return the full argument vector used for `target`.
    #[must_use]
    pub fn args_for(&self, target: &BuildTarget) -> Vec<String> {
        self.extra_args
            .iter()
            .cloned()
            .chain(prebuild_args(target))
            .collect()
    }

    /// Return the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, target: &BuildTarget) -> Command {
        let mut cmd = Command::new(resolve_program(&self.program));
        cmd.args(self.args_for(target))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir.as_std_path());
        }
        isolate_process_group(&mut cmd);
        cmd
    }
}

/// Resolve `program` through `PATH` and `PATHEXT`.
///
/// npm installs tools as `.cmd` shims on Windows, which the standard
/// library's lookup (`.exe` only) does not find. Unresolvable names are
/// returned unchanged so spawning reports the failure.
#[cfg(windows)]
fn resolve_program(program: &str) -> std::ffi::OsString {
    let cwd = std::env::current_dir().unwrap_or_default();
    resolve_program_in(program, std::env::var_os("PATH"), &cwd)
}

#[cfg(windows)]
fn resolve_program_in(
    program: &str,
    search_path: Option<std::ffi::OsString>,
    cwd: &std::path::Path,
) -> std::ffi::OsString {
    which::which_in(program, search_path, cwd)
        .map_or_else(|_| std::ffi::OsString::from(program), std::path::PathBuf::into_os_string)
}

#[cfg(not(windows))]
fn resolve_program(program: &str) -> &str {
    program
}

/// Start the tool as the leader of a new process group so a timeout can
/// stop everything it spawned.
#[cfg(unix)]
fn isolate_process_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;

    cmd.process_group(0);
}

#[cfg(not(unix))]
fn isolate_process_group(_cmd: &mut Command) {}

/// Kill the tool together with every process it started.
#[cfg(unix)]
fn kill_process_tree(child: &mut Child) {
    match libc::pid_t::try_from(child.id()) {
        Ok(pgid) => {
            // SAFETY: `kill` has no memory-safety preconditions. The child
            // has not been reaped yet, so its id still names its group.
            let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
            if rc != 0 {
                let err = std::io::Error::last_os_error();
                debug!("killing process group {pgid} failed: {err}");
                kill_direct_child(child);
            }
        }
        Err(_) => kill_direct_child(child),
    }
}

/// Kill the tool together with every process it started.
#[cfg(windows)]
fn kill_process_tree(child: &mut Child) {
    let pid = child.id().to_string();
    let stopped = Command::new("taskkill")
        .args(["/T", "/F", "/PID", pid.as_str()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success());
    if !stopped {
        kill_direct_child(child);
    }
}

#[cfg(not(any(unix, windows)))]
fn kill_process_tree(child: &mut Child) {
    kill_direct_child(child);
}

fn kill_direct_child(child: &mut Child) {
    // The child may already have exited; reaping it afterwards is what
    // matters.
    if let Err(err) = child.kill() {
        debug!("kill failed: {err}");
    }
}

impl Default for PrebuildInvoker {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL)
    }
}

impl BuildInvoker for PrebuildInvoker {
    fn invoke(&self, target: &BuildTarget) -> Result<BuildOutcome> {
        debug!(
            "running {} {}",
            self.program,
            self.args_for(target).join(" ")
        );
        let mut child = self
            .command(target)
            .spawn()
            .map_err(|source| PrebuildError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => BuildStatus::from(status),
            None => {
                warn!(
                    "{} for {target} exceeded {}s; killing it",
                    self.program,
                    self.timeout.as_secs()
                );
                kill_process_tree(&mut child);
                child.wait()?;
                BuildStatus::TimedOut
            }
        };

        Ok(BuildOutcome {
            target: *target,
            status,
            stdio_inherited: true,
        })
    }
}
