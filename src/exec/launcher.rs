use std::process::{Command as Process, ExitStatus};

use tracing::debug;

use crate::errors::LaunchError;

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
}

/// The result of running one external program
#[derive(Debug)]
pub enum ChildOutcome {
    /// The program ran (or its image could not be loaded in the child) and the child is gone
    Terminated(Termination),
    /// No child ever ran, or it could not be waited on
    FailedToLaunch(LaunchError),
}

/// Creates a child process for `argv`, blocking until it terminates.
/// `argv[0]` is both the program looked up in `PATH` and the child's own `argv[0]`.
pub trait Launcher {
    fn launch(&self, argv: &[&str]) -> ChildOutcome;
}

impl<L: Launcher + ?Sized> Launcher for &L {
    fn launch(&self, argv: &[&str]) -> ChildOutcome {
        (**self).launch(argv)
    }
}

/// The launcher used by the interpreter on this platform
#[cfg(unix)]
pub fn platform_launcher(program_name: &str) -> Box<dyn Launcher> {
    Box::new(ForkExecLauncher::new(program_name))
}

#[cfg(not(unix))]
pub fn platform_launcher(_program_name: &str) -> Box<dyn Launcher> {
    Box::new(SpawnLauncher)
}

/// Portable launcher built on `std::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct SpawnLauncher;

impl Launcher for SpawnLauncher {
    fn launch(&self, argv: &[&str]) -> ChildOutcome {
        let Some((program, arguments)) = argv.split_first() else {
            return ChildOutcome::FailedToLaunch(LaunchError::EmptyCommand);
        };

        // * stdin, stdout and stderr are inherited by default for `spawn`
        let mut process = match Process::new(program).args(arguments).spawn() {
            Ok(process) => process,
            Err(e) => return ChildOutcome::FailedToLaunch(LaunchError::Spawn(e)),
        };

        debug!(pid = process.id(), ?argv, "spawned child");
        match process.wait() {
            Ok(status) => ChildOutcome::Terminated(termination(status)),
            Err(e) => ChildOutcome::FailedToLaunch(LaunchError::Wait(e)),
        }
    }
}

#[cfg(unix)]
fn termination(status: ExitStatus) -> Termination {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => Termination::Exited(code),
        (None, Some(signal)) => Termination::Signaled(signal),
        (None, None) => Termination::Exited(-1),
    }
}

#[cfg(not(unix))]
fn termination(status: ExitStatus) -> Termination {
    Termination::Exited(status.code().unwrap_or(-1))
}

#[cfg(unix)]
pub use fork_exec::ForkExecLauncher;

#[cfg(unix)]
mod fork_exec {
    use std::ffi::CString;

    use nix::errno::Errno;
    use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
    use nix::unistd::{execvp, fork, ForkResult, Pid};
    use tracing::debug;

    use super::{ChildOutcome, Launcher, Termination};
    use crate::errors::LaunchError;

    /// Status a child exits with when the program image cannot be loaded
    pub const EXEC_FAILURE_STATUS: i32 = 127;

    /// Classic `fork` + `execvp` + `waitpid` launcher.
    /// If `execvp` fails, the child reports the reason on its own stderr and exits with
    /// `EXEC_FAILURE_STATUS`; the parent only ever sees a terminated child.
    #[derive(Debug, Clone)]
    pub struct ForkExecLauncher {
        // Pre-rendered so the child does not allocate between fork and exit
        diagnostic_prefix: Vec<u8>,
    }

    impl ForkExecLauncher {
        pub fn new(program_name: &str) -> Self {
            Self {
                diagnostic_prefix: format!("{program_name}: ").into_bytes(),
            }
        }
    }

    impl Launcher for ForkExecLauncher {
        fn launch(&self, argv: &[&str]) -> ChildOutcome {
            let arguments = match c_arguments(argv) {
                Ok(arguments) => arguments,
                Err(e) => return ChildOutcome::FailedToLaunch(e),
            };

            // SAFETY: the interpreter is single threaded, and the child only calls
            // `execvp`, `write` and `_exit` before it is replaced or gone
            match unsafe { fork() } {
                Ok(ForkResult::Child) => self.exec_child(&arguments),
                Ok(ForkResult::Parent { child }) => {
                    debug!(pid = child.as_raw(), ?argv, "forked child");
                    wait_for(child)
                }
                Err(errno) => ChildOutcome::FailedToLaunch(LaunchError::Fork(errno.into())),
            }
        }
    }

    impl ForkExecLauncher {
        fn exec_child(&self, arguments: &[CString]) -> ! {
            let errno = match execvp(&arguments[0], arguments) {
                Err(errno) => errno,
                Ok(never) => match never {},
            };

            let stderr = std::io::stderr();
            let _ = nix::unistd::write(&stderr, &self.diagnostic_prefix);
            let _ = nix::unistd::write(&stderr, errno.desc().as_bytes());
            let _ = nix::unistd::write(&stderr, b"\n");

            // * `_exit` skips atexit handlers and stdio flushing, which belong to the parent
            unsafe { nix::libc::_exit(EXEC_FAILURE_STATUS) }
        }
    }

    fn c_arguments(argv: &[&str]) -> Result<Vec<CString>, LaunchError> {
        if argv.is_empty() {
            return Err(LaunchError::EmptyCommand);
        }

        argv.iter()
            .map(|argument| {
                CString::new(*argument)
                    .map_err(|_| LaunchError::InvalidArgument(argument.to_string()))
            })
            .collect()
    }

    /// Blocks until `child` has exited or been killed. Stops and interrupted waits are waited through.
    fn wait_for(child: Pid) -> ChildOutcome {
        loop {
            match waitpid(child, Some(WaitPidFlag::WUNTRACED)) {
                Ok(WaitStatus::Exited(_, code)) => {
                    return ChildOutcome::Terminated(Termination::Exited(code))
                }
                Ok(WaitStatus::Signaled(_, signal, _)) => {
                    return ChildOutcome::Terminated(Termination::Signaled(signal as i32))
                }
                Ok(status) => debug!(?status, "child changed state without terminating"),
                Err(Errno::EINTR) => continue,
                Err(errno) => return ChildOutcome::FailedToLaunch(LaunchError::Wait(errno.into())),
            }
        }
    }

}
