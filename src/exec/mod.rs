mod builtins;
mod launcher;

use std::fmt::Display;
use std::io::{self, Write};

pub use builtins::{Builtin, BuiltinTable};
#[cfg(unix)]
pub use launcher::ForkExecLauncher;
pub use launcher::{platform_launcher, ChildOutcome, Launcher, SpawnLauncher, Termination};

/// Tells the interpreter loop whether to read another line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    Continue,
    Stop,
}

/// Everything a builtin may touch while it runs: the output streams, the name used to prefix
/// diagnostics, and the table it was resolved from
pub struct Context<'a> {
    pub program_name: &'a str,
    pub builtins: &'a BuiltinTable,
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

impl<'a> Context<'a> {
    pub fn new(
        program_name: &'a str,
        builtins: &'a BuiltinTable,
        out: &'a mut dyn Write,
        err: &'a mut dyn Write,
    ) -> Self {
        Self {
            program_name,
            builtins,
            out,
            err,
        }
    }

    /// Writes a one-line `<program>: <message>` diagnostic
    pub fn report(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.err, "{}: {}", self.program_name, message)
    }
}
