use std::io::{self, Write};

use tracing::{debug, warn};

use super::tokenizer::tokenize;
use crate::errors::Result;
use crate::exec::{BuiltinTable, ChildOutcome, Context, Launcher, LoopStatus};

/// Resolves command names to builtins, or failing that to external programs, and runs them
pub struct Dispatcher<'a> {
    builtins: &'a BuiltinTable,
    launcher: Box<dyn Launcher + 'a>,
    program_name: String,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        builtins: &'a BuiltinTable,
        launcher: Box<dyn Launcher + 'a>,
        program_name: &str,
    ) -> Self {
        Self {
            builtins,
            launcher,
            program_name: program_name.to_owned(),
        }
    }

    /// Evaluates and executes one line of input.
    /// Only fatal errors are returned; everything else is reported on `err` and the loop goes on.
    pub fn eval(&self, line: &str, out: &mut dyn Write, err: &mut dyn Write) -> Result<LoopStatus> {
        let tokens = tokenize(line)?;
        // An empty command is not an error, just another prompt
        let Some(command_name) = tokens.command() else {
            return Ok(LoopStatus::Continue);
        };

        let mut context = Context::new(&self.program_name, self.builtins, out, err);
        let status = match self.builtins.lookup(command_name) {
            Some(builtin) => {
                debug!(?builtin, "running builtin");
                builtin.run(&mut context, tokens.arguments())
            }
            None => self.launch(&mut context, tokens.as_slice()),
        };

        Ok(status.unwrap_or_else(|e| {
            warn!(error = %e, "could not write command output");
            LoopStatus::Continue
        }))
    }

    /// Runs an external program and waits for it. Programs can never stop the loop.
    fn launch(&self, context: &mut Context, argv: &[&str]) -> io::Result<LoopStatus> {
        // Anything still buffered must reach the terminal before the child starts writing
        context.out.flush()?;

        match self.launcher.launch(argv) {
            ChildOutcome::Terminated(termination) => {
                debug!(?termination, "child terminated");
            }
            ChildOutcome::FailedToLaunch(e) => {
                debug!(error = ?e, "failed to launch");
                context.report(e)?;
            }
        }

        Ok(LoopStatus::Continue)
    }
}
