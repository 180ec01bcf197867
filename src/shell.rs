use std::io::Write;

use tracing::debug;

use crate::errors::Result;
use crate::eval::{Dispatcher, LineSource, ReadOutcome};
use crate::exec::{BuiltinTable, Launcher, LoopStatus};
use crate::state::Configuration;

/// The read, tokenize, dispatch, execute loop
pub struct Shell<'a> {
    dispatcher: Dispatcher<'a>,
    prompt: String,
}

impl<'a> Shell<'a> {
    pub fn new(
        config: &Configuration,
        builtins: &'a BuiltinTable,
        launcher: Box<dyn Launcher + 'a>,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(builtins, launcher, &config.program_name),
            prompt: config.prompt.clone(),
        }
    }

    /// Runs until `exit` or end of input. Only fatal errors escape.
    pub fn run<S: LineSource + ?Sized>(
        &self,
        source: &mut S,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<()> {
        loop {
            let line = match source.prompt_and_read_line(&self.prompt)? {
                ReadOutcome::Line(line) => line,
                ReadOutcome::EndOfInput => {
                    debug!("end of input");
                    return Ok(());
                }
            };

            debug!(?line, "read line");
            if self.dispatcher.eval(&line, out, err)? == LoopStatus::Stop {
                debug!("exit requested");
                return Ok(());
            }
        }
    }
}
