/*
Builtins run inside the interpreter's own process, which is the only way a command can change
the interpreter's working directory or end the loop. They never spawn or wait on anything.
 */

use std::io::{self, Write};
use std::str::FromStr;

use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use super::{Context, LoopStatus};
use crate::errors::describe;

/// The closed set of commands handled in-process
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
pub enum Builtin {
    #[strum(to_string = "cd", serialize = "change-directory")]
    ChangeDirectory,
    #[strum(to_string = "help")]
    Help,
    #[strum(to_string = "exit")]
    Exit,
}

impl Builtin {
    /// The name shown by `help`
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Runs the builtin with every token after the command name
    pub fn run(self, context: &mut Context, arguments: &[&str]) -> io::Result<LoopStatus> {
        match self {
            Builtin::ChangeDirectory => change_directory(context, arguments),
            Builtin::Help => help(context),
            Builtin::Exit => Ok(LoopStatus::Stop),
        }
    }
}

/// Immutable lookup table consulted before falling back to external programs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinTable {
    builtins: Vec<Builtin>,
}

impl Default for BuiltinTable {
    /// Every builtin, in the order `help` lists them
    fn default() -> Self {
        Self::new(Builtin::iter())
    }
}

impl BuiltinTable {
    pub fn new(builtins: impl IntoIterator<Item = Builtin>) -> Self {
        Self {
            builtins: builtins.into_iter().collect(),
        }
    }

    /// Attempts to locate a builtin by name or alias
    pub fn lookup(&self, command_name: &str) -> Option<Builtin> {
        Builtin::from_str(command_name)
            .ok()
            .filter(|builtin| self.builtins.contains(builtin))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.builtins.iter().map(|builtin| builtin.name())
    }
}

fn change_directory(context: &mut Context, arguments: &[&str]) -> io::Result<LoopStatus> {
    let Some(path) = arguments.first() else {
        context.report("expected argument to \"cd\"")?;
        return Ok(LoopStatus::Continue);
    };

    if let Err(e) = std::env::set_current_dir(path) {
        context.report(describe(&e))?;
    }

    Ok(LoopStatus::Continue)
}

fn help(context: &mut Context) -> io::Result<LoopStatus> {
    let out = &mut *context.out;
    writeln!(out, "{} - a minimal command interpreter", context.program_name)?;
    writeln!(out, "Type program names and arguments, and hit enter.")?;
    writeln!(out, "The following are built in:")?;

    for name in context.builtins.names() {
        writeln!(out, "  {name}")?;
    }

    writeln!(out, "Use the man command for information on other programs.")?;
    Ok(LoopStatus::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Output {
        out: Vec<u8>,
        err: Vec<u8>,
    }

    fn run(table: &BuiltinTable, name: &str, arguments: &[&str]) -> (LoopStatus, Output) {
        let mut out = Vec::<u8>::new();
        let mut err = Vec::<u8>::new();
        let builtin = table.lookup(name).expect("builtin should resolve");
        let mut context = Context::new("csh", table, &mut out, &mut err);
        let status = builtin.run(&mut context, arguments).unwrap();

        (status, Output { out, err })
    }

    #[test]
    fn lookup_finds_every_builtin() {
        let table = BuiltinTable::default();

        assert_eq!(table.lookup("cd"), Some(Builtin::ChangeDirectory));
        assert_eq!(table.lookup("change-directory"), Some(Builtin::ChangeDirectory));
        assert_eq!(table.lookup("help"), Some(Builtin::Help));
        assert_eq!(table.lookup("exit"), Some(Builtin::Exit));
    }

    #[test]
    fn lookup_rejects_unknown_names() {
        let table = BuiltinTable::default();

        for name in ["xyz123", "", "CD", "Exit", "ls", "cd ", "help!"] {
            assert_eq!(table.lookup(name), None, "{name:?}");
        }
    }

    #[test]
    fn lookup_respects_reduced_tables() {
        let table = BuiltinTable::new([Builtin::Exit]);

        assert_eq!(table.lookup("exit"), Some(Builtin::Exit));
        assert_eq!(table.lookup("cd"), None);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["exit"]);
    }

    #[test]
    fn names_are_listed_in_table_order() {
        let names: Vec<_> = BuiltinTable::default().names().collect();
        assert_eq!(names, vec!["cd", "help", "exit"]);
    }

    #[test]
    fn test_command_cd_without_argument() {
        let (status, output) = run(&BuiltinTable::default(), "cd", &[]);

        assert_eq!(status, LoopStatus::Continue);
        assert_eq!(
            String::from_utf8(output.err).unwrap(),
            "csh: expected argument to \"cd\"\n"
        );
        assert!(output.out.is_empty());
    }

    #[test]
    fn test_command_cd_to_missing_directory() {
        let before = std::env::current_dir().unwrap();
        let (status, output) = run(
            &BuiltinTable::default(),
            "cd",
            &["/nonexistent-path-xyz"],
        );

        assert_eq!(status, LoopStatus::Continue);
        let err = String::from_utf8(output.err).unwrap();
        assert!(err.starts_with("csh: "), "{err}");
        assert!(!err.contains("os error"), "{err}");
        #[cfg(unix)]
        assert_eq!(err, "csh: No such file or directory\n");
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_command_help() {
        let (status, output) = run(&BuiltinTable::default(), "help", &["ignored", "too"]);

        assert_eq!(status, LoopStatus::Continue);
        assert_eq!(
            String::from_utf8(output.out).unwrap(),
            "csh - a minimal command interpreter\n\
             Type program names and arguments, and hit enter.\n\
             The following are built in:\n  \
             cd\n  \
             help\n  \
             exit\n\
             Use the man command for information on other programs.\n"
        );
        assert!(output.err.is_empty());
    }

    #[test]
    fn test_command_exit_ignores_arguments() {
        let (status, output) = run(&BuiltinTable::default(), "exit", &["anything"]);

        assert_eq!(status, LoopStatus::Stop);
        assert!(output.out.is_empty());
        assert!(output.err.is_empty());
    }
}
