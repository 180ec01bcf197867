//! `csh`: a minimal interactive command interpreter.
//!
//! Each line read from the operator is split on whitespace and either handled by a builtin
//! (`cd`, `help`, `exit`) or run as an external program, which the interpreter waits on
//! before prompting again.

pub mod errors;
pub mod eval;
pub mod exec;
pub mod shell;
pub mod state;

pub use shell::Shell;
