use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use thiserror::Error;

/// `Result` alias which automatically uses `ShellError` as the error type.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Errors which end the interpreter.
/// Anything recoverable is reported where it happens and never becomes a `ShellError`.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("allocation error")]
    Allocation(#[from] TryReserveError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("failed to read input: {}", describe(.0))]
    Io(#[from] io::Error),
    #[error("line editor failed: {0}")]
    Editor(#[from] ReadlineError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    // * fs-err already puts the path into the message
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{}:{line}: expected `key: value`", .path.display())]
    InvalidLine { path: PathBuf, line: usize },
    #[error("{}:{line}: unknown setting `{key}`", .path.display())]
    UnknownKey {
        path: PathBuf,
        line: usize,
        key: String,
    },
    #[error("{}:{line}: invalid value `{value}` for `{key}`", .path.display())]
    InvalidValue {
        path: PathBuf,
        line: usize,
        key: String,
        value: String,
    },
}

/// Failure to start (or keep track of) an external program.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("empty command")]
    EmptyCommand,
    #[error("argument contains a NUL byte: {0:?}")]
    InvalidArgument(String),
    #[error("{}", describe(.0))]
    Fork(io::Error),
    #[error("{}", describe(.0))]
    Spawn(io::Error),
    #[error("{}", describe(.0))]
    Wait(io::Error),
}

pub trait Handle<T> {
    /// Replaces any error kind with a new one.
    /// Useful in situations where the original error provides no additional clarity.
    fn replace_err<F: FnOnce() -> ShellError>(self, new_error: F) -> Result<T>;
}

impl<T, E> Handle<T> for std::result::Result<T, E> {
    fn replace_err<F: FnOnce() -> ShellError>(self, new_error: F) -> Result<T> {
        self.map_err(|_| new_error())
    }
}

impl<T> Handle<T> for Option<T> {
    fn replace_err<F: FnOnce() -> ShellError>(self, new_error: F) -> Result<T> {
        self.ok_or_else(new_error)
    }
}

/// Renders an I/O error the way `perror` would: the OS description without the
/// `(os error N)` suffix that `std::io::Error` appends.
pub fn describe(error: &io::Error) -> String {
    #[cfg(unix)]
    {
        if let Some(code) = error.raw_os_error() {
            return nix::errno::Errno::from_raw(code).desc().to_owned();
        }
    }

    error.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn describe_strips_os_error_code() {
        let error = io::Error::from_raw_os_error(nix::libc::ENOENT);
        assert_eq!(describe(&error), "No such file or directory");
    }

    #[test]
    fn describe_keeps_custom_messages() {
        let error = io::Error::new(io::ErrorKind::Other, "broken pipe dream");
        assert_eq!(describe(&error), "broken pipe dream");
    }

    #[test]
    fn replace_err_on_none() {
        let value: Option<u8> = None;
        let error = value
            .replace_err(|| {
                ConfigError::InvalidLine {
                    path: PathBuf::from("a.conf"),
                    line: 3,
                }
                .into()
            })
            .unwrap_err();

        assert_eq!(error.to_string(), "a.conf:3: expected `key: value`");
    }
}
