use std::path::Path;

use crate::errors::{ConfigError, Handle, Result};

/// Settings for the interpreter, all of which can be overridden from a configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Prefix for every diagnostic, as in `csh: expected argument to "cd"`
    pub program_name: String,
    /// Written before every read
    pub prompt: String,
    /// Whether to use the line editor when standard input is a terminal
    pub line_editing: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            program_name: String::from("csh"),
            prompt: String::from("> "),
            line_editing: true,
        }
    }
}

impl Configuration {
    /// Reads a configuration file on top of the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs_err::read_to_string(path).map_err(ConfigError::Io)?;
        Self::parse(&contents, path)
    }

    /// Scans `key: value` lines for settings; `path` is only used in error messages
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        let mut config = Self::default();

        for (index, line) in contents.lines().enumerate() {
            let line_number = index + 1;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }

            let (key, value) = line.split_once(": ").replace_err(|| {
                ConfigError::InvalidLine {
                    path: path.to_path_buf(),
                    line: line_number,
                }
                .into()
            })?;

            let key = key.trim();
            let invalid_value = || -> crate::errors::ShellError {
                ConfigError::InvalidValue {
                    path: path.to_path_buf(),
                    line: line_number,
                    key: key.to_owned(),
                    value: value.to_owned(),
                }
                .into()
            };

            match key {
                "program-name" => {
                    let name = value.trim();
                    if name.is_empty() {
                        return Err(invalid_value());
                    }
                    config.program_name = name.to_owned();
                }
                // * Trailing spaces are easy to lose in an editor, so `\s` also means a space
                "prompt" => config.prompt = value.replace("\\s", " "),
                "line-editing" => {
                    config.line_editing = value.trim().parse::<bool>().replace_err(invalid_value)?;
                }
                _ => {
                    return Err(ConfigError::UnknownKey {
                        path: path.to_path_buf(),
                        line: line_number,
                        key: key.to_owned(),
                    }
                    .into())
                }
            }
        }

        Ok(config)
    }
}
