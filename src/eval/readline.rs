use std::io::{BufRead, ErrorKind, Read, Write};

use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use tracing::{debug, trace};

use crate::errors::{ReadError, Result};

const INITIAL_LINE_CAPACITY: usize = 1024;

/// What a single read produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One line of input, without its trailing newline
    Line(String),
    /// The input stream closed before any character of a new line arrived
    EndOfInput,
}

/// Anything the interpreter loop can pull lines of input from
pub trait LineSource {
    /// Shows the prompt and blocks until a full line (or end of input) is available
    fn prompt_and_read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;
}

/// Reads lines byte by byte from any input stream, printing the prompt to `output`.
/// Used whenever standard input is not a terminal, or when line editing is turned off.
pub struct StreamReader<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StreamReader<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Reads until a newline (excluded) or end of stream
    pub fn read_line(&mut self) -> Result<ReadOutcome> {
        let mut buffer: Vec<u8> = Vec::new();
        buffer.try_reserve_exact(INITIAL_LINE_CAPACITY)?;
        let mut reached_end = false;

        loop {
            let Some(byte) = self.read_byte()? else {
                reached_end = true;
                break;
            };

            if byte == b'\n' {
                break;
            }

            // Double the capacity whenever the buffer is full; never truncate
            if buffer.len() == buffer.capacity() {
                buffer.try_reserve_exact(buffer.capacity())?;
                trace!(capacity = buffer.capacity(), "grew line buffer");
            }

            buffer.push(byte);
        }

        if reached_end && buffer.is_empty() {
            return Ok(ReadOutcome::EndOfInput);
        }

        let line = match String::from_utf8(buffer) {
            Ok(line) => line,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };

        Ok(ReadOutcome::Line(line))
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ReadError::Io(e).into()),
            }
        }
    }
}

impl<R: BufRead, W: Write> LineSource for StreamReader<R, W> {
    fn prompt_and_read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        self.output
            .write_all(prompt.as_bytes())
            .and_then(|_| self.output.flush())
            .map_err(ReadError::Io)?;

        self.read_line()
    }
}

/// Interactive line editing for terminals.
/// Lines are only remembered for the current session; no history file is read or written.
pub struct LineEditor {
    editor: DefaultEditor,
}

impl LineEditor {
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(false)
            .build();

        let editor = DefaultEditor::with_config(config).map_err(ReadError::Editor)?;
        Ok(Self { editor })
    }
}

impl LineSource for LineEditor {
    fn prompt_and_read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        // * Fails for duplicates or a full history, neither of which matters here
                        let _ = self.editor.add_history_entry(line.as_str());
                    }

                    return Ok(ReadOutcome::Line(line));
                }
                // Ctrl-C throws away the current line, like any other shell
                Err(ReadlineError::Interrupted) => {
                    debug!("line discarded by interrupt");
                    continue;
                }
                Err(ReadlineError::Eof) => return Ok(ReadOutcome::EndOfInput),
                Err(e) => return Err(ReadError::Editor(e).into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use super::*;
    use crate::errors::ShellError;

    fn reader(input: &[u8]) -> StreamReader<Cursor<Vec<u8>>, Vec<u8>> {
        StreamReader::new(Cursor::new(input.to_vec()), Vec::new())
    }

    fn line(text: &str) -> ReadOutcome {
        ReadOutcome::Line(text.to_string())
    }

    #[test]
    fn read_lines_without_newlines() {
        let mut reader = reader(b"ls -l\ncd /tmp\n");

        assert_eq!(reader.read_line().unwrap(), line("ls -l"));
        assert_eq!(reader.read_line().unwrap(), line("cd /tmp"));
        assert_eq!(reader.read_line().unwrap(), ReadOutcome::EndOfInput);
    }

    #[test]
    fn empty_line_is_not_end_of_input() {
        let mut reader = reader(b"\n");

        assert_eq!(reader.read_line().unwrap(), line(""));
        assert_eq!(reader.read_line().unwrap(), ReadOutcome::EndOfInput);
    }

    #[test]
    fn empty_stream_is_end_of_input() {
        assert_eq!(reader(b"").read_line().unwrap(), ReadOutcome::EndOfInput);
    }

    #[test]
    fn unterminated_last_line_is_returned() {
        let mut reader = reader(b"exit");

        assert_eq!(reader.read_line().unwrap(), line("exit"));
        assert_eq!(reader.read_line().unwrap(), ReadOutcome::EndOfInput);
    }

    #[test]
    fn lines_around_the_buffer_boundary_survive_intact() {
        for length in [
            INITIAL_LINE_CAPACITY - 1,
            INITIAL_LINE_CAPACITY,
            INITIAL_LINE_CAPACITY + 1,
            INITIAL_LINE_CAPACITY * 5 + 3,
        ] {
            let text: String = (0..length)
                .map(|i| char::from(b'a' + (i % 26) as u8))
                .collect();
            let mut reader = reader(format!("{text}\nnext\n").as_bytes());

            assert_eq!(reader.read_line().unwrap(), line(&text), "length {length}");
            assert_eq!(reader.read_line().unwrap(), line("next"));
        }
    }

    #[test]
    fn carriage_returns_are_kept_for_the_tokenizer() {
        let mut reader = reader(b"help\r\n");
        assert_eq!(reader.read_line().unwrap(), line("help\r"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut reader = reader(b"echo \xff\n");
        assert_eq!(reader.read_line().unwrap(), line("echo \u{fffd}"));
    }

    #[test]
    fn prompt_is_written_before_each_read() {
        let mut reader = reader(b"a\n");

        reader.prompt_and_read_line("> ").unwrap();
        reader.prompt_and_read_line("> ").unwrap();

        assert_eq!(reader.output, b"> > ");
    }

    struct FlakyInput {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for FlakyInput {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let input = io::BufReader::new(FlakyInput {
            interrupted: false,
            inner: Cursor::new(b"pwd\n".to_vec()),
        });
        let mut reader = StreamReader::new(input, Vec::new());

        assert_eq!(reader.read_line().unwrap(), line("pwd"));
    }

    struct BrokenInput;

    impl Read for BrokenInput {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn other_read_failures_are_fatal() {
        let mut reader = StreamReader::new(io::BufReader::new(BrokenInput), Vec::new());

        let error = reader.read_line().unwrap_err();
        assert!(matches!(error, ShellError::Read(ReadError::Io(_))));
        assert_eq!(error.to_string(), "failed to read input: gone");
    }
}
