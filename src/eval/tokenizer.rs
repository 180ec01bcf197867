use tracing::trace;

use crate::errors::Result;

/// Characters which separate words. There is no quoting, so none of these can appear inside a token.
pub const DELIMITERS: [char; 5] = [' ', '\t', '\r', '\n', '\x07'];

const INITIAL_TOKEN_CAPACITY: usize = 64;

/// The words of a single line, in source order, borrowed from that line.
/// The first token (if any) is the command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenList<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> TokenList<'a> {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The command name, if the line had any words at all
    pub fn command(&self) -> Option<&'a str> {
        self.tokens.first().copied()
    }

    /// Every token after the command name
    pub fn arguments(&self) -> &[&'a str] {
        self.tokens.get(1..).unwrap_or_default()
    }

    /// The full argument vector, command name included
    pub fn as_slice(&self) -> &[&'a str] {
        &self.tokens
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.tokens.iter().copied()
    }
}

/// Splits a line into words on `DELIMITERS`, collapsing runs of delimiters.
pub fn tokenize(line: &str) -> Result<TokenList<'_>> {
    let mut tokens: Vec<&str> = Vec::new();
    tokens.try_reserve_exact(INITIAL_TOKEN_CAPACITY)?;

    for token in line.split(&DELIMITERS[..]).filter(|t| !t.is_empty()) {
        // Grow geometrically and fallibly, so a huge line cannot abort the process mid-push
        if tokens.len() == tokens.capacity() {
            tokens.try_reserve_exact(tokens.capacity())?;
        }

        tokens.push(token);
    }

    trace!(count = tokens.len(), "tokenized line");
    Ok(TokenList { tokens })
}
