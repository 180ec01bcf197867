pub mod dispatcher;
pub mod readline;
pub mod tokenizer;

pub use dispatcher::Dispatcher;
pub use readline::{LineEditor, LineSource, ReadOutcome, StreamReader};
pub use tokenizer::{tokenize, TokenList};
