//! Thread-local parser pooling.
//!
//! Creating a parser and loading the grammar is not free, so each thread
//! keeps one [`PythonParser`] around and reuses it.

use crate::errors::MarkError;
use crate::python::PythonParser;
use std::cell::RefCell;

thread_local! {
    static PYTHON_PARSER: RefCell<Option<PythonParser>> = const { RefCell::new(None) };
}

/// Execute `f` with this thread's parser, creating it on first use.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use tree_tokens::python::with_parser;
///
/// let kind = with_parser(|parser| {
///     parser.parse("x = 1\n").map(|tree| tree.root_node().kind().to_string())
/// })??;
/// assert_eq!(kind, "module");
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(f: F) -> Result<R, MarkError>
where
    F: FnOnce(&mut PythonParser) -> R,
{
    PYTHON_PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(PythonParser::new()?);
        }
        match slot.as_mut() {
            Some(parser) => Ok(f(parser)),
            None => Err(MarkError::ParserInit),
        }
    })
}
