//! Source text for a translation.

mod reader;

pub use reader::{InputReader, InputSource, MAX_INPUT_SIZE};
