//! Output formatting for CLI.

mod json;
mod text;

pub use json::{JsonFormatter, ServiceOutput, TokenListOutput};
pub use text::TextFormatter;
