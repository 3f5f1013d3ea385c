mod error;
mod extractor;
mod language;
mod source;

pub use error::{ExtractError, Result};
pub use extractor::{extract_from_file, extract_from_source, ExtractConfig, ExtractedGraphQL};
pub use language::Language;
pub use source::{LocationOffset, Position, Range, Source};
