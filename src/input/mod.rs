//! Reading and writing Qt Linguist `.ts` documents.
mod language;
mod reader;
mod writer;

pub use language::is_language_code;
pub(crate) use language::normalize_language_code;
pub use reader::{
    is_translation_document,
    load_translation_file,
    parse_document,
};
pub use writer::{
    to_ts_string,
    write_translation_file,
};
