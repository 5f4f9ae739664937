pub mod assembler;
pub mod converter;
pub mod language;
pub mod skip_log;
pub mod template;

pub use assembler::{assemble, page_count, Assembled};
pub use converter::{Conversion, PdfConverter, SkipReason};
pub use language::{Language, LanguageTable};
pub use skip_log::SkipLog;
