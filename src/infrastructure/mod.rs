//! 基础设施层：持有外部进程调用，只暴露能力

pub mod typesetter;

pub use typesetter::{PdfLatex, TypesetOutcome, Typesetter};
