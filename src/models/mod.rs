pub mod homework;
pub mod submission;

pub use homework::{select_latest, HomeworkSet};
pub use submission::{escape_header, Submission};
