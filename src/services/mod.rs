pub mod classifier;
pub mod extractor;
pub mod formatter;
pub mod submitter;
pub mod task_parser;

pub use formatter::{format_answer, validate_answer_format};
pub use submitter::{CheckTarget, SubmitOutcome, Submitter};
pub use task_parser::TaskParser;
