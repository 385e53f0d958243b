pub mod answer;
pub mod loaders;
pub mod result;
pub mod subject;
pub mod task;

pub use answer::AnswerInput;
pub use loaders::{load_answer_sheet, AnswerEntry, AnswerSheet};
pub use result::{CheckResponse, CheckResult};
pub use subject::Subject;
pub use task::{
    AnswerBlock, AnswerShape, ExtractedFields, MatchingChoice, MatchingPrompt, Metadata,
    SelectOption, Task,
};
