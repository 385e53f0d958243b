//! 俄语

use super::{classify_topic, default, flag, CheckerHooks, ParserHooks, SubjectProfile};
use crate::models::{Metadata, Task};
use crate::utils::text::clean_text;

pub static PROFILE: SubjectProfile = SubjectProfile {
    parser: ParserHooks { post_process },
    checker: CheckerHooks {
        format_free_text,
        validate_free_text,
    },
};

/// 题干超过这个长度视为附带阅读原文
const SOURCE_TEXT_MIN_CHARS: usize = 500;

const TOPICS: &[(&[&str], &str)] = &[
    (&["орфография"], "spelling"),
    (&["пунктуация"], "punctuation"),
    (&["синтаксис"], "syntax"),
    (&["морфология"], "morphology"),
    (&["лексика"], "lexicon"),
    (&["стилистика"], "style"),
];

fn post_process(task: &Task) -> Metadata {
    let mut metadata = Metadata::new();

    if !task.topic_codes.is_empty() {
        flag(&mut metadata, "russian_topic", classify_topic(&task.topic_codes, TOPICS));
    }

    if task.question_text.chars().count() > SOURCE_TEXT_MIN_CHARS {
        flag(&mut metadata, "has_source_text", true);
    }

    if let Some(count) = task.option_count().filter(|count| *count > 0) {
        flag(&mut metadata, "variant_count", count);
    }

    metadata
}

/// 合并多余空白，大小写保持不变
fn format_free_text(raw: &str) -> String {
    clean_text(&default::format_free_text(raw))
}

fn validate_free_text(raw: &str) -> bool {
    !raw.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerBlock, ExtractedFields, SelectOption, Subject};
    use serde_json::Value;

    #[test]
    fn tags_topic_source_text_and_variants() {
        let options = (0..5)
            .map(|index| SelectOption {
                index,
                label: format!("вариант {index}"),
                field_name: format!("test{index}"),
            })
            .collect();
        let task = Task::new(
            ExtractedFields {
                identifier: "GUID".to_string(),
                display_id: "GUID".to_string(),
                question_text: "а".repeat(501),
                question_markup: String::new(),
                image_references: vec![],
                topic_codes: vec!["8.3 Пунктуация в сложном предложении".to_string()],
            },
            Subject::Russian,
            AnswerBlock::MultiSelect { options },
        );

        let metadata = post_process(&task);
        assert_eq!(metadata["russian_topic"], Value::from("punctuation"));
        assert_eq!(metadata["has_source_text"], Value::from(true));
        assert_eq!(metadata["variant_count"], Value::from(5));
    }

    #[test]
    fn formatting_collapses_whitespace() {
        assert_eq!(format_free_text("  не  было \n"), "не было");
        assert!(validate_free_text("24"));
        assert!(!validate_free_text("   "));
    }
}
