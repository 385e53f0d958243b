//! 数学（专业级）

use super::{classify_topic, default, flag, has_formulas, CheckerHooks, ParserHooks, SubjectProfile};
use crate::models::{Metadata, Task};
use regex::Regex;
use std::sync::LazyLock;

pub static PROFILE: SubjectProfile = SubjectProfile {
    parser: ParserHooks { post_process },
    checker: CheckerHooks {
        format_free_text: default::format_numeric,
        validate_free_text,
    },
};

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+([.,]\d+)?$").expect("decimal regex"));
static FRACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+/\d+$").expect("fraction regex"));
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("digits regex"));

const TOPICS: &[(&[&str], &str)] = &[
    (&["алгебра", "уравнение"], "algebra"),
    (&["геометрия", "треугольник", "окружность"], "geometry"),
    (&["производная", "интеграл"], "calculus"),
    (&["функция"], "functions"),
    (&["вероятность", "статистика"], "probability"),
];

fn post_process(task: &Task) -> Metadata {
    let mut metadata = Metadata::new();

    if !task.topic_codes.is_empty() {
        flag(&mut metadata, "math_topic", classify_topic(&task.topic_codes, TOPICS));
    }

    if has_formulas(task) {
        flag(&mut metadata, "has_formulas", true);
    }

    if !task.image_references.is_empty() {
        flag(&mut metadata, "has_visual", true);
        flag(&mut metadata, "image_count", task.image_references.len());
    }

    metadata
}

fn validate_free_text(raw: &str) -> bool {
    let answer = raw.trim();
    DECIMAL_RE.is_match(answer) || FRACTION_RE.is_match(answer) || DIGITS_RE.is_match(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerBlock, ExtractedFields, Subject};
    use serde_json::Value;

    fn task(topics: &[&str], images: &[&str]) -> Task {
        Task::new(
            ExtractedFields {
                identifier: "GUID".to_string(),
                display_id: "GUID".to_string(),
                question_text: String::new(),
                question_markup: "<td>$$x^2$$</td>".to_string(),
                image_references: images.iter().map(|s| s.to_string()).collect(),
                topic_codes: topics.iter().map(|s| s.to_string()).collect(),
            },
            Subject::MathProf,
            AnswerBlock::FreeText { unit_hint: None },
        )
    }

    #[test]
    fn classifies_first_topic() {
        let metadata = post_process(&task(&["2.2 Алгебраические выражения", "4.1 Функция"], &[]));
        assert_eq!(metadata["math_topic"], Value::from("algebra"));
        assert_eq!(metadata["has_formulas"], Value::from(true));
        assert!(!metadata.contains_key("has_visual"));

        let metadata = post_process(&task(&["5.1 Треугольник"], &["docs/fig.png"]));
        assert_eq!(metadata["math_topic"], Value::from("geometry"));
        assert_eq!(metadata["has_visual"], Value::from(true));
        assert_eq!(metadata["image_count"], Value::from(1));

        let metadata = post_process(&task(&["7.7 Комбинаторика"], &[]));
        assert_eq!(metadata["math_topic"], Value::from("other"));
    }

    #[test]
    fn accepts_numbers_and_fractions() {
        assert!(validate_free_text("3,5"));
        assert!(validate_free_text("-0.25"));
        assert!(validate_free_text("-3/4"));
        assert!(validate_free_text("12345"));
        assert!(!validate_free_text("1e5"));
        assert!(!validate_free_text("x=2"));
        assert!(!validate_free_text(""));
    }
}
