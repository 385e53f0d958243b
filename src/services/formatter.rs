//! 答案格式化 - 业务能力层
//!
//! 把调用方给出的答案转换为判题接口需要的字符串：
//! - 简答：交给科目钩子（数学/物理去空白、逗号转点）
//! - 多选：按选项顺序生成 '0'/'1' 位串，例如 `[0, 2]` → `10100`
//! - 匹配：按字母顺序拼接编号，例如 `{А: 2, Б: 4}` → `24`

use crate::models::{AnswerBlock, AnswerInput, Task};
use crate::subjects;
use std::collections::BTreeMap;

/// 页面上没有识别出选项时多选题的默认位数
pub const DEFAULT_OPTION_COUNT: usize = 5;

/// 匹配题最多支持的字母
const MATCHING_LETTERS: [char; 5] = ['А', 'Б', 'В', 'Г', 'Д'];

/// 生成提交用的答案字符串
///
/// # 参数
/// - `task`: 题目记录（决定作答形式和科目钩子）
/// - `input`: 调用方提供的答案
///
/// # 返回
/// 返回可以直接提交的字符串
pub fn format_answer(task: &Task, input: &AnswerInput) -> String {
    match task.answer() {
        AnswerBlock::FreeText { .. } => {
            let hooks = &subjects::profile(task.subject).checker;
            (hooks.format_free_text)(&input.render())
        }
        AnswerBlock::MultiSelect { options } => {
            let width = if options.is_empty() {
                DEFAULT_OPTION_COUNT
            } else {
                options.len()
            };
            format_multi_select(input, width)
        }
        AnswerBlock::Matching { .. } => format_matching(input),
    }
}

/// 提交前的格式检查，只作提示用
///
/// 非简答题总是返回 true。
pub fn validate_answer_format(task: &Task, input: &AnswerInput) -> bool {
    match task.answer() {
        AnswerBlock::FreeText { .. } => {
            let hooks = &subjects::profile(task.subject).checker;
            (hooks.validate_free_text)(&input.render())
        }
        _ => true,
    }
}

fn format_multi_select(input: &AnswerInput, width: usize) -> String {
    match input {
        AnswerInput::Text(text) => text.clone(),
        AnswerInput::Indices(indices) => indices_to_bits(indices, width),
        AnswerInput::Sequence(items) => {
            let parsed: Option<Vec<usize>> =
                items.iter().map(|item| item.trim().parse().ok()).collect();
            match parsed {
                Some(indices) => indices_to_bits(&indices, width),
                None => input.render(),
            }
        }
        _ => input.render(),
    }
}

fn format_matching(input: &AnswerInput) -> String {
    match input {
        AnswerInput::Text(text) => text.clone(),
        // BTreeMap 按键排序，А < Б < В ... 与字母表顺序一致
        AnswerInput::Mapping(mapping) => mapping.values().map(|v| v.trim()).collect(),
        AnswerInput::Sequence(items) => items.iter().map(|v| v.trim()).collect(),
        AnswerInput::Indices(numbers) => numbers.iter().map(|n| n.to_string()).collect(),
        AnswerInput::Other(_) => input.render(),
    }
}

/// 选中下标 → 位串，超出范围的下标被忽略
pub fn indices_to_bits(indices: &[usize], width: usize) -> String {
    let mut bits = vec!['0'; width];
    for &index in indices {
        if let Some(bit) = bits.get_mut(index) {
            *bit = '1';
        }
    }
    bits.into_iter().collect()
}

/// 位串 → 选中下标
pub fn bits_to_indices(bits: &str) -> Vec<usize> {
    bits.chars()
        .enumerate()
        .filter(|(_, c)| *c == '1')
        .map(|(i, _)| i)
        .collect()
}

/// 把 "24" 这样的匹配答案拆成字母 → 编号
///
/// 只取前 5 个字符，对应 А..Д。
pub fn parse_matching_answer(answer: &str) -> BTreeMap<String, String> {
    MATCHING_LETTERS
        .iter()
        .zip(answer.trim().chars())
        .map(|(letter, digit)| (letter.to_string(), digit.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExtractedFields, MatchingChoice, MatchingPrompt, SelectOption, Subject};

    fn task(subject: Subject, answer: AnswerBlock) -> Task {
        Task::new(
            ExtractedFields {
                identifier: "GUID".to_string(),
                display_id: "GUID".to_string(),
                question_text: "Текст".to_string(),
                question_markup: "<td>Текст</td>".to_string(),
                image_references: vec![],
                topic_codes: vec![],
            },
            subject,
            answer,
        )
    }

    fn multi_select(count: usize) -> Task {
        let options = (0..count)
            .map(|index| SelectOption {
                index,
                label: format!("вариант {}", index + 1),
                field_name: format!("test{index}"),
            })
            .collect();
        task(Subject::Physics, AnswerBlock::MultiSelect { options })
    }

    fn matching() -> Task {
        task(
            Subject::Physics,
            AnswerBlock::Matching {
                prompts: vec![MatchingPrompt {
                    letter: "А".to_string(),
                    label: "Вариант А".to_string(),
                    field_name: "ans0".to_string(),
                }],
                choices: vec![MatchingChoice {
                    number: "1".to_string(),
                    label: "увеличится".to_string(),
                }],
            },
        )
    }

    #[test]
    fn math_free_text_uses_decimal_point() {
        let task = task(Subject::MathProf, AnswerBlock::FreeText { unit_hint: None });
        assert_eq!(format_answer(&task, &AnswerInput::from("3,5")), "3.5");
        assert_eq!(format_answer(&task, &AnswerInput::from(" - 12 ")), "-12");
        assert!(validate_answer_format(&task, &AnswerInput::from("3,5")));
        assert!(!validate_answer_format(&task, &AnswerInput::from("три")));
    }

    #[test]
    fn russian_free_text_keeps_words() {
        let task = task(Subject::Russian, AnswerBlock::FreeText { unit_hint: None });
        assert_eq!(
            format_answer(&task, &AnswerInput::from(" не  было ")),
            "не было"
        );
        assert!(!validate_answer_format(&task, &AnswerInput::from("  ")));
    }

    #[test]
    fn free_text_stringifies_numbers() {
        let task = task(Subject::Physics, AnswerBlock::FreeText { unit_hint: Some("м".to_string()) });
        let input = AnswerInput::Other(serde_json::Value::from(2.5));
        assert_eq!(format_answer(&task, &input), "2.5");
    }

    #[test]
    fn multi_select_bits() {
        let task = multi_select(5);
        assert_eq!(format_answer(&task, &AnswerInput::Indices(vec![0, 2])), "10100");
        assert_eq!(format_answer(&task, &AnswerInput::Indices(vec![0, 1, 2, 3, 4])), "11111");
        assert_eq!(format_answer(&task, &AnswerInput::Indices(vec![])), "00000");
        // 越界下标忽略
        assert_eq!(format_answer(&task, &AnswerInput::Indices(vec![1, 9])), "01000");
        // 已编码好的字符串原样提交
        assert_eq!(format_answer(&task, &AnswerInput::from("00110")), "00110");
        // 数字字符串序列按下标处理
        let seq = AnswerInput::from(vec!["1".to_string(), "3".to_string()]);
        assert_eq!(format_answer(&task, &seq), "01010");
    }

    #[test]
    fn multi_select_width_follows_options() {
        assert_eq!(format_answer(&multi_select(3), &AnswerInput::Indices(vec![2])), "001");
        assert_eq!(format_answer(&multi_select(0), &AnswerInput::Indices(vec![4])), "00001");
        assert!(validate_answer_format(&multi_select(3), &AnswerInput::from("что угодно")));
    }

    #[test]
    fn matching_order_independent() {
        let task = matching();
        let forward = AnswerInput::from([("А", "2"), ("Б", "4")]);
        let backward = AnswerInput::from([("Б", "4"), ("А", "2")]);
        assert_eq!(format_answer(&task, &forward), "24");
        assert_eq!(format_answer(&task, &backward), "24");
        assert_eq!(format_answer(&task, &AnswerInput::from("31")), "31");
        assert_eq!(format_answer(&task, &AnswerInput::Indices(vec![3, 1, 2])), "312");
    }

    #[test]
    fn matching_accepts_integer_values() {
        let task = matching();
        let from_json: AnswerInput = serde_json::from_str(r#"{"Б":4,"А":2}"#).unwrap();
        assert_eq!(format_answer(&task, &from_json), "24");

        #[derive(serde::Deserialize)]
        struct Row {
            answer: AnswerInput,
        }
        let row: Row = toml::from_str(r#"answer = { "А" = 2, "Б" = 4 }"#).unwrap();
        assert_eq!(format_answer(&task, &row.answer), "24");
    }

    #[test]
    fn bit_and_letter_helpers() {
        assert_eq!(indices_to_bits(&[0, 2], 5), "10100");
        assert_eq!(bits_to_indices("10100"), vec![0, 2]);

        let parsed = parse_matching_answer("24");
        assert_eq!(parsed.get("А").map(String::as_str), Some("2"));
        assert_eq!(parsed.get("Б").map(String::as_str), Some("4"));
        assert_eq!(parse_matching_answer("1234567").len(), 5);
    }
}
