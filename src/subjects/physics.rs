//! 物理
//!
//! 简答多为带单位的数值，也有 "увеличится" 这类定性答案。

use super::{default, flag, has_formulas, CheckerHooks, ParserHooks, SubjectProfile};
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

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+([.,]\d+)?([eE][+-]?\d+)?$").expect("number regex"));
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[а-яА-Яa-zA-Z]+$").expect("word regex"));

const UNIT_TYPES: &[(&str, &[&str])] = &[
    ("length", &["м", "см", "км", "мм"]),
    ("velocity", &["м/с", "км/ч"]),
    ("acceleration", &["м/с²", "м/с2"]),
    ("force", &["Н", "кН"]),
    ("energy", &["Дж", "кДж", "МДж", "эВ", "кэВ", "МэВ"]),
    ("power", &["Вт", "кВт", "МВт"]),
    ("mass", &["кг", "г", "т"]),
    ("time", &["с", "мс", "мин", "ч"]),
    ("temperature", &["°C", "K", "К"]),
    ("angle", &["°", "рад"]),
];

fn post_process(task: &Task) -> Metadata {
    let mut metadata = Metadata::new();

    if let Some(unit) = task.unit_hint() {
        flag(&mut metadata, "unit_type", classify_unit(unit));
    }

    if has_formulas(task) {
        flag(&mut metadata, "has_formulas", true);
    }

    if !task.image_references.is_empty() {
        flag(&mut metadata, "image_count", task.image_references.len());
        let likely_graph = task.image_references.iter().any(|img| {
            let img = img.to_lowercase();
            img.contains("graph") || img.contains("diagram")
        });
        flag(&mut metadata, "likely_has_graph", likely_graph);
    }

    metadata
}

/// 单位归类，未知单位为 "other"
pub fn classify_unit(unit: &str) -> &'static str {
    UNIT_TYPES
        .iter()
        .find(|(_, units)| units.iter().any(|u| *u == unit))
        .map(|(kind, _)| *kind)
        .unwrap_or("other")
}

fn validate_free_text(raw: &str) -> bool {
    let answer = raw.trim();
    NUMBER_RE.is_match(answer) || WORD_RE.is_match(answer)
}
