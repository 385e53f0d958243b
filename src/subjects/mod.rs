//! 科目差异
//!
//! 每个科目对应一组解析钩子和一组判题钩子，构造解析器/判题器时查表一次。
//!
//! | 科目        | 后处理                         | 简答格式化              | 简答校验                 |
//! |-------------|--------------------------------|-------------------------|--------------------------|
//! | `physics`   | 单位类型、公式、图表           | 逗号转点、去空白        | 数字 / 科学计数 / 单词   |
//! | `math_prof` | 题目主题、公式、图形           | 逗号转点、去空白        | 数字 / 分数              |
//! | `russian`   | 题目主题、长原文、选项数       | 合并空白                | 非空                     |

pub mod default;
pub mod math_prof;
pub mod physics;
pub mod russian;

use crate::models::{Metadata, Subject, Task};
use serde_json::Value;

/// 解析阶段的钩子
#[derive(Debug, Clone, Copy)]
pub struct ParserHooks {
    /// 根据已解析的题目生成额外标签，只允许补充 metadata
    pub post_process: fn(&Task) -> Metadata,
}

/// 判题阶段的钩子，只覆盖简答题
#[derive(Debug, Clone, Copy)]
pub struct CheckerHooks {
    pub format_free_text: fn(&str) -> String,
    pub validate_free_text: fn(&str) -> bool,
}

/// 一个科目的全部差异
#[derive(Debug, Clone, Copy)]
pub struct SubjectProfile {
    pub parser: ParserHooks,
    pub checker: CheckerHooks,
}

/// 查找科目的钩子
pub fn profile(subject: Subject) -> &'static SubjectProfile {
    match subject {
        Subject::Physics => &physics::PROFILE,
        Subject::MathProf => &math_prof::PROFILE,
        Subject::Russian => &russian::PROFILE,
    }
}

/// 题干中是否含公式（MathML 或 `$$` 包裹的 TeX）
pub(crate) fn has_formulas(task: &Task) -> bool {
    task.question_markup.contains("m:math") || task.question_markup.contains("$$")
}

/// 按第一个知识点代码的关键词分类
pub(crate) fn classify_topic(topic_codes: &[String], table: &[(&[&str], &'static str)]) -> &'static str {
    let Some(first) = topic_codes.first() else {
        return "unknown";
    };
    let first = first.to_lowercase();
    table
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| first.contains(k)))
        .map(|(_, topic)| *topic)
        .unwrap_or("other")
}

pub(crate) fn flag(metadata: &mut Metadata, key: &str, value: impl Into<Value>) {
    metadata.insert(key.to_string(), value.into());
}
