use crate::models::subject::Subject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 科目相关的派生标签
pub type Metadata = BTreeMap<String, Value>;

/// 作答形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerShape {
    /// 简答（文本输入框）
    FreeText,
    /// 多选（复选框）
    MultiSelect,
    /// 连线匹配（下拉框）
    Matching,
}

impl AnswerShape {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerShape::FreeText => "free_text",
            AnswerShape::MultiSelect => "multi_select",
            AnswerShape::Matching => "matching",
        }
    }
}

impl std::fmt::Display for AnswerShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 多选题的一个选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// 在有效选项行中的位置（从 0 开始）
    pub index: usize,
    pub label: String,
    /// 复选框的 name 属性
    pub field_name: String,
}

/// 匹配题左侧的一项（А, Б, ...）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPrompt {
    pub letter: String,
    pub label: String,
    /// 下拉框的 name 属性
    pub field_name: String,
}

/// 匹配题右侧的一项（1, 2, ...）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingChoice {
    pub number: String,
    pub label: String,
}

/// 作答区数据
///
/// 枚举分支本身就是作答形式，每种形式只携带自己的字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum AnswerBlock {
    FreeText {
        #[serde(default)]
        unit_hint: Option<String>,
    },
    MultiSelect {
        options: Vec<SelectOption>,
    },
    Matching {
        prompts: Vec<MatchingPrompt>,
        choices: Vec<MatchingChoice>,
    },
}

impl AnswerBlock {
    pub fn shape(&self) -> AnswerShape {
        match self {
            AnswerBlock::FreeText { .. } => AnswerShape::FreeText,
            AnswerBlock::MultiSelect { .. } => AnswerShape::MultiSelect,
            AnswerBlock::Matching { .. } => AnswerShape::Matching,
        }
    }
}

/// 解析器从单个题目块中提取出的基础字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub identifier: String,
    pub display_id: String,
    pub question_text: String,
    pub question_markup: String,
    pub image_references: Vec<String>,
    pub topic_codes: Vec<String>,
}

/// 题目记录
///
/// `identifier` 和 `answer` 只在创建时设置，之后没有修改入口。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    identifier: String,
    pub display_id: String,
    pub subject: Subject,
    answer: AnswerBlock,
    pub question_text: String,
    pub question_markup: String,
    #[serde(default)]
    pub image_references: Vec<String>,
    #[serde(default)]
    pub topic_codes: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Task {
    /// 由解析结果和作答区数据创建题目
    pub fn new(fields: ExtractedFields, subject: Subject, answer: AnswerBlock) -> Self {
        Self {
            identifier: fields.identifier,
            display_id: fields.display_id,
            subject,
            answer,
            question_text: fields.question_text,
            question_markup: fields.question_markup,
            image_references: fields.image_references,
            topic_codes: fields.topic_codes,
            metadata: Metadata::new(),
        }
    }

    /// 题库系统的 guid，提交答案时使用
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn answer(&self) -> &AnswerBlock {
        &self.answer
    }

    pub fn answer_shape(&self) -> AnswerShape {
        self.answer.shape()
    }

    /// 多选题的选项数，其它题型为 None
    pub fn option_count(&self) -> Option<usize> {
        match &self.answer {
            AnswerBlock::MultiSelect { options } => Some(options.len()),
            _ => None,
        }
    }

    pub fn unit_hint(&self) -> Option<&str> {
        match &self.answer {
            AnswerBlock::FreeText { unit_hint } => unit_hint.as_deref(),
            _ => None,
        }
    }

    /// 合并科目后处理得到的标签，已有的键会被覆盖
    pub fn enrich(&mut self, extra: Metadata) {
        self.metadata.extend(extra);
    }

    /// 图片本地化：原始 URL 写入 metadata，引用改为本地路径
    pub fn localize_images(&mut self, local_paths: Vec<String>) {
        if local_paths.is_empty() {
            return;
        }
        self.metadata
            .entry("original_image_urls".to_string())
            .or_insert_with(|| Value::from(self.image_references.clone()));
        self.image_references = local_paths;
    }

    /// 第一个知识点代码的编号部分，例如 "2.2 Иррациональные уравнения" → "2.2"
    pub fn primary_topic(&self) -> Option<&str> {
        self.topic_codes
            .first()
            .and_then(|code| code.split_whitespace().next())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// 生成便于人工阅读的 Markdown
    pub fn to_markdown(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("# Задание {}", self.display_id));
        lines.push(format!("\n**GUID:** `{}`", self.identifier));
        lines.push(format!("\n**Предмет:** {}", self.subject.display_name()));
        lines.push(format!("\n**Тип:** {}", self.answer_shape()));

        if !self.topic_codes.is_empty() {
            lines.push(format!("\n**КЭС:** {}", self.topic_codes.join(", ")));
        }

        lines.push("\n## Текст задания\n".to_string());
        lines.push(self.question_text.clone());

        if !self.image_references.is_empty() {
            lines.push("\n## Изображения\n".to_string());
            for img in &self.image_references {
                lines.push(format!("- `{}`", img));
            }
        }

        match &self.answer {
            AnswerBlock::FreeText { unit_hint } => {
                lines.push("\n## Формат ответа\n".to_string());
                let unit = unit_hint
                    .as_deref()
                    .map(|u| format!(" ({})", u))
                    .unwrap_or_default();
                lines.push(format!("Краткий ответ{}", unit));
            }
            AnswerBlock::MultiSelect { options } if !options.is_empty() => {
                lines.push("\n## Варианты ответа\n".to_string());
                for option in options {
                    lines.push(format!("{}. {}", option.index + 1, option.label));
                }
            }
            AnswerBlock::MultiSelect { .. } => {}
            AnswerBlock::Matching { prompts, choices } => {
                if !prompts.is_empty() {
                    lines.push("\n## Установите соответствие\n".to_string());
                    for prompt in prompts {
                        lines.push(format!("**{})** {}", prompt.letter, prompt.label));
                    }
                }
                if !choices.is_empty() {
                    lines.push("\n**Варианты:**\n".to_string());
                    for choice in choices {
                        lines.push(format!("{}. {}", choice.number, choice.label));
                    }
                }
            }
        }

        if !self.metadata.is_empty() {
            lines.push("\n## Метаданные\n".to_string());
            for (key, value) in &self.metadata {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                lines.push(format!("- **{}:** {}", key, rendered));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> ExtractedFields {
        ExtractedFields {
            identifier: "474F4B0A1B2C3D4E".to_string(),
            display_id: "474F4B".to_string(),
            question_text: "Найдите скорость тела.".to_string(),
            question_markup: "<td class=\"cell_0\">Найдите скорость тела.</td>".to_string(),
            image_references: vec!["docs/graph1.png".to_string()],
            topic_codes: vec!["1.1 Кинематика".to_string()],
        }
    }

    #[test]
    fn shape_follows_answer_block() {
        let task = Task::new(
            sample_fields(),
            Subject::Physics,
            AnswerBlock::MultiSelect {
                options: vec![SelectOption {
                    index: 0,
                    label: "первый".to_string(),
                    field_name: "test0".to_string(),
                }],
            },
        );
        assert_eq!(task.answer_shape(), AnswerShape::MultiSelect);
        assert_eq!(task.option_count(), Some(1));
        assert_eq!(task.unit_hint(), None);
    }

    #[test]
    fn json_round_trip_keeps_record() {
        let mut task = Task::new(
            sample_fields(),
            Subject::Physics,
            AnswerBlock::FreeText {
                unit_hint: Some("м".to_string()),
            },
        );
        task.enrich(Metadata::from([("unit_type".to_string(), Value::from("length"))]));

        let json = task.to_json().unwrap();
        assert!(json.contains("\"shape\": \"free_text\""));
        let restored: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, task);
    }

    #[test]
    fn localize_images_keeps_original_urls() {
        let mut task = Task::new(sample_fields(), Subject::MathProf, AnswerBlock::FreeText { unit_hint: None });
        task.localize_images(vec!["media/graph1.png".to_string()]);

        assert_eq!(task.image_references, vec!["media/graph1.png"]);
        assert_eq!(
            task.metadata["original_image_urls"],
            Value::from(vec!["docs/graph1.png"])
        );

        // 第二次本地化不会覆盖最初的 URL
        task.localize_images(vec!["media/other.png".to_string()]);
        assert_eq!(
            task.metadata["original_image_urls"],
            Value::from(vec!["docs/graph1.png"])
        );
    }

    #[test]
    fn primary_topic_takes_first_token() {
        let task = Task::new(sample_fields(), Subject::Physics, AnswerBlock::FreeText { unit_hint: None });
        assert_eq!(task.primary_topic(), Some("1.1"));
    }

    #[test]
    fn markdown_lists_matching_sides() {
        let task = Task::new(
            sample_fields(),
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
        );
        let md = task.to_markdown();
        assert!(md.starts_with("# Задание 474F4B"));
        assert!(md.contains("**А)** Вариант А"));
        assert!(md.contains("1. увеличится"));
        assert!(md.contains("**КЭС:** 1.1 Кинематика"));
    }
}
