use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 调用方提供的答案
///
/// 从 TOML/JSON 反序列化时按顺序尝试：字符串、整数数组、字符串数组、表。
/// 表的值可以是字符串或整数，`{ "А" = 2 }` 和 `{ "А" = "2" }` 等价。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerInput {
    /// 原样文本；多选和匹配题视为已编码好的答案
    Text(String),
    /// 多选题选中的下标（从 0 开始）
    Indices(Vec<usize>),
    /// 按字母顺序排好的编号序列
    Sequence(Vec<String>),
    /// 字母 → 编号
    Mapping(#[serde(deserialize_with = "scalar_map")] BTreeMap<String, String>),
    /// 其它任何值，只能字符串化
    Other(Value),
}

impl AnswerInput {
    /// 字符串化
    ///
    /// 文本原样返回；下标列表写成 `[0, 2]`（逗号后带空格）；
    /// 其它值用紧凑 JSON 表示，例如 `["2","4"]`、`{"А":"2"}`。
    pub fn render(&self) -> String {
        match self {
            AnswerInput::Text(text) => text.clone(),
            AnswerInput::Other(Value::String(text)) => text.clone(),
            AnswerInput::Other(value) => value.to_string(),
            AnswerInput::Indices(indices) => {
                let items: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
                format!("[{}]", items.join(", "))
            }
            AnswerInput::Sequence(items) => serde_json::to_string(items).unwrap_or_default(),
            AnswerInput::Mapping(mapping) => serde_json::to_string(mapping).unwrap_or_default(),
        }
    }
}

/// 匹配表中的单个值
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarValue {
    Text(String),
    Integer(i64),
}

/// 表的值统一转为字符串，其它类型的值让整个表落到 `Other`
fn scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, ScalarValue>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(letter, value)| {
            let value = match value {
                ScalarValue::Text(text) => text,
                ScalarValue::Integer(number) => number.to_string(),
            };
            (letter, value)
        })
        .collect())
}

impl From<&str> for AnswerInput {
    fn from(value: &str) -> Self {
        AnswerInput::Text(value.to_string())
    }
}

impl From<String> for AnswerInput {
    fn from(value: String) -> Self {
        AnswerInput::Text(value)
    }
}

impl From<Vec<usize>> for AnswerInput {
    fn from(value: Vec<usize>) -> Self {
        AnswerInput::Indices(value)
    }
}

impl From<Vec<String>> for AnswerInput {
    fn from(value: Vec<String>) -> Self {
        AnswerInput::Sequence(value)
    }
}

impl From<BTreeMap<String, String>> for AnswerInput {
    fn from(value: BTreeMap<String, String>) -> Self {
        AnswerInput::Mapping(value)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for AnswerInput {
    fn from(pairs: [(&str, &str); N]) -> Self {
        AnswerInput::Mapping(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sheet {
        answer: AnswerInput,
    }

    fn parse(src: &str) -> AnswerInput {
        toml::from_str::<Sheet>(src).unwrap().answer
    }

    #[test]
    fn toml_values_pick_matching_variant() {
        assert_eq!(parse(r#"answer = "3,5""#), AnswerInput::from("3,5"));
        assert_eq!(parse("answer = [0, 2]"), AnswerInput::Indices(vec![0, 2]));
        assert_eq!(
            parse(r#"answer = ["2", "4"]"#),
            AnswerInput::Sequence(vec!["2".to_string(), "4".to_string()])
        );
        assert_eq!(
            parse(r#"answer = { "Б" = "4", "А" = "2" }"#),
            AnswerInput::from([("А", "2"), ("Б", "4")])
        );
        assert_eq!(parse("answer = 42"), AnswerInput::Other(Value::from(42)));
    }

    #[test]
    fn integer_mapping_values_become_text() {
        let expected = AnswerInput::from([("А", "2"), ("Б", "4")]);
        assert_eq!(parse(r#"answer = { "А" = 2, "Б" = 4 }"#), expected);

        let json: AnswerInput = serde_json::from_str(r#"{"Б":4,"А":2}"#).unwrap();
        assert_eq!(json, expected);

        // 值为表或数组时不是匹配答案
        let nested: AnswerInput = serde_json::from_str(r#"{"А":[1]}"#).unwrap();
        assert!(matches!(nested, AnswerInput::Other(_)));
    }

    #[test]
    fn render_stringifies_non_text() {
        assert_eq!(AnswerInput::from("  12 ").render(), "  12 ");
        assert_eq!(AnswerInput::Indices(vec![0, 2]).render(), "[0, 2]");
        assert_eq!(AnswerInput::Indices(vec![]).render(), "[]");
        assert_eq!(AnswerInput::Other(Value::from(3.5)).render(), "3.5");
    }
}
