use serde::{Deserialize, Serialize};

/// 判题结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckResult {
    Correct,
    Incorrect,
    /// 题库接口的词汇里有这一项，但任何返回码都不会映射到它
    PartiallyCorrect,
    Error,
}

impl CheckResult {
    /// 将判题接口返回的单字符代码映射为结果
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" | "3" => CheckResult::Correct,
            "2" => CheckResult::Incorrect,
            _ => CheckResult::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckResult::Correct => "correct",
            CheckResult::Incorrect => "incorrect",
            CheckResult::PartiallyCorrect => "partially_correct",
            CheckResult::Error => "error",
        }
    }
}

impl std::fmt::Display for CheckResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次提交的完整结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub identifier: String,
    pub display_id: String,
    pub result: CheckResult,
    /// 实际发送的答案字符串
    pub wire_answer: String,
    #[serde(default)]
    pub result_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResponse {
    pub fn is_correct(&self) -> bool {
        self.result == CheckResult::Correct
    }
}
