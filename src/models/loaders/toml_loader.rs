use crate::models::AnswerInput;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// 答案表
///
/// ```toml
/// [[answers]]
/// guid = "474F4B0A1B2C3D4E5F60718293A4B5C6"
/// answer = "3,5"
///
/// [[answers]]
/// guid = "FFEE0011"
/// answer = [0, 2]
///
/// [[answers]]
/// display_id = "0A1B2C"
/// answer = { "А" = 2, "Б" = 4 }
/// ```
///
/// 每行至少给出 `guid` 或 `display_id` 之一。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerSheet {
    #[serde(default)]
    pub answers: Vec<AnswerEntry>,
}

/// 答案表中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEntry {
    /// 题目 guid；本地没有题目时直接按它提交
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    /// 页面上显示的题号，只能在本地题库中查找
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_id: Option<String>,
    pub answer: AnswerInput,
}

impl AnswerEntry {
    /// 日志里用来指代这一行的标识
    pub fn label(&self) -> &str {
        self.guid
            .as_deref()
            .or(self.display_id.as_deref())
            .unwrap_or("?")
    }
}

/// 从 TOML 文件加载答案表
pub async fn load_answer_sheet(path: &Path) -> Result<AnswerSheet> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", path.display()))?;

    let sheet: AnswerSheet = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", path.display()))?;

    tracing::info!("成功加载 {} 个答案", sheet.answers.len());
    Ok(sheet)
}
