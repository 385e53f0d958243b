//! 答案提交 - 业务能力层
//!
//! 只负责"提交一个答案并解释结果代码"，网络错误不向上抛出，
//! 统一转换为 [`CheckResult::Error`]。

use crate::clients::PortalClient;
use crate::models::{AnswerInput, CheckResponse, CheckResult, Task};
use crate::services::extractor::DISPLAY_ID_FALLBACK_LEN;
use crate::services::formatter;
use crate::utils::text::char_prefix;
use tracing::{error, info, warn};

/// 一次提交的原始结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub result: CheckResult,
    /// 服务器返回的代码（去掉首尾空白）
    pub code: String,
    pub error: Option<String>,
}

/// 要判的题目
#[derive(Debug, Clone, PartialEq)]
pub enum CheckTarget {
    /// 本地题库中的题目，按作答形式格式化答案
    Task(Task),
    /// 只有 guid，答案字符串化后原样提交
    Guid(String),
}

/// 答案提交服务
pub struct Submitter {
    client: PortalClient,
}

impl Submitter {
    pub fn new(client: PortalClient) -> Self {
        Self { client }
    }

    /// 提交已格式化的答案
    ///
    /// # 参数
    /// - `identifier`: 题目 guid
    /// - `wire_answer`: 提交用的答案字符串
    pub async fn submit(&self, identifier: &str, wire_answer: &str) -> SubmitOutcome {
        match self.client.post_solution(identifier, wire_answer).await {
            Ok(code) => SubmitOutcome {
                result: CheckResult::from_code(&code),
                code,
                error: None,
            },
            Err(e) => {
                error!("❌ 提交失败 ({}): {}", identifier, e);
                SubmitOutcome {
                    result: CheckResult::Error,
                    code: String::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// 格式化并提交一道题的答案
    pub async fn check_answer(&self, task: &Task, input: &AnswerInput) -> CheckResponse {
        if !formatter::validate_answer_format(task, input) {
            warn!(
                "⚠️ 题目 {} 的答案格式可能不正确: {}",
                task.display_id,
                input.render()
            );
        }

        let wire_answer = formatter::format_answer(task, input);
        let outcome = self.submit(task.identifier(), &wire_answer).await;

        CheckResponse {
            identifier: task.identifier().to_string(),
            display_id: task.display_id.clone(),
            result: outcome.result,
            wire_answer,
            result_code: outcome.code,
            error: outcome.error,
        }
    }

    /// 没有本地题目时按 guid 直接提交，答案不经过格式化
    pub async fn check_guid(&self, guid: &str, input: &AnswerInput) -> CheckResponse {
        let wire_answer = input.render();
        let outcome = self.submit(guid, &wire_answer).await;

        CheckResponse {
            identifier: guid.to_string(),
            display_id: char_prefix(guid, DISPLAY_ID_FALLBACK_LEN),
            result: outcome.result,
            wire_answer,
            result_code: outcome.code,
            error: outcome.error,
        }
    }

    /// 逐个提交，返回顺序与输入一致
    pub async fn batch_check(&self, items: &[(CheckTarget, AnswerInput)]) -> Vec<CheckResponse> {
        let total = items.len();
        let mut responses = Vec::with_capacity(total);

        for (index, (target, input)) in items.iter().enumerate() {
            let response = match target {
                CheckTarget::Task(task) => self.check_answer(task, input).await,
                CheckTarget::Guid(guid) => self.check_guid(guid, input).await,
            };
            let mark = match response.result {
                CheckResult::Correct => "✅",
                CheckResult::Incorrect => "❌",
                CheckResult::PartiallyCorrect => "🟡",
                CheckResult::Error => "⚠️",
            };
            info!(
                "[{}/{}] {} 题目 {}: {} (答案: {})",
                index + 1,
                total,
                mark,
                response.display_id,
                response.result,
                response.wire_answer
            );
            responses.push(response);
        }

        responses
    }
}
