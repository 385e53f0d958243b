//! 列表页解析 - 业务能力层
//!
//! 一页 HTML → 若干题目记录。单个题目块解析失败只记录日志并跳过，
//! 不影响同一页的其它题目。

use crate::models::{Subject, Task};
use crate::services::{classifier, extractor};
use crate::subjects::{self, SubjectProfile};
use crate::utils::logging::truncate_text;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, warn};

static TASK_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.qblock").expect("task block selector"));

/// 题目解析器，科目钩子在创建时确定
#[derive(Debug, Clone, Copy)]
pub struct TaskParser {
    subject: Subject,
    profile: &'static SubjectProfile,
}

impl TaskParser {
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            profile: subjects::profile(subject),
        }
    }

    /// 解析一整页
    ///
    /// # 参数
    /// - `html`: 列表页 HTML
    ///
    /// # 返回
    /// 按页面顺序返回成功解析的题目
    pub fn parse_page(&self, html: &str) -> Vec<Task> {
        let document = Html::parse_document(html);
        let topics = extractor::TopicIndex::build(&document);

        let blocks: Vec<ElementRef<'_>> = document.select(&TASK_BLOCK).collect();
        debug!(
            "页面包含 {} 个题目块，{} 个信息块",
            blocks.len(),
            topics.len()
        );
        if !blocks.is_empty() && topics.is_empty() {
            debug!("页面没有 КЭС 信息块，题目将不带知识点");
        }

        blocks
            .into_iter()
            .enumerate()
            .filter_map(|(position, block)| match self.parse_block(block, &topics) {
                Ok(task) => Some(task),
                Err(e) => {
                    let id = block.value().id().unwrap_or("-");
                    warn!("⚠️ 跳过第 {} 个题目块 ({}): {}", position + 1, id, e);
                    None
                }
            })
            .collect()
    }

    fn parse_block(
        &self,
        block: ElementRef<'_>,
        topics: &extractor::TopicIndex,
    ) -> Result<Task, crate::error::ExtractError> {
        let fields = extractor::extract(block, topics)?;
        let answer = classifier::classify(block)?;

        let mut task = Task::new(fields, self.subject, answer);
        let extra = (self.profile.parser.post_process)(&task);
        task.enrich(extra);

        debug!(
            "✓ 题目 {} [{}] {}",
            task.display_id,
            task.answer_shape(),
            truncate_text(&task.question_text, 40)
        );
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerShape;

    const PAGE: &str = r#"
        <html><body>
        <div class="qblock" id="q0A1B2C">
            <input type="hidden" name="guid" value="0A1B2C3D4E5F">
            <table><tr><td class="cell_0">Найдите работу силы.</td></tr></table>
            <div class="varinats-block"><span><input type="text" name="answer"> Дж</span></div>
        </div>
        <div id="i0A1B2C">
            <div class="task-info-panel"><table>
                <tr><td>КЭС:</td><td>1.4 Законы сохранения</td></tr>
            </table></div>
        </div>
        <div class="qblock" id="qBROKEN">
            <table><tr><td class="cell_0">Без guid</td></tr></table>
        </div>
        <div class="qblock" id="qFFEE">
            <input type="hidden" name="guid" value="FFEE0011">
            <table><tr><td class="cell_0">Выберите верные утверждения.</td></tr></table>
            <table>
                <tr class="active-distractor"><td><input type="checkbox" name="test0"></td><td>первое</td></tr>
                <tr class="active-distractor"><td><input type="checkbox" name="test1"></td><td>второе</td></tr>
            </table>
        </div>
        </body></html>
    "#;

    #[test]
    fn skips_broken_blocks_and_runs_hooks() {
        let parser = TaskParser::new(Subject::Physics);
        let tasks = parser.parse_page(PAGE);

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].identifier(), "0A1B2C3D4E5F");
        assert_eq!(tasks[0].unit_hint(), Some("Дж"));
        assert_eq!(tasks[0].topic_codes, vec!["1.4 Законы сохранения"]);
        assert_eq!(tasks[0].metadata["unit_type"], serde_json::Value::from("energy"));

        assert_eq!(tasks[1].answer_shape(), AnswerShape::MultiSelect);
        assert_eq!(tasks[1].option_count(), Some(2));
    }

    #[test]
    fn parsing_is_idempotent() {
        let parser = TaskParser::new(Subject::Russian);
        assert_eq!(parser.parse_page(PAGE), parser.parse_page(PAGE));
    }

    #[test]
    fn empty_page_yields_nothing() {
        let parser = TaskParser::new(Subject::MathProf);
        assert!(parser.parse_page("<html><body>Нет заданий</body></html>").is_empty());
    }
}
