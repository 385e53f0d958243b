//! 作答区识别 - 业务能力层
//!
//! 根据题目块里的输入控件判断作答形式，并提取对应的选项信息。
//! 一个题目块里可能同时出现多种控件，判断顺序固定：
//! 文本框 → 复选框 → 下拉框 → 默认简答。

use crate::error::ExtractError;
use crate::models::{AnswerBlock, MatchingChoice, MatchingPrompt, SelectOption};
use crate::utils::text::element_text;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;
use tracing::debug;

static VARIANTS_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.varinats-block").expect("variants block selector"));
static TEXT_ANSWER: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"input[type="text"][name="answer"]"#).expect("text answer selector")
});
static CHECKBOX: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[type="checkbox"]"#).expect("checkbox selector"));
static ACTIVE_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr.active-distractor").expect("active row selector"));
static SELECT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("select").expect("select selector"));
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("row selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("cell selector"));

/// 紧跟在答案输入框后面的单位
static UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<input\b[^>]*\bname="answer"[^>]*>(?:\s|&nbsp;)*([а-яА-ЯёЁa-zA-Z°]+)"#)
        .expect("unit regex")
});
/// 匹配题右侧编号，形如 `1)`
static CHOICE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\)").expect("choice number regex"));

/// 匹配题左侧默认字母的起点
const FIRST_PROMPT_LETTER: char = 'А';

/// 识别作答形式
pub fn classify(fragment: ElementRef<'_>) -> Result<AnswerBlock, ExtractError> {
    let scope = fragment.select(&VARIANTS_BLOCK).next().unwrap_or(fragment);

    if let Some(input) = scope.select(&TEXT_ANSWER).next() {
        return Ok(AnswerBlock::FreeText {
            unit_hint: unit_after_input(input),
        });
    }

    if scope.select(&CHECKBOX).next().is_some() {
        return Ok(AnswerBlock::MultiSelect {
            options: select_options(scope)?,
        });
    }

    if scope.select(&SELECT).next().is_some() {
        return Ok(AnswerBlock::Matching {
            prompts: matching_prompts(scope),
            choices: matching_choices(scope),
        });
    }

    debug!("未识别到输入控件，按简答处理");
    Ok(AnswerBlock::FreeText { unit_hint: None })
}

/// 在输入框父元素的 HTML 里找紧跟输入框的单位
fn unit_after_input(input: ElementRef<'_>) -> Option<String> {
    let parent = input.parent().and_then(ElementRef::wrap)?;
    let markup = parent.html();
    UNIT_RE
        .captures(&markup)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// 多选题选项，只统计 `active-distractor` 行
///
/// 下标是在有效行中的位置；没有复选框的行被跳过，但仍占一个下标。
fn select_options(scope: ElementRef<'_>) -> Result<Vec<SelectOption>, ExtractError> {
    let mut options = Vec::new();

    for (index, row) in scope.select(&ACTIVE_ROW).enumerate() {
        let Some(checkbox) = row.select(&CHECKBOX).next() else {
            continue;
        };

        let label_cell = row.select(&CELL).last().ok_or_else(|| {
            ExtractError::mismatch(format!("选项行 {} 没有 td", index))
        })?;

        let field_name = checkbox
            .value()
            .attr("name")
            .map(str::to_string)
            .unwrap_or_else(|| format!("test{}", index));

        options.push(SelectOption {
            index,
            label: element_text(label_cell),
            field_name,
        });
    }

    Ok(options)
}

/// 匹配题左侧：每个下拉框一项
///
/// 字母取下拉框所在单元格的前一个单元格；不在任何单元格里的下拉框被忽略。
/// 描述文字页面上并不可靠，统一用 "Вариант <字母>" 占位。
fn matching_prompts(scope: ElementRef<'_>) -> Vec<MatchingPrompt> {
    let mut prompts = Vec::new();

    for (index, select) in scope.select(&SELECT).enumerate() {
        let field_name = select
            .value()
            .attr("name")
            .map(str::to_string)
            .unwrap_or_else(|| format!("ans{}", index));

        let Some(cell) = enclosing_cell(select) else {
            debug!("下拉框 {} 不在表格单元格内，跳过", field_name);
            continue;
        };

        let letter = previous_cell(cell)
            .map(element_text)
            .unwrap_or_else(|| default_letter(index));

        prompts.push(MatchingPrompt {
            label: format!("Вариант {}", letter),
            letter,
            field_name,
        });
    }

    prompts
}

/// 匹配题右侧：扫描范围内所有首列形如 `1)` 的行
///
/// 不限定在专门的选项表格中，可能会多收无关的行。
fn matching_choices(scope: ElementRef<'_>) -> Vec<MatchingChoice> {
    scope
        .select(&ROW)
        .filter_map(|row| {
            let mut cells = row.select(&CELL);
            let number_cell = cells.next()?;
            let label_cell = cells.next()?;

            let number_text = element_text(number_cell);
            if !CHOICE_NUMBER_RE.is_match(&number_text) {
                return None;
            }

            Some(MatchingChoice {
                number: number_text.replace(')', "").trim().to_string(),
                label: element_text(label_cell),
            })
        })
        .collect()
}

fn enclosing_cell(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "td")
}

fn previous_cell(cell: ElementRef<'_>) -> Option<ElementRef<'_>> {
    cell.prev_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "td")
}

/// 第 `index` 个西里尔大写字母，从 А 开始
fn default_letter(index: usize) -> String {
    u32::try_from(index)
        .ok()
        .and_then(|offset| char::from_u32(FIRST_PROMPT_LETTER as u32 + offset))
        .map(String::from)
        .unwrap_or_else(|| index.to_string())
}
