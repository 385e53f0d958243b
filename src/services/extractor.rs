//! 题目块解析 - 业务能力层
//!
//! 从单个 `div.qblock` 中提取 guid、编号、题干、图片和知识点代码（КЭС）。

use crate::error::ExtractError;
use crate::models::ExtractedFields;
use crate::utils::text::{char_prefix, clean_text, element_text, stripped_text};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;

static GUID_INPUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[name="guid"]"#).expect("guid selector"));
static DISPLAY_ID: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.canselect").expect("display id selector"));
static QUESTION_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.cell_0").expect("question cell selector"));
static INFO_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[id^="i"]"#).expect("info block selector"));
static INFO_PANEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.task-info-panel").expect("info panel selector"));
static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").expect("table selector"));
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("row selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("cell selector"));
static DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").expect("div selector"));

static SHOW_PICTURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"ShowPictureQ\(['"]([^'"]+)['"]\)"#).expect("ShowPictureQ regex")
});
static IMG_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<img[^>]+src=["']([^"']+)["']"#).expect("img src regex")
});

/// 知识点代码所在行的标签
const TOPIC_LABEL: &str = "КЭС";

/// guid 缺失时显示编号取 guid 的前几位
pub const DISPLAY_ID_FALLBACK_LEN: usize = 8;

/// 整页的知识点索引：id 后缀 → 知识点代码
///
/// 题目块 `q<hex>` 和信息块 `i<hex>` 在页面上互不嵌套，
/// 每页只扫描一次，之后按后缀直接查。
#[derive(Debug, Default, Clone)]
pub struct TopicIndex {
    by_suffix: HashMap<String, Vec<String>>,
}

impl TopicIndex {
    /// 扫描整个页面的信息块
    pub fn build(document: &Html) -> Self {
        let mut by_suffix = HashMap::new();
        for block in document.select(&INFO_BLOCK) {
            let Some(suffix) = block.value().id().and_then(|id| id.strip_prefix('i')) else {
                continue;
            };
            if suffix.is_empty() {
                continue;
            }
            // 同一后缀以页面上第一次出现为准
            by_suffix
                .entry(suffix.to_string())
                .or_insert_with(|| topic_codes_from_info_block(block));
        }
        Self { by_suffix }
    }

    /// 按题目块自身的 id（`q<hex>`）查找知识点代码，找不到时为空
    pub fn lookup(&self, fragment_id: Option<&str>) -> Vec<String> {
        fragment_id
            .and_then(|id| id.strip_prefix('q'))
            .and_then(|suffix| self.by_suffix.get(suffix))
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_suffix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_suffix.is_empty()
    }
}

/// 提取题目块的基础字段
///
/// 缺少 guid 或题干单元格时返回 [`ExtractError::NotFound`]
pub fn extract(fragment: ElementRef<'_>, topics: &TopicIndex) -> Result<ExtractedFields, ExtractError> {
    let identifier = extract_identifier(fragment)?;
    let display_id = extract_display_id(fragment, &identifier);

    let cell = fragment
        .select(&QUESTION_CELL)
        .next()
        .ok_or(ExtractError::NotFound { what: "td.cell_0" })?;
    let question_markup = cell.html();
    let question_text = element_text(cell);

    let image_references = extract_images(&question_markup);
    let topic_codes = topics.lookup(fragment.value().id());

    Ok(ExtractedFields {
        identifier,
        display_id,
        question_text,
        question_markup,
        image_references,
        topic_codes,
    })
}

/// 从隐藏的 guid 输入框读取 guid
fn extract_identifier(fragment: ElementRef<'_>) -> Result<String, ExtractError> {
    let input = fragment
        .select(&GUID_INPUT)
        .next()
        .ok_or(ExtractError::NotFound { what: "input[name=guid]" })?;

    match input.value().attr("value").map(str::trim) {
        Some(guid) if !guid.is_empty() => Ok(guid.to_string()),
        _ => Err(ExtractError::NotFound { what: "guid value" }),
    }
}

fn extract_display_id(fragment: ElementRef<'_>, identifier: &str) -> String {
    fragment
        .select(&DISPLAY_ID)
        .next()
        .map(stripped_text)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| char_prefix(identifier, DISPLAY_ID_FALLBACK_LEN))
}

/// 从题干 HTML 中提取图片地址
///
/// 先找 `ShowPictureQ('...')` 调用，再找 `<img src>`，结果按顺序拼接，允许重复。
pub fn extract_images(markup: &str) -> Vec<String> {
    SHOW_PICTURE_RE
        .captures_iter(markup)
        .chain(IMG_SRC_RE.captures_iter(markup))
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// 从信息块的参数表中读取 КЭС 行
fn topic_codes_from_info_block(block: ElementRef<'_>) -> Vec<String> {
    let Some(table) = block
        .select(&INFO_PANEL)
        .next()
        .and_then(|panel| panel.select(&TABLE).next())
    else {
        return Vec::new();
    };

    let mut codes = Vec::new();
    for row in table.select(&ROW) {
        let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
        if cells.len() < 2 {
            continue;
        }

        let name = stripped_text(cells[0]);
        if !is_topic_label(&name) {
            continue;
        }

        let value_cell = cells[1];
        let nested: Vec<ElementRef<'_>> = value_cell.select(&DIV).collect();
        if nested.is_empty() {
            push_non_empty(&mut codes, element_text(value_cell));
        } else {
            for div in nested {
                push_non_empty(&mut codes, element_text(div));
            }
        }
    }
    codes
}

fn is_topic_label(name: &str) -> bool {
    name.contains(TOPIC_LABEL) || name.to_lowercase().contains(&TOPIC_LABEL.to_lowercase())
}

fn push_non_empty(codes: &mut Vec<String>, text: String) {
    let text = clean_text(&text);
    if !text.is_empty() {
        codes.push(text);
    }
}
