//! 文本清理工具

use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// 合并连续空白为单个空格、去掉首尾空白，并把 `&nbsp;` 实体替换为空格
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RE
        .replace_all(text, " ")
        .trim()
        .replace("&nbsp;", " ")
}

/// 元素的全部文本，经过 [`clean_text`] 处理
pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// 每段文本去掉首尾空白后直接拼接
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// 按字符截取前 `n` 个字符
pub fn char_prefix(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}
