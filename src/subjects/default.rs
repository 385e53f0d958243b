//! 默认行为，其它科目在此基础上覆盖

use crate::models::{Metadata, Task};

/// 默认不做后处理
pub fn post_process(_task: &Task) -> Metadata {
    Metadata::new()
}

/// 默认简答：去掉首尾空白
pub fn format_free_text(raw: &str) -> String {
    raw.trim().to_string()
}

/// 默认不校验
pub fn validate_free_text(_raw: &str) -> bool {
    true
}

/// 数值类简答：逗号转小数点，去掉所有空白
///
/// 科学计数法和分数原样保留。
pub fn format_numeric(raw: &str) -> String {
    format_free_text(raw)
        .replace(',', ".")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_formatting() {
        assert_eq!(format_numeric("3,5"), "3.5");
        assert_eq!(format_numeric(" 1 000,25 "), "1000.25");
        assert_eq!(format_numeric("1,5e-3"), "1.5e-3");
        assert_eq!(format_numeric("-3/4"), "-3/4");
    }

    #[test]
    fn default_trims_only() {
        assert_eq!(format_free_text("  12 34 "), "12 34");
        assert!(validate_free_text(""));
    }
}
