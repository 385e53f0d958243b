/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use anyhow::{Context, Result};
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅器
///
/// `RUST_LOG` 优先；否则 verbose 时为 debug，默认 info。重复调用无副作用。
///
/// # 参数
/// - `verbose`: 是否输出详细日志
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
/// - `title`: 标题行
pub fn init_log_file(log_file_path: &str, title: &str) -> Result<()> {
    let log_header = format!(
        "{}\n{} - {}\n{}\n\n",
        "=".repeat(60),
        title,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `subject`: 科目名称
/// - `mode`: 运行模式
/// - `base_url`: 题库地址
pub fn log_startup(subject: &str, mode: &str, base_url: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}", mode);
    info!("📚 科目: {}", subject);
    info!("🌐 题库地址: {}", base_url);
    info!("{}", "=".repeat(60));
}

/// 记录分页开始信息
///
/// # 参数
/// - `page`: 页码
/// - `collected`: 已解析题目数
/// - `limit`: 题目数上限
pub fn log_page_start(page: usize, collected: usize, limit: Option<usize>) {
    info!("\n{}", "─".repeat(60));
    match limit {
        Some(limit) if limit > 0 => {
            let progress = (collected as f64 / limit as f64 * 100.0).min(100.0);
            info!(
                "📄 第 {} 页 | 进度: {}/{} ({:.1}%)",
                page, collected, limit, progress
            );
        }
        _ => info!("📄 第 {} 页 | 已解析: {}", page, collected),
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate_text("Найдите значение", 7), "Найдите...");
        assert_eq!(truncate_text("коротко", 20), "коротко");
    }
}
