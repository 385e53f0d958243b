//! Cookie 文件读取
//!
//! 文件格式：每行一个 `name=value`，空行和 `#` 开头的行忽略。

use crate::error::StoreError;
use reqwest::cookie::Jar;
use reqwest::Url;
use std::path::Path;
use tracing::{debug, warn};

/// 解析 cookie 文件内容
pub fn parse_cookie_lines(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let Some((name, value)) = line.split_once('=') else {
                debug!("忽略无效的 cookie 行: {}", line);
                return None;
            };
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// 读取 cookie 文件
///
/// 文件不存在时返回空列表，只记录警告。
pub async fn load_cookies(path: impl AsRef<Path>) -> Result<Vec<(String, String)>, StoreError> {
    let path = path.as_ref();
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        warn!("⚠️ Cookie 文件不存在: {}", path.display());
        return Ok(Vec::new());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StoreError::read_failed(path, e))?;
    let cookies = parse_cookie_lines(&content);
    debug!("从 {} 读取了 {} 个 cookie", path.display(), cookies.len());
    Ok(cookies)
}

/// 用文件中的 cookie 初始化会话 jar
///
/// 每个 cookie 都挂在站点根路径上，对站点的所有请求生效。
pub fn seed_jar(cookies: &[(String, String)], site: &Url) -> Jar {
    let jar = Jar::default();
    for (name, value) in cookies {
        jar.add_cookie_str(&format!("{name}={value}; Path=/"), site);
    }
    jar
}
