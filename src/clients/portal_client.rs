//! 题库站点客户端
//!
//! 封装与 FIPI 题库的全部 HTTP 交互：列表页、图片下载、判题提交。
//! 每次请求结束后固定等待 `request_delay_ms`，无论成功与否。

use crate::clients::cookies;
use crate::config::Config;
use crate::error::{AppResult, TransportError};
use crate::models::Subject;
use regex::Regex;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Url;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7";

/// 判题接口要求的固定 multipart 分隔符
pub const SOLVE_BOUNDARY: &str = "---------------------------247746999627336697471839302941";

static QUESTION_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"setQCount\s*\(\s*(\d+)").expect("question count regex"));

/// 题库客户端
///
/// 一个会话对应一个科目，`reqwest::Client` 只创建一次。
/// Cookie 放在会话自己的 jar 里：文件中的 cookie 作为初始值，
/// 站点在任何响应里设置的 cookie 会带到之后的请求上。
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    project_id: &'static str,
    delay: Duration,
}

impl PortalClient {
    /// 读取 cookie 文件并创建客户端
    pub async fn connect(config: &Config, subject: Subject) -> AppResult<Self> {
        let cookies = match &config.cookie_file {
            Some(path) => cookies::load_cookies(path).await?,
            None => Vec::new(),
        };
        Ok(Self::new(config, subject, &cookies)?)
    }

    /// 创建客户端
    ///
    /// # 参数
    /// - `config`: 程序配置（地址、超时、等待时间、TLS 开关）
    /// - `subject`: 科目，决定 `proj` 参数
    /// - `cookies`: 会话 cookie
    pub fn new(
        config: &Config,
        subject: Subject,
        cookies: &[(String, String)],
    ) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE));

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let site = Url::parse(&base_url).map_err(|e| TransportError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        let jar = cookies::seed_jar(cookies, &site);

        if config.accept_invalid_certs {
            warn!("⚠️ 已关闭 TLS 证书校验");
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_provider(Arc::new(jar))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(TransportError::ClientBuild)?;

        Ok(Self {
            http,
            base_url,
            project_id: subject.project_id(),
            delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    fn listing_url(&self) -> String {
        format!("{}/bank/questions.php", self.base_url)
    }

    fn solve_url(&self) -> String {
        format!("{}/bank/solve.php", self.base_url)
    }

    /// 请求结束后等待固定时间
    async fn paced<T>(&self, request: impl Future<Output = T>) -> T {
        let result = request.await;
        tokio::time::sleep(self.delay).await;
        result
    }

    /// 获取列表页 HTML
    ///
    /// # 参数
    /// - `page`: 页码（从 0 开始）
    /// - `page_size`: 每页题目数
    pub async fn fetch_listing(&self, page: usize, page_size: usize) -> Result<String, TransportError> {
        let url = self.listing_url();
        debug!("GET {} page={} pagesize={}", url, page, page_size);

        self.paced(async {
            let response = self
                .http
                .get(&url)
                .query(&[
                    ("proj", self.project_id.to_string()),
                    ("page", page.to_string()),
                    ("pagesize", page_size.to_string()),
                ])
                .send()
                .await
                .map_err(|e| TransportError::request_failed(&url, e))?;
            read_text(response, &url).await
        })
        .await
    }

    /// 题库中的题目总数，失败或找不到时返回 0
    pub async fn fetch_total_count(&self) -> usize {
        match self.fetch_listing(0, 1).await {
            Ok(html) => parse_total_count(&html),
            Err(e) => {
                warn!("⚠️ 无法获取题目总数: {}", e);
                0
            }
        }
    }

    /// 下载图片，相对路径拼接到站点地址上
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let url = self.absolute_url(url);
        debug!("GET {}", url);

        self.paced(async {
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| TransportError::request_failed(&url, e))?;
            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::BadStatus {
                    endpoint: url.clone(),
                    status,
                });
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|e| TransportError::request_failed(&url, e))?;
            Ok(bytes.to_vec())
        })
        .await
    }

    /// 提交答案，返回去掉首尾空白的响应正文（单字符结果代码）
    ///
    /// # 参数
    /// - `guid`: 题目 guid
    /// - `answer`: 已格式化好的答案字符串
    pub async fn post_solution(&self, guid: &str, answer: &str) -> Result<String, TransportError> {
        let url = self.solve_url();
        let referer = format!("{}?proj={}", self.listing_url(), self.project_id);
        let body = solve_body(guid, answer, self.project_id);
        debug!("POST {} guid={} answer={}", url, guid, answer);

        self.paced(async {
            let response = self
                .http
                .post(&url)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={SOLVE_BOUNDARY}"),
                )
                .header(header::REFERER, referer)
                .body(body)
                .send()
                .await
                .map_err(|e| TransportError::request_failed(&url, e))?;
            let text = read_text(response, &url).await?;
            Ok(text.trim().to_string())
        })
        .await
    }

    fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }
}

async fn read_text(response: reqwest::Response, url: &str) -> Result<String, TransportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::BadStatus {
            endpoint: url.to_string(),
            status,
        });
    }
    response
        .text()
        .await
        .map_err(|e| TransportError::request_failed(url, e))
}

/// 从列表页脚本中读取题目总数
pub fn parse_total_count(html: &str) -> usize {
    QUESTION_COUNT_RE
        .captures(html)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// 判题请求正文：guid、answer、ajax=1、proj 四个字段，CRLF 换行
pub fn solve_body(guid: &str, answer: &str, project_id: &str) -> String {
    let fields = [("guid", guid), ("answer", answer), ("ajax", "1"), ("proj", project_id)];

    let mut lines = Vec::with_capacity(fields.len() * 4 + 2);
    for (name, value) in fields {
        lines.push(format!("--{SOLVE_BOUNDARY}"));
        lines.push(format!("Content-Disposition: form-data; name=\"{name}\""));
        lines.push(String::new());
        lines.push(value.to_string());
    }
    lines.push(format!("--{SOLVE_BOUNDARY}--"));
    lines.push(String::new());
    lines.join("\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_body_layout() {
        let body = solve_body("ABC", "10100", "PROJ");
        let expected = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"guid\"\r\n\r\nABC\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"answer\"\r\n\r\n10100\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"ajax\"\r\n\r\n1\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"proj\"\r\n\r\nPROJ\r\n\
             --{b}--\r\n",
            b = SOLVE_BOUNDARY
        );
        assert_eq!(body, expected);
    }

    #[test]
    fn total_count_from_script() {
        assert_eq!(parse_total_count("<script>setQCount( 3021 , 1);</script>"), 3021);
        assert_eq!(parse_total_count("<html></html>"), 0);
    }

    #[tokio::test]
    async fn relative_image_urls_join_base() {
        let config = Config {
            base_url: "https://ege.fipi.ru/".to_string(),
            ..Config::default()
        };
        let client = PortalClient::new(&config, Subject::Physics, &[]).unwrap();
        assert_eq!(
            client.absolute_url("docs/BA1F/img.png"),
            "https://ege.fipi.ru/docs/BA1F/img.png"
        );
        assert_eq!(
            client.absolute_url("/docs/img.png"),
            "https://ege.fipi.ru/docs/img.png"
        );
        assert_eq!(client.absolute_url("http://x.ru/a.png"), "http://x.ru/a.png");
        assert_eq!(client.solve_url(), "https://ege.fipi.ru/bank/solve.php");
        assert_eq!(client.listing_url(), "https://ege.fipi.ru/bank/questions.php");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = Config {
            base_url: "ege.fipi.ru".to_string(),
            ..Config::default()
        };
        let err = PortalClient::new(&config, Subject::Physics, &[]).unwrap_err();
        assert!(matches!(err, TransportError::InvalidBaseUrl { .. }));
    }
}
