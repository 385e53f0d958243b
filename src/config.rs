use crate::error::ConfigError;
use std::str::FromStr;

/// 运行模式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// 抓取题目并保存
    Crawl,
    /// 读取答案表并批量判题
    Check,
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "crawl" => Ok(RunMode::Crawl),
            "check" => Ok(RunMode::Check),
            other => Err(ConfigError::EnvVarParseFailed {
                var_name: "RUN_MODE".to_string(),
                value: other.to_string(),
                expected_type: "crawl | check".to_string(),
            }),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 科目键（physics / math_prof / russian）
    pub subject: String,
    /// 题库站点地址
    pub base_url: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 每次请求后的固定等待（毫秒）
    pub request_delay_ms: u64,
    /// 每页题目数
    pub page_size: usize,
    /// 最多抓取的题目数，None 表示不限
    pub max_tasks: Option<usize>,
    /// 连续空页数达到该值后停止
    pub max_empty_pages: usize,
    /// 页码上限
    pub max_pages: usize,
    /// 是否下载图片
    pub download_images: bool,
    /// 题目保存目录
    pub data_dir: String,
    /// Cookie 文件（每行 name=value）
    pub cookie_file: Option<String>,
    /// 是否跳过 TLS 证书校验
    pub accept_invalid_certs: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 运行模式
    pub mode: RunMode,
    /// 判题模式使用的答案表（TOML）
    pub answers_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subject: "physics".to_string(),
            base_url: "https://ege.fipi.ru".to_string(),
            request_timeout_secs: 30,
            request_delay_ms: 500,
            page_size: 10,
            max_tasks: None,
            max_empty_pages: 3,
            max_pages: 1000,
            download_images: true,
            data_dir: "data".to_string(),
            cookie_file: None,
            accept_invalid_certs: false,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            mode: RunMode::Crawl,
            answers_file: "answers.toml".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    ///
    /// 设置了但无法解析的值返回 [`ConfigError::EnvVarParseFailed`]。
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            subject: std::env::var("FIPI_SUBJECT").unwrap_or(default.subject),
            base_url: std::env::var("FIPI_BASE_URL").unwrap_or(default.base_url),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(default.request_timeout_secs),
            request_delay_ms: env_parse("REQUEST_DELAY_MS", "u64")?.unwrap_or(default.request_delay_ms),
            page_size: env_parse("PAGE_SIZE", "usize")?.unwrap_or(default.page_size),
            max_tasks: env_parse("MAX_TASKS", "usize")?.or(default.max_tasks),
            max_empty_pages: env_parse("MAX_EMPTY_PAGES", "usize")?.unwrap_or(default.max_empty_pages),
            max_pages: env_parse("MAX_PAGES", "usize")?.unwrap_or(default.max_pages),
            download_images: env_parse("DOWNLOAD_IMAGES", "bool")?.unwrap_or(default.download_images),
            data_dir: std::env::var("DATA_DIR").unwrap_or(default.data_dir),
            cookie_file: std::env::var("COOKIE_FILE").ok().or(default.cookie_file),
            accept_invalid_certs: env_parse("ACCEPT_INVALID_CERTS", "bool")?
                .unwrap_or(default.accept_invalid_certs),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            mode: match std::env::var("RUN_MODE") {
                Ok(value) => value.parse()?,
                Err(_) => default.mode,
            },
            answers_file: std::env::var("ANSWERS_FILE").unwrap_or(default.answers_file),
        })
    }
}

fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
