//! 分页抓取器 - 编排层
//!
//! ## 职责
//!
//! 逐页请求题库列表，把每页交给 [`TaskParser`]，再把每道题交给 [`TaskFlow`]。
//! 所有请求顺序执行，不并发。
//!
//! ## 停止条件（`crawl_all`）
//!
//! 1. 已解析题目数达到 `max_tasks`（每页开始前检查，整页保留）
//! 2. 连续 `max_empty_pages` 页没有解析出题目（请求失败也算空页）
//! 3. 页码超过 `max_pages`

use crate::clients::PortalClient;
use crate::config::Config;
use crate::error::TransportError;
use crate::models::Task;
use crate::services::TaskParser;
use crate::utils::logging;
use crate::workflow::TaskFlow;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// 列表页和图片的来源
#[allow(async_fn_in_trait)]
pub trait ListingSource {
    /// 获取一页列表 HTML
    async fn fetch_page(&self, page: usize, page_size: usize) -> Result<String, TransportError>;

    /// 下载一张图片
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

impl ListingSource for PortalClient {
    async fn fetch_page(&self, page: usize, page_size: usize) -> Result<String, TransportError> {
        self.fetch_listing(page, page_size).await
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.fetch_bytes(url).await
    }
}

/// 抓取限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    pub page_size: usize,
    pub max_tasks: Option<usize>,
    pub max_empty_pages: usize,
    pub max_pages: usize,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_tasks: None,
            max_empty_pages: 3,
            max_pages: 1000,
        }
    }
}

impl From<&Config> for CrawlLimits {
    fn from(config: &Config) -> Self {
        Self {
            page_size: config.page_size,
            max_tasks: config.max_tasks,
            max_empty_pages: config.max_empty_pages,
            max_pages: config.max_pages,
        }
    }
}

/// 抓取统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    pub pages_requested: usize,
    pub tasks_parsed: usize,
    pub tasks_saved: usize,
    pub images_saved: usize,
    pub images_failed: usize,
    /// 作答形式 → 题目数
    pub by_shape: BTreeMap<String, usize>,
    /// 第一个知识点编号 → 题目数
    pub by_topic: BTreeMap<String, usize>,
}

impl CrawlReport {
    fn record(&mut self, task: &Task) {
        self.tasks_parsed += 1;
        *self
            .by_shape
            .entry(task.answer_shape().as_str().to_string())
            .or_default() += 1;
        let topic = task.primary_topic().unwrap_or("unknown").to_string();
        *self.by_topic.entry(topic).or_default() += 1;
    }

    /// 输出统计日志
    pub fn log_summary(&self) {
        info!("📄 请求页数: {}", self.pages_requested);
        info!("📝 解析题目: {}，保存: {}", self.tasks_parsed, self.tasks_saved);
        if self.images_saved + self.images_failed > 0 {
            info!("🖼️ 图片: 成功 {}，失败 {}", self.images_saved, self.images_failed);
        }
        if !self.by_shape.is_empty() {
            info!("按作答形式:");
            for (shape, count) in &self.by_shape {
                info!("  - {}: {}", shape, count);
            }
        }
        if !self.by_topic.is_empty() {
            info!("按知识点:");
            for (topic, count) in &self.by_topic {
                info!("  - {}: {}", topic, count);
            }
        }
    }
}

/// 分页抓取器
pub struct Crawler<S> {
    source: S,
    parser: TaskParser,
    flow: TaskFlow,
}

impl<S: ListingSource> Crawler<S> {
    pub fn new(source: S, parser: TaskParser, flow: TaskFlow) -> Self {
        Self {
            source,
            parser,
            flow,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// 从第 0 页开始抓取，直到满足任一停止条件
    pub async fn crawl_all(&self, limits: CrawlLimits) -> CrawlReport {
        let mut report = CrawlReport::default();
        let mut page = 0;
        let mut empty_pages = 0;

        loop {
            if let Some(max_tasks) = limits.max_tasks {
                if report.tasks_parsed >= max_tasks {
                    info!("✓ 已达到题目数上限: {}", max_tasks);
                    break;
                }
            }

            logging::log_page_start(page, report.tasks_parsed, limits.max_tasks);
            let found = self.process_page(page, limits.page_size, &mut report).await;

            if found > 0 {
                empty_pages = 0;
            } else {
                empty_pages += 1;
                warn!("⚠️ 空页 ({}/{})", empty_pages, limits.max_empty_pages);
                if empty_pages >= limits.max_empty_pages {
                    info!("✓ 连续 {} 页为空，抓取结束", limits.max_empty_pages);
                    break;
                }
            }

            page += 1;
            if page > limits.max_pages {
                warn!("⚠️ 已达到页数上限 ({})，抓取停止", limits.max_pages);
                break;
            }
        }

        report
    }

    /// 抓取 `[start_page, start_page + page_count)`，遇到空页立即停止
    pub async fn crawl_range(&self, start_page: usize, page_count: usize, page_size: usize) -> CrawlReport {
        let mut report = CrawlReport::default();

        for page in start_page..start_page + page_count {
            logging::log_page_start(page, report.tasks_parsed, None);
            if self.process_page(page, page_size, &mut report).await == 0 {
                info!("✓ 第 {} 页为空，抓取结束", page);
                break;
            }
        }

        report
    }

    /// 请求、解析、保存一页，返回解析出的题目数
    async fn process_page(&self, page: usize, page_size: usize, report: &mut CrawlReport) -> usize {
        report.pages_requested += 1;

        let html = match self.source.fetch_page(page, page_size).await {
            Ok(html) => html,
            Err(e) => {
                error!("❌ 第 {} 页请求失败: {}", page, e);
                return 0;
            }
        };

        let tasks = self.parser.parse_page(&html);
        let found = tasks.len();
        info!("✓ 第 {} 页解析出 {} 道题", page, found);

        for task in tasks {
            report.record(&task);
            let display_id = task.display_id.clone();
            match self.flow.run(&self.source, task).await {
                Ok(result) => {
                    report.tasks_saved += 1;
                    report.images_saved += result.images_saved;
                    report.images_failed += result.images_failed;
                }
                Err(e) => error!("❌ 题目 {} 保存失败: {}", display_id, e),
            }
        }

        found
    }
}
