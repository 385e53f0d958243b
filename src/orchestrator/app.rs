//! 应用主结构 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志文件、启动信息、科目查表、创建题库会话
//! 2. **抓取模式**：分页抓取并保存全部题目，输出统计
//! 3. **判题模式**：读取答案表，按 guid 或题号在本地题库中查找题目，逐个提交并统计；
//!    本地没有题目但给了 guid 时，答案原样按 guid 提交
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 [`PortalClient`] 的模块
//! - **向下委托**：抓取交给 [`Crawler`]，提交交给 [`Submitter`]

use crate::clients::PortalClient;
use crate::config::{Config, RunMode};
use crate::error::StoreError;
use crate::infrastructure::TaskStore;
use crate::models::{load_answer_sheet, AnswerEntry, CheckResponse, Subject};
use crate::orchestrator::crawler::{CrawlLimits, CrawlReport, Crawler};
use crate::services::{CheckTarget, Submitter, TaskParser};
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};
use crate::workflow::TaskFlow;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// 判题结果文件名，保存在数据目录下
const CHECK_RESULTS_FILE: &str = "check_results.json";

/// 应用主结构
pub struct App {
    config: Config,
    subject: Subject,
    client: PortalClient,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file, "FIPI 题库处理日志")?;

        // 未知科目直接返回给调用方
        let subject = Subject::from_key(&config.subject)?;

        let mode = match config.mode {
            RunMode::Crawl => "抓取模式",
            RunMode::Check => "判题模式",
        };
        log_startup(subject.display_name(), mode, &config.base_url);

        let client = PortalClient::connect(&config, subject)
            .await
            .context("无法创建题库会话")?;

        Ok(Self {
            config,
            subject,
            client,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        match self.config.mode {
            RunMode::Crawl => {
                self.crawl().await?;
            }
            RunMode::Check => {
                self.check().await?;
            }
        }
        Ok(())
    }

    /// 抓取全部题目
    pub async fn crawl(&self) -> Result<CrawlReport> {
        info!("\n🔍 正在获取题目总数...");
        let total = self.client.fetch_total_count().await;
        if total > 0 {
            info!("✓ 题库中共有 {} 道题", total);
        } else {
            warn!("⚠️ 无法确定题目总数，将抓取到连续空页为止");
        }

        let limits = CrawlLimits::from(&self.config);
        info!(
            "📋 每页 {} 道题，下载图片: {}",
            limits.page_size,
            if self.config.download_images { "是" } else { "否" }
        );

        let store = TaskStore::new(&self.config.data_dir);
        let crawler = Crawler::new(
            self.client.clone(),
            TaskParser::new(self.subject),
            TaskFlow::new(store.clone(), self.config.download_images),
        );

        let report = crawler.crawl_all(limits).await;
        report.log_summary();

        match store.statistics(Some(self.subject)).await {
            Ok(stats) => info!("💾 本地已保存 {} 道 {} 题目", stats.total, self.subject.display_name()),
            Err(e) => warn!("⚠️ 无法统计本地题目: {}", e),
        }

        print_final_stats(
            report.tasks_saved,
            report.tasks_parsed - report.tasks_saved,
            report.tasks_parsed,
            &self.config.output_log_file,
        );
        Ok(report)
    }

    /// 按答案表批量判题
    pub async fn check(&self) -> Result<Vec<CheckResponse>> {
        info!("\n📁 正在加载答案表: {}", self.config.answers_file);
        let sheet = load_answer_sheet(Path::new(&self.config.answers_file)).await?;

        let store = TaskStore::new(&self.config.data_dir);
        let mut items = Vec::with_capacity(sheet.answers.len());
        let mut missing = 0;

        for entry in sheet.answers {
            match resolve_entry(&store, self.subject, &entry).await? {
                Some(target) => items.push((target, entry.answer)),
                None => {
                    warn!("⚠️ 本地没有找到题目 {}，也没有 guid，跳过", entry.label());
                    missing += 1;
                }
            }
        }

        if items.is_empty() {
            warn!("⚠️ 没有可提交的答案，程序结束");
            return Ok(Vec::new());
        }

        let submitter = Submitter::new(self.client.clone());
        let responses = submitter.batch_check(&items).await;

        let results_path = Path::new(&self.config.data_dir).join(CHECK_RESULTS_FILE);
        let json = serde_json::to_string_pretty(&responses)?;
        tokio::fs::create_dir_all(&self.config.data_dir)
            .await
            .with_context(|| format!("无法创建目录: {}", self.config.data_dir))?;
        tokio::fs::write(&results_path, json)
            .await
            .with_context(|| format!("无法写入判题结果: {}", results_path.display()))?;
        info!("💾 判题结果已保存至: {}", results_path.display());

        let correct = responses.iter().filter(|r| r.is_correct()).count();
        print_final_stats(
            correct,
            responses.len() - correct + missing,
            responses.len() + missing,
            &self.config.output_log_file,
        );
        Ok(responses)
    }
}

/// 确定答案表中一行要判的题目
///
/// 先按 guid、再按题号在本地题库中查找；都找不到时，有 guid 就直接按 guid 提交，
/// 否则返回 None。
pub async fn resolve_entry(
    store: &TaskStore,
    subject: Subject,
    entry: &AnswerEntry,
) -> Result<Option<CheckTarget>, StoreError> {
    if let Some(guid) = &entry.guid {
        if let Some(task) = store.find_task(subject, guid).await? {
            return Ok(Some(CheckTarget::Task(task)));
        }
    }

    if let Some(display_id) = &entry.display_id {
        if let Some(task) = store.find_task_by_display_id(subject, display_id).await? {
            return Ok(Some(CheckTarget::Task(task)));
        }
    }

    Ok(entry.guid.as_ref().map(|guid| {
        info!("ℹ️ 本地没有题目 {}，按 guid 直接提交", guid);
        CheckTarget::Guid(guid.clone())
    }))
}
