//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一道题"解析之后的处理流程
//!
//! 流程顺序：
//! 1. 下载图片（可关闭），成功的图片改为本地路径
//! 2. 保存 task.json / task.md

use crate::error::StoreError;
use crate::infrastructure::TaskStore;
use crate::models::Task;
use crate::orchestrator::ListingSource;
use std::path::PathBuf;
use tracing::{debug, warn};

/// 单题处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// 题目目录
    pub directory: PathBuf,
    pub images_saved: usize,
    pub images_failed: usize,
}

/// 单题处理流程
///
/// - 不持有网络资源，图片来源由调用方传入
/// - 图片下载失败只记录日志，不影响题目保存
pub struct TaskFlow {
    store: TaskStore,
    download_images: bool,
}

impl TaskFlow {
    pub fn new(store: TaskStore, download_images: bool) -> Self {
        Self {
            store,
            download_images,
        }
    }

    /// 处理一道题：本地化图片，然后保存
    pub async fn run<S: ListingSource>(
        &self,
        source: &S,
        mut task: Task,
    ) -> Result<ProcessResult, StoreError> {
        let mut images_saved = 0;
        let mut images_failed = 0;

        if self.download_images && !task.image_references.is_empty() {
            let mut local_paths = Vec::with_capacity(task.image_references.len());
            for url in &task.image_references {
                match self.download_image(source, &task, url).await {
                    Ok(path) => local_paths.push(path),
                    Err(e) => {
                        warn!("⚠️ 题目 {} 图片下载失败 {}: {}", task.display_id, url, e);
                        images_failed += 1;
                    }
                }
            }
            images_saved = local_paths.len();
            task.localize_images(local_paths);
        }

        let directory = self.store.save_task(&task).await?;
        debug!(
            "✓ 题目 {} 已保存，图片 {} 成功 / {} 失败",
            task.display_id, images_saved, images_failed
        );

        Ok(ProcessResult {
            directory,
            images_saved,
            images_failed,
        })
    }

    async fn download_image<S: ListingSource>(
        &self,
        source: &S,
        task: &Task,
        url: &str,
    ) -> anyhow::Result<String> {
        let bytes = source.fetch_image(url).await?;
        let path = self.store.save_image(task, url, &bytes).await?;
        Ok(path)
    }
}
