//! 题目文件存储 - 基础设施层
//!
//! 目录结构：
//!
//! ```text
//! <data_dir>/<科目>/<知识点>/<guid>/
//!     task.json
//!     task.md
//!     media/<图片>
//! ```
//!
//! 知识点目录取第一个 КЭС 代码的编号部分，`.` 和文件名非法字符替换为 `_`，
//! 没有代码时为 `unknown_kes`。

use crate::error::StoreError;
use crate::models::{Subject, Task};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

const TASK_JSON: &str = "task.json";
const TASK_MARKDOWN: &str = "task.md";
const MEDIA_DIR: &str = "media";
const UNKNOWN_TOPIC: &str = "unknown_kes";

/// 存储统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total: usize,
    pub by_subject: BTreeMap<String, usize>,
    pub by_topic: BTreeMap<String, usize>,
}

/// 题目文件存储
#[derive(Debug, Clone)]
pub struct TaskStore {
    base_dir: PathBuf,
}

impl TaskStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 题目所在目录，只由科目、第一个知识点和 guid 决定
    pub fn task_directory(&self, task: &Task) -> PathBuf {
        self.base_dir
            .join(task.subject.key())
            .join(topic_folder(task))
            .join(task.identifier())
    }

    /// 保存 task.json 和 task.md
    ///
    /// # 返回
    /// 返回题目目录
    pub async fn save_task(&self, task: &Task) -> Result<PathBuf, StoreError> {
        let dir = self.task_directory(task);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::write_failed(&dir, e))?;

        let json_path = dir.join(TASK_JSON);
        let json = task.to_json().map_err(|source| StoreError::Json {
            path: json_path.display().to_string(),
            source,
        })?;
        fs::write(&json_path, json)
            .await
            .map_err(|e| StoreError::write_failed(&json_path, e))?;

        let md_path = dir.join(TASK_MARKDOWN);
        fs::write(&md_path, task.to_markdown())
            .await
            .map_err(|e| StoreError::write_failed(&md_path, e))?;

        debug!("已保存题目 {} → {}", task.display_id, dir.display());
        Ok(dir)
    }

    /// 从题目目录读取 task.json
    pub async fn load_task(&self, dir: impl AsRef<Path>) -> Result<Task, StoreError> {
        let path = dir.as_ref().join(TASK_JSON);
        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::read_failed(&path, e))?;
        serde_json::from_str(&content).map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// 科目下所有包含 task.json 的题目目录，按路径排序
    pub async fn find_tasks_by_subject(&self, subject: Subject) -> Result<Vec<PathBuf>, StoreError> {
        let subject_dir = self.base_dir.join(subject.key());
        let mut found = Vec::new();

        for topic_dir in list_dirs(&subject_dir).await? {
            for task_dir in list_dirs(&topic_dir).await? {
                if fs::try_exists(task_dir.join(TASK_JSON)).await.unwrap_or(false) {
                    found.push(task_dir);
                }
            }
        }

        found.sort();
        Ok(found)
    }

    /// 按 guid 查找题目
    pub async fn find_task(&self, subject: Subject, identifier: &str) -> Result<Option<Task>, StoreError> {
        for dir in self.find_tasks_by_subject(subject).await? {
            if dir.file_name().and_then(|n| n.to_str()) == Some(identifier) {
                return self.load_task(&dir).await.map(Some);
            }
        }
        Ok(None)
    }

    /// 按页面题号查找题目
    ///
    /// 需要逐个读取 task.json，读不出来的题目记录警告后跳过。
    pub async fn find_task_by_display_id(
        &self,
        subject: Subject,
        display_id: &str,
    ) -> Result<Option<Task>, StoreError> {
        for dir in self.find_tasks_by_subject(subject).await? {
            match self.load_task(&dir).await {
                Ok(task) if task.display_id == display_id => return Ok(Some(task)),
                Ok(_) => {}
                Err(e) => warn!("⚠️ 跳过无法读取的题目: {}", e),
            }
        }
        Ok(None)
    }

    /// 统计已保存的题目
    ///
    /// # 参数
    /// - `subject`: 只统计某个科目；None 统计全部
    pub async fn statistics(&self, subject: Option<Subject>) -> Result<StoreStats, StoreError> {
        let subjects: Vec<Subject> = match subject {
            Some(subject) => vec![subject],
            None => Subject::ALL.to_vec(),
        };

        let mut stats = StoreStats::default();
        for subject in subjects {
            let dirs = self.find_tasks_by_subject(subject).await?;
            if dirs.is_empty() {
                continue;
            }
            stats.total += dirs.len();
            *stats.by_subject.entry(subject.key().to_string()).or_default() += dirs.len();

            for dir in &dirs {
                let topic = dir
                    .parent()
                    .and_then(Path::file_name)
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| UNKNOWN_TOPIC.to_string());
                *stats.by_topic.entry(topic).or_default() += 1;
            }
        }
        Ok(stats)
    }

    /// 保存一张图片到题目的 media 目录
    ///
    /// # 返回
    /// 返回相对题目目录的路径 `media/<文件名>`
    pub async fn save_image(&self, task: &Task, url: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let media_dir = self.task_directory(task).join(MEDIA_DIR);
        fs::create_dir_all(&media_dir)
            .await
            .map_err(|e| StoreError::write_failed(&media_dir, e))?;

        let filename = match image_file_name(url) {
            Some(name) => name.to_string(),
            None => format!("image_{}.png", count_entries(&media_dir).await),
        };

        let path = media_dir.join(&filename);
        fs::write(&path, bytes)
            .await
            .map_err(|e| StoreError::write_failed(&path, e))?;
        Ok(format!("{MEDIA_DIR}/{filename}"))
    }
}

/// 知识点目录名
pub fn topic_folder(task: &Task) -> String {
    match task.primary_topic() {
        Some(code) => code
            .chars()
            .map(|c| match c {
                '.' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                other => other,
            })
            .collect(),
        None => UNKNOWN_TOPIC.to_string(),
    }
}

/// URL 的最后一段可作文件名时返回它
fn image_file_name(url: &str) -> Option<&str> {
    let name = url.rsplit(['/', '\\']).next()?;
    if name.is_empty() || name.contains('?') || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

async fn list_dirs(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    if !fs::try_exists(dir).await.unwrap_or(false) {
        return Ok(Vec::new());
    }

    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| StoreError::read_failed(dir, e))?;
    let mut dirs = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StoreError::read_failed(dir, e))?
    {
        match entry.file_type().await {
            Ok(kind) if kind.is_dir() => dirs.push(entry.path()),
            Ok(_) => {}
            Err(e) => warn!("⚠️ 无法读取 {}: {}", entry.path().display(), e),
        }
    }
    Ok(dirs)
}

async fn count_entries(dir: &Path) -> usize {
    let Ok(mut entries) = fs::read_dir(dir).await else {
        return 0;
    };
    let mut count = 0;
    while let Ok(Some(_)) = entries.next_entry().await {
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerBlock, ExtractedFields};

    fn temp_store(name: &str) -> TaskStore {
        let dir = std::env::temp_dir().join(format!(
            "fipi_bank_store_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        TaskStore::new(dir)
    }

    fn task(identifier: &str, topics: &[&str]) -> Task {
        Task::new(
            ExtractedFields {
                identifier: identifier.to_string(),
                display_id: identifier.chars().take(8).collect(),
                question_text: "Найдите длину отрезка.".to_string(),
                question_markup: "<td class=\"cell_0\">Найдите длину отрезка.</td>".to_string(),
                image_references: vec!["docs/AC43/pic.png".to_string()],
                topic_codes: topics.iter().map(|s| s.to_string()).collect(),
            },
            Subject::MathProf,
            AnswerBlock::FreeText { unit_hint: None },
        )
    }

    #[test]
    fn directory_layout() {
        let store = TaskStore::new("data");
        let with_topic = task("AAAA1111", &["5.1 Треугольник", "1.1 Алгебра"]);
        assert_eq!(
            store.task_directory(&with_topic),
            Path::new("data").join("math_prof").join("5_1").join("AAAA1111")
        );

        let without_topic = task("BBBB2222", &[]);
        assert_eq!(
            store.task_directory(&without_topic),
            Path::new("data").join("math_prof").join("unknown_kes").join("BBBB2222")
        );
    }

    #[test]
    fn topic_folder_folds_unsafe_characters() {
        assert_eq!(topic_folder(&task("X", &["2.1/3 Формулы"])), "2_1_3");
        assert_eq!(topic_folder(&task("X", &["a:b*c?"])), "a_b_c_");
    }

    #[test]
    fn image_names() {
        assert_eq!(image_file_name("docs/AC43/pic.png"), Some("pic.png"));
        assert_eq!(image_file_name("docs/AC43/"), None);
        assert_eq!(image_file_name("show.php?id=5"), None);
    }

    #[tokio::test]
    async fn save_load_and_find() {
        let store = temp_store("save_load");
        let first = task("AAAA1111", &["5.1 Треугольник"]);
        let second = task("BBBB2222", &[]);

        let dir = store.save_task(&first).await.unwrap();
        store.save_task(&second).await.unwrap();

        assert!(dir.join("task.md").exists());
        assert_eq!(store.load_task(&dir).await.unwrap(), first);

        let found = store.find_task(Subject::MathProf, "BBBB2222").await.unwrap();
        assert_eq!(found, Some(second));
        assert_eq!(store.find_task(Subject::MathProf, "CCCC").await.unwrap(), None);
        assert!(store.find_tasks_by_subject(Subject::Physics).await.unwrap().is_empty());

        let by_display = store
            .find_task_by_display_id(Subject::MathProf, "AAAA1111")
            .await
            .unwrap();
        assert_eq!(by_display, Some(first.clone()));
        assert_eq!(
            store.find_task_by_display_id(Subject::MathProf, "ZZZZ").await.unwrap(),
            None
        );

        let stats = store.statistics(None).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_subject.get("math_prof"), Some(&2));
        assert_eq!(stats.by_topic.get("5_1"), Some(&1));
        assert_eq!(stats.by_topic.get("unknown_kes"), Some(&1));

        let _ = std::fs::remove_dir_all(store.base_dir());
    }

    #[tokio::test]
    async fn images_fall_back_to_numbered_names() {
        let store = temp_store("images");
        let task = task("AAAA1111", &[]);

        let named = store.save_image(&task, "docs/AC43/pic.png", b"png").await.unwrap();
        assert_eq!(named, "media/pic.png");

        let numbered = store.save_image(&task, "show.php?id=5", b"png").await.unwrap();
        assert_eq!(numbered, "media/image_1.png");
        assert!(store.task_directory(&task).join("media/image_1.png").exists());

        let _ = std::fs::remove_dir_all(store.base_dir());
    }
}
