//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责分页调度和运行模式，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用主结构
//! - 管理应用生命周期（初始化、运行）
//! - 持有题库会话（PortalClient）
//! - 按运行模式分派：抓取 / 判题
//! - 输出全局统计信息
//!
//! ### `crawler` - 分页抓取器
//! - 逐页请求列表页（ListingSource）
//! - 每页交给 TaskParser，每道题交给 TaskFlow
//! - 判断停止条件，汇总统计
//!
//! ## 层次关系
//!
//! ```text
//! app (运行模式)
//!     ↓
//! crawler (处理 Vec<页>)
//!     ↓
//! workflow::TaskFlow (处理单个 Task)
//!     ↓
//! services (能力层：解析 / 格式化 / 提交)
//!     ↓
//! infrastructure (基础设施：TaskStore)
//! ```

pub mod app;
pub mod crawler;

// 重新导出主要类型
pub use app::{resolve_entry, App};
pub use crawler::{CrawlLimits, CrawlReport, Crawler, ListingSource};
