//! # FIPI Bank
//!
//! FIPI 公开题库的题目抓取与答案判题工具
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `clients/` - 持有 HTTP 会话，只暴露请求能力
//! - `PortalClient` - 唯一的会话 owner：列表页、图片、判题接口
//! - `infrastructure/` - `TaskStore`，题目的磁盘布局
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个题目块或单个题目
//! - `extractor` / `classifier` - 题目块 → 基础字段 / 作答形式
//! - `formatter` - 答案 → 提交字符串
//! - `Submitter` - 提交并解释结果代码
//! - `subjects/` - 每个科目的解析钩子和判题钩子
//!
//! ### ③ 流程层（Workflow）
//! - `TaskFlow` - "一道题"的处理流程（图片本地化 → 保存）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/crawler` - 分页抓取与停止条件
//! - `orchestrator/app` - 应用生命周期与运行模式
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod subjects;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::PortalClient;
pub use config::{Config, RunMode};
pub use error::{AppError, AppResult};
pub use infrastructure::TaskStore;
pub use models::{AnswerBlock, AnswerInput, AnswerShape, CheckResponse, CheckResult, Subject, Task};
pub use orchestrator::{App, CrawlLimits, CrawlReport, Crawler, ListingSource};
pub use services::{Submitter, TaskParser};
pub use workflow::{ProcessResult, TaskFlow};
