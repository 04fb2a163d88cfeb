//! # Tender Scrape
//!
//! 驱动浏览器从多个招标门户抓取招标信息，去重、限量后合并，交给下游流程处理。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有浏览器会话，只暴露能力
//! - `BrowserSession` - 导航 / 填写 / 点击 / 查找元素 / 打开详情页
//! - `ChromeSession` - chromiumoxide 实现，主页面由 `JsExecutor` 独占
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `CsvSink` - 把一次运行的记录写成 CSV
//! - `merge_outputs` - 合并多次运行的 CSV
//! - `ConfiguredPipeline` - 调用下游流程
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个门户一次运行"的完整流程
//! - `RunState` - 运行状态（记录 + 去重键 + 上限）
//! - `PortalScraper` - 搜索 → 翻页 → 卡片 → 详情页 → 去重 → 上限
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 站点 × 关键词，合并后只调用一次下游流程
//!
//! ## 模块结构

pub mod app;
pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::{Config, SettleTimeouts};
pub use error::{AppError, AppResult};
pub use infrastructure::{BrowserSession, ChromeSession, PageElement, SecondaryPage};
pub use models::{PortalConfig, PortalRegistry, ScraperKind, TenderRecord};
pub use orchestrator::{BatchOrchestrator, BatchOutcome, BatchRequest};
pub use services::{CsvSink, DownstreamPipeline, ResultSink};
pub use workflow::{PortalScraper, RunResult, RunState};
