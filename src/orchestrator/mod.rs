//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 站点 × 关键词)
//!     ↓
//! workflow::PortalScraper (处理单个门户的一次运行)
//!     ↓
//! services (能力层：csv / merge / pipeline)
//!     ↓
//! infrastructure (基础设施：BrowserSession)
//! ```
//!
//! 只有编排层持有浏览器会话；抓取器在运行期间借用它。

pub mod batch_processor;

pub use batch_processor::{plan_runs, BatchOrchestrator, BatchOutcome, BatchRequest, PlannedRun};
