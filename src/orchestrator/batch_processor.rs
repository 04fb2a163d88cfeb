//! 批量抓取编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **展开请求**：站点 × 关键词（站点在外层、关键词在内层）
//! 2. **提前校验**：所有组合的配置在第一次浏览器操作前全部校验
//! 3. **顺序执行**：同一时间只运行一个 (站点, 关键词)，独占浏览器会话
//! 4. **合并结果**：按组合顺序拼接每次运行的 CSV
//! 5. **下游流程**：对合并结果只调用一次
//!
//! 每次运行的输出位置由写入服务直接返回，不靠扫描目录推断。

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::config::SettleTimeouts;
use crate::error::{AppError, AppResult, BatchError};
use crate::infrastructure::BrowserSession;
use crate::models::PortalRegistry;
use crate::services::{merge_outputs, DownstreamPipeline, ResultSink};
use crate::utils::logging;
use crate::workflow::{PortalScraper, RunResult};

/// 批量请求：站点 × 关键词，共用同一个上限
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub sites: Vec<String>,
    pub keywords: Vec<String>,
    pub max_tenders: Option<usize>,
}

impl BatchRequest {
    pub fn new(sites: Vec<String>, keywords: Vec<String>, max_tenders: Option<usize>) -> Self {
        Self {
            sites,
            keywords,
            max_tenders,
        }
    }

    /// 按固定顺序展开所有组合
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.sites.iter().flat_map(move |site| {
            self.keywords
                .iter()
                .map(move |keyword| (site.as_str(), keyword.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.sites.len() * self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 已校验的一次运行
#[derive(Debug, Clone)]
pub struct PlannedRun {
    pub site: String,
    pub keyword: String,
    pub scraper: PortalScraper,
}

/// 校验并展开所有组合，不接触浏览器
pub fn plan_runs(
    registry: &PortalRegistry,
    request: &BatchRequest,
    timeouts: SettleTimeouts,
) -> AppResult<Vec<PlannedRun>> {
    request
        .pairs()
        .map(|(site, keyword)| plan_run(registry, site, keyword, request.max_tenders, timeouts))
        .collect()
}

fn plan_run(
    registry: &PortalRegistry,
    site: &str,
    keyword: &str,
    max_tenders: Option<usize>,
    timeouts: SettleTimeouts,
) -> AppResult<PlannedRun> {
    let config = registry.get(site)?.for_pair(keyword, max_tenders);
    let scraper = PortalScraper::new(site, &config, timeouts)?;
    Ok(PlannedRun {
        site: site.to_string(),
        keyword: keyword.to_string(),
        scraper,
    })
}

/// 批量 / 单次运行的结果
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// 每次运行的结果，按执行顺序
    pub runs: Vec<RunResult>,
    /// 交给下游流程的数据集（批量为合并文件，单次为该次运行的文件）
    pub dataset: PathBuf,
    /// 下游流程产物位置
    pub final_output: String,
}

impl BatchOutcome {
    pub fn total_records(&self) -> usize {
        self.runs.iter().map(|r| r.count).sum()
    }
}

/// 批量编排器
///
/// 持有浏览器会话、门户配置、结果写入服务和下游流程
pub struct BatchOrchestrator<S, K, P> {
    session: S,
    registry: PortalRegistry,
    sink: K,
    pipeline: P,
    timeouts: SettleTimeouts,
    merge_dir: PathBuf,
}

impl<S, K, P> BatchOrchestrator<S, K, P>
where
    S: BrowserSession,
    K: ResultSink,
    P: DownstreamPipeline,
{
    pub fn new(
        session: S,
        registry: PortalRegistry,
        sink: K,
        pipeline: P,
        timeouts: SettleTimeouts,
        merge_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            session,
            registry,
            sink,
            pipeline,
            timeouts,
            merge_dir: merge_dir.into(),
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// 运行全部组合 → 合并 → 下游流程（只一次）
    pub async fn run_batch(&self, request: &BatchRequest) -> AppResult<BatchOutcome> {
        let plan = plan_runs(&self.registry, request, self.timeouts)?;
        let total = plan.len();
        logging::log_batch_start(total, request);

        let mut runs = Vec::with_capacity(total);
        for (idx, planned) in plan.iter().enumerate() {
            logging::log_pair_start(idx + 1, total, &planned.site, &planned.keyword);
            runs.push(self.execute(planned).await?);
        }

        let outputs: Vec<PathBuf> = runs
            .iter()
            .filter(|run| run.count > 0)
            .map(|run| run.output.clone())
            .collect();

        if outputs.is_empty() {
            error!("❌ 所有组合均未抓取到数据");
            return Err(BatchError::EmptyBatch.into());
        }

        let merged = merge_outputs(&outputs, &self.merge_dir)?;
        let final_output = self.pipeline.run(&merged).await?;

        Ok(BatchOutcome {
            runs,
            dataset: merged,
            final_output,
        })
    }

    /// 运行单个组合，结果直接交给下游流程（不合并）
    pub async fn run_single(
        &self,
        site: &str,
        keyword: &str,
        max_tenders: Option<usize>,
    ) -> AppResult<BatchOutcome> {
        let planned = plan_run(&self.registry, site, keyword, max_tenders, self.timeouts)?;
        logging::log_pair_start(1, 1, site, keyword);

        let run = self.execute(&planned).await?;
        if run.count == 0 {
            warn!("[{}] ⚠️ '{}' 没有抓取到数据", site, keyword);
        }

        let final_output = self.pipeline.run(&run.output).await?;

        Ok(BatchOutcome {
            dataset: run.output.clone(),
            runs: vec![run],
            final_output,
        })
    }

    /// 执行一次运行，失败时带上是哪个组合
    async fn execute(&self, planned: &PlannedRun) -> AppResult<RunResult> {
        match planned.scraper.run(&self.session, &self.sink).await {
            Ok(run) => {
                info!(
                    "▶ [{} | {}] 完成: {} 条 → {}",
                    planned.site,
                    planned.keyword,
                    run.count,
                    run.output.display()
                );
                Ok(run)
            }
            Err(e) => {
                error!("❌ [{} | {}] 运行失败: {}", planned.site, planned.keyword, e);
                Err(AppError::Batch(BatchError::PairFailed {
                    site: planned.site.clone(),
                    keyword: planned.keyword.clone(),
                    source: Box::new(e),
                }))
            }
        }
    }
}
