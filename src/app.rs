use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::browser;
use crate::config::Config;
use crate::infrastructure::ChromeSession;
use crate::models::{load_portal_registry, PortalRegistry};
use crate::orchestrator::{plan_runs, BatchOrchestrator, BatchOutcome, BatchRequest};
use crate::services::{ConfiguredPipeline, CsvSink};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    request: BatchRequest,
    orchestrator: BatchOrchestrator<ChromeSession, CsvSink, ConfiguredPipeline>,
}

impl App {
    /// 初始化应用：校验配置 → 启动 / 连接浏览器
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(&config);

        let registry = load_portal_registry(Path::new(&config.portals_file))
            .await
            .with_context(|| format!("无法加载门户配置: {}", config.portals_file))?;

        let request = build_request(&config, &registry)?;

        // 配置错误在任何浏览器操作之前暴露
        plan_runs(&registry, &request, config.settle_timeouts())?;

        let (browser, page) = if config.headless {
            browser::launch_headless_browser(config.chrome_executable.as_deref()).await?
        } else {
            let start_url = request
                .sites
                .first()
                .and_then(|site| registry.get(site).ok())
                .map(|portal| portal.start_url.clone());
            browser::connect_to_browser_and_page(config.browser_debug_port, start_url.as_deref())
                .await?
        };

        let orchestrator = BatchOrchestrator::new(
            ChromeSession::new(browser, page),
            registry,
            CsvSink::new(&config.output_dir),
            ConfiguredPipeline::from_config(config.pipeline_command.as_deref()),
            config.settle_timeouts(),
            &config.output_dir,
        );

        Ok(Self {
            config,
            request,
            orchestrator,
        })
    }

    /// 运行：单个组合走 run_single，多个组合走 run_batch
    pub async fn run(&self) -> Result<BatchOutcome> {
        let outcome = if self.request.len() == 1 {
            let site = &self.request.sites[0];
            let keyword = &self.request.keywords[0];
            self.orchestrator
                .run_single(site, keyword, self.request.max_tenders)
                .await?
        } else {
            self.orchestrator.run_batch(&self.request).await?
        };

        for run in &outcome.runs {
            logging::append_log_line(
                &self.config.output_log_file,
                &format!("{} | {} 条 | {}", run.site, run.count, run.output.display()),
            )?;
        }
        logging::append_log_line(
            &self.config.output_log_file,
            &format!("最终产物: {}", outcome.final_output),
        )?;

        logging::print_final_stats(&outcome, &self.config.output_log_file);
        Ok(outcome)
    }
}

/// 站点 × 关键词；未指定关键词时报错
fn build_request(config: &Config, registry: &PortalRegistry) -> Result<BatchRequest> {
    if config.sites.is_empty() {
        bail!("未指定任何站点 (SITES)，可用: {}", registry.sites().collect::<Vec<_>>().join(", "));
    }
    if config.keywords.is_empty() {
        bail!("未指定任何关键词 (KEYWORDS)");
    }

    info!("✓ 共 {} 个组合待抓取", config.sites.len() * config.keywords.len());
    Ok(BatchRequest::new(
        config.sites.clone(),
        config.keywords.clone(),
        config.max_tenders,
    ))
}
