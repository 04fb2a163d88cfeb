//! 门户抓取流程 - 流程层
//!
//! 一个门户、一次运行的完整流程：
//! 1. 每个关键词前检查上限
//! 2. 重新打开搜索入口页
//! 3. 填写关键词 → 提交 → 固定等待
//! 4. 逐页抓取卡片（详情页 → 去重 → 上限）
//! 5. 找"下一页"，没有就结束该关键词
//! 6. 全部结束后交给结果写入服务

use std::path::PathBuf;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::SettleTimeouts;
use crate::error::{AppResult, ScrapeError};
use crate::infrastructure::{BrowserSession, SecondaryPage};
use crate::models::{crawl_timestamp, PortalConfig, ScraperKind, TenderRecord};
use crate::services::ResultSink;
use crate::utils::logging::truncate_text;
use crate::workflow::card::{extract_card, CardProfile};
use crate::workflow::run_state::{Admission, RunState, ScrapePhase};

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub site: String,
    /// 结果文件位置（由写入服务直接返回）
    pub output: PathBuf,
    pub count: usize,
}

/// 单页抓取结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    /// 没有卡片
    Empty,
    /// 处理完本页全部卡片
    Scraped(usize),
    /// 本页中途达到上限
    CapReached,
}

/// 门户抓取器
///
/// - 一个门户、一次运行一个实例
/// - 不持有浏览器，运行时借用会话
/// - 运行状态在 [`RunState`] 中显式传递
#[derive(Debug, Clone)]
pub struct PortalScraper {
    site: String,
    kind: ScraperKind,
    profile: CardProfile,
    config: PortalConfig,
    keywords: Vec<String>,
    cap: Option<usize>,
    timeouts: SettleTimeouts,
}

impl PortalScraper {
    /// 校验配置并创建抓取器：未知类型或缺少关键词都是配置错误
    pub fn new(site: &str, config: &PortalConfig, timeouts: SettleTimeouts) -> AppResult<Self> {
        let kind = config.kind()?;
        let keywords = config.keywords(site)?;

        Ok(Self {
            site: site.to_string(),
            kind,
            profile: CardProfile::for_kind(kind),
            config: config.clone(),
            keywords,
            cap: config.cap(),
            timeouts,
        })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn cap(&self) -> Option<usize> {
        self.cap
    }

    /// 完整运行：抓取全部关键词后写入结果
    ///
    /// 只有抓取循环正常结束才会写入；中途的致命错误不会留下部分结果。
    pub async fn run<S, K>(&self, session: &S, sink: &K) -> AppResult<RunResult>
    where
        S: BrowserSession,
        K: ResultSink,
    {
        info!("\n=== [{}] 运行 {} 抓取器 ===", self.site, self.kind);

        let state = self.scrape(session).await?;
        let records = state.into_records();
        let output = sink.save(&records, &self.site)?;

        info!(
            "[{}] ✓ 已保存 {} 条招标 → {}",
            self.site,
            records.len(),
            output.display()
        );

        Ok(RunResult {
            site: self.site.clone(),
            output,
            count: records.len(),
        })
    }

    /// 抓取循环，返回累积的运行状态
    pub async fn scrape<S: BrowserSession>(&self, session: &S) -> AppResult<RunState> {
        let mut state = RunState::new(self.cap);

        for keyword in &self.keywords {
            if state.limit_reached() {
                info!("[{}] 🛑 已达上限 ({})，不再处理后续关键词", self.site, state.len());
                break;
            }

            info!("[{}] 🔎 搜索关键词: {}", self.site, keyword);
            self.open_site(session, &mut state).await?;
            self.search(session, keyword, &mut state).await?;
            self.scrape_all_pages(session, keyword, &mut state).await?;
        }

        state.enter(ScrapePhase::Done);
        Ok(state)
    }

    /// 打开搜索入口页（每个关键词都重新打开）
    async fn open_site<S: BrowserSession>(&self, session: &S, state: &mut RunState) -> AppResult<()> {
        let url = &self.config.start_url;
        debug!("[{}] 打开 {}", self.site, url);
        session.navigate(url, self.timeouts.navigation).await?;
        session.wait_settled(self.timeouts.navigation).await?;
        state.enter(ScrapePhase::SiteOpened);
        Ok(())
    }

    /// 清空 → 填写 → 提交 → 固定等待前端渲染
    async fn search<S: BrowserSession>(
        &self,
        session: &S,
        keyword: &str,
        state: &mut RunState,
    ) -> AppResult<()> {
        let selectors = &self.config.selectors;
        session.fill(&selectors.keyword_input, "").await?;
        session.fill(&selectors.keyword_input, keyword).await?;
        session.click(&selectors.search_button).await?;
        sleep(self.timeouts.after_search).await;
        state.enter(ScrapePhase::Searched);
        Ok(())
    }

    async fn scrape_all_pages<S: BrowserSession>(
        &self,
        session: &S,
        keyword: &str,
        state: &mut RunState,
    ) -> AppResult<()> {
        let mut page_no = 1;

        loop {
            info!("[{}] 📄 抓取第 {} 页 ('{}')", self.site, page_no, keyword);

            match self.scrape_one_page(session, keyword, state).await? {
                PageOutcome::Empty => {
                    info!("[{}] 第 {} 页没有结果", self.site, page_no);
                    break;
                }
                PageOutcome::CapReached => {
                    info!("[{}] 🛑 已达上限 ({})，停止翻页", self.site, state.len());
                    break;
                }
                PageOutcome::Scraped(count) => {
                    debug!("[{}] 第 {} 页处理 {} 张卡片，累计 {} 条", self.site, page_no, count, state.len());
                }
            }

            // 刚好在页尾达到上限时不再翻页
            if state.limit_reached() {
                info!("[{}] 🛑 已达上限 ({})，停止翻页", self.site, state.len());
                break;
            }

            if !self.goto_next_page(session).await {
                debug!("[{}] 没有下一页", self.site);
                break;
            }

            state.enter(ScrapePhase::NextPage);
            page_no += 1;
        }

        Ok(())
    }

    /// 下一页按钮不存在、不可见或点击失败都视为翻页结束
    async fn goto_next_page<S: BrowserSession>(&self, session: &S) -> bool {
        let next = &self.config.selectors.next_page;

        match session.is_visible(next).await {
            Ok(true) => {}
            Ok(false) => return false,
            Err(e) => {
                debug!("[{}] 检查下一页失败: {}", self.site, e);
                return false;
            }
        }

        if let Err(e) = session.click(next).await {
            warn!("[{}] ⚠️ 点击下一页失败: {}", self.site, e);
            return false;
        }

        sleep(self.timeouts.after_next_page).await;
        true
    }

    async fn scrape_one_page<S: BrowserSession>(
        &self,
        session: &S,
        keyword: &str,
        state: &mut RunState,
    ) -> AppResult<PageOutcome> {
        let cards = session.locate_all(&self.config.selectors.tender_card).await?;
        if cards.is_empty() {
            return Ok(PageOutcome::Empty);
        }

        for (index, card) in cards.iter().enumerate() {
            if state.limit_reached() {
                state.enter(ScrapePhase::PageScraped);
                return Ok(PageOutcome::CapReached);
            }

            let mut record = match self.parse_card(card, keyword).await {
                Ok(record) => record,
                Err(e) => {
                    warn!(
                        "[{}] {}",
                        self.site,
                        ScrapeError::CardParseFailed {
                            index,
                            reason: e.to_string()
                        }
                    );
                    continue;
                }
            };

            // 已见过的卡片不再打开详情页
            if let Some(key) = record.identity_key() {
                if state.is_seen(key) {
                    debug!("[{}] 跳过重复: {}", self.site, key);
                    continue;
                }
            }

            record.description = self.fetch_detail(session, &record.detail_url).await;
            let preview = truncate_text(&record.title, 60);

            match state.admit(record) {
                Admission::Added => debug!("[{}] + {}", self.site, preview),
                Admission::Duplicate => debug!("[{}] 跳过重复卡片 {}", self.site, index),
                Admission::Unidentified => warn!(
                    "[{}] {}",
                    self.site,
                    ScrapeError::CardParseFailed {
                        index,
                        reason: "编号和详情页地址均为空".to_string()
                    }
                ),
                Admission::CapReached => {
                    state.enter(ScrapePhase::PageScraped);
                    return Ok(PageOutcome::CapReached);
                }
            }
        }

        state.enter(ScrapePhase::PageScraped);
        Ok(PageOutcome::Scraped(cards.len()))
    }

    /// 读取卡片字段，组装成记录（描述稍后补上）
    async fn parse_card<E>(&self, card: &E, keyword: &str) -> AppResult<TenderRecord>
    where
        E: crate::infrastructure::PageElement,
    {
        let fields = extract_card(card, &self.config.selectors, &self.profile, &self.config.base_url).await?;

        Ok(TenderRecord {
            portal: self.site.clone(),
            reference_number: fields.reference_number,
            title: fields.title,
            description: String::new(),
            tender_value: fields.tender_value,
            state: fields.state,
            city: fields.city,
            closing_date: fields.closing_date,
            detail_url: fields.detail_url,
            pdf_urls: fields.pdf_urls,
            searched_keyword: keyword.to_string(),
            crawled_at: crawl_timestamp(),
        })
    }

    /// 在次级页面中读取详情页全文
    ///
    /// 任何失败都记为空描述；次级页面无论成败都会关闭。
    async fn fetch_detail<S: BrowserSession>(&self, session: &S, url: &str) -> String {
        if url.is_empty() {
            return String::new();
        }

        let page = match session.open_secondary_page().await {
            Ok(page) => page,
            Err(e) => {
                self.log_detail_failure(url, &e);
                return String::new();
            }
        };

        let text = self.read_detail(&page, url).await;

        if let Err(e) = page.close().await {
            debug!("[{}] 关闭详情页失败: {}", self.site, e);
        }

        match text {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                self.log_detail_failure(url, &e);
                String::new()
            }
        }
    }

    async fn read_detail<P: SecondaryPage>(&self, page: &P, url: &str) -> AppResult<String> {
        page.navigate(url, self.timeouts.navigation).await?;
        page.wait_settled(self.timeouts.navigation).await?;
        page.read_text("body").await
    }

    fn log_detail_failure(&self, url: &str, err: &dyn std::fmt::Display) {
        warn!(
            "[{}] ⚠️ {}",
            self.site,
            ScrapeError::DetailFetchFailed {
                url: url.to_string(),
                reason: err.to_string()
            }
        );
    }
}
