//! 测试用的脚本化浏览器会话
//!
//! 结果按 (入口页, 关键词) 预先写好，每页是一组卡片；
//! 点击搜索按钮后回到第 1 页，点击下一页翻到下一组。

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use tender_scrape::error::AppResult;
use tender_scrape::models::{PortalConfig, SelectorSet};
use tender_scrape::services::DownstreamPipeline;
use tender_scrape::{AppError, BrowserSession, PageElement, SecondaryPage};

pub const KEYWORD_INPUT: &str = "#keyword";
pub const SEARCH_BUTTON: &str = "#search";
pub const NEXT_PAGE: &str = ".pager .next";
pub const CARD: &str = ".tender-card";
pub const STATE: &str = ".state";
pub const TITLE: &str = ".title";
pub const REF_ID: &str = ".ref";
pub const DEADLINE: &str = ".deadline";
pub const VALUE: &str = ".value";
pub const DETAIL: &str = "a.detail";

pub fn selectors() -> SelectorSet {
    SelectorSet {
        keyword_input: KEYWORD_INPUT.to_string(),
        search_button: SEARCH_BUTTON.to_string(),
        next_page: NEXT_PAGE.to_string(),
        tender_card: CARD.to_string(),
        state: STATE.to_string(),
        title: TITLE.to_string(),
        ref_id: REF_ID.to_string(),
        deadline: DEADLINE.to_string(),
        value: VALUE.to_string(),
        detail_url: DETAIL.to_string(),
        city: None,
        pdf_links: None,
    }
}

/// 门户配置：入口页为 `https://<site>.test/search`
pub fn portal(site: &str, scraper: &str, keywords: &[&str], cap: Option<usize>) -> PortalConfig {
    PortalConfig {
        scraper: scraper.to_string(),
        base_url: format!("https://{}.test", site),
        start_url: start_url(site),
        selectors: selectors(),
        search_keywords: keywords.iter().map(|k| k.to_string()).collect(),
        search_keyword: None,
        max_tenders: cap,
    }
}

pub fn start_url(site: &str) -> String {
    format!("https://{}.test/search", site)
}

pub fn detail_url(site: &str, id: &str) -> String {
    format!("https://{}.test/tender/{}", site, id)
}

#[derive(Debug, Clone, Default)]
pub struct FakeCard {
    fields: HashMap<String, String>,
    href: Option<String>,
    broken: bool,
}

impl FakeCard {
    /// 一张 indiantenders 风格的卡片
    pub fn tender(site: &str, id: &str) -> Self {
        let mut fields = HashMap::new();
        fields.insert(STATE.to_string(), "State: Kerala".to_string());
        fields.insert(TITLE.to_string(), format!("  Tender {}  ", id));
        fields.insert(REF_ID.to_string(), format!("Ref ID: {}", id));
        fields.insert(DEADLINE.to_string(), "Deadline: 2026-11-30".to_string());
        fields.insert(VALUE.to_string(), "₹ 12,00,000".to_string());
        Self {
            fields,
            href: Some(detail_url(site, id)),
            broken: false,
        }
    }

    /// 字段读取会失败的卡片
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Default::default()
        }
    }

    pub fn with_field(mut self, selector: &str, text: &str) -> Self {
        self.fields.insert(selector.to_string(), text.to_string());
        self
    }

    pub fn with_href(mut self, href: Option<&str>) -> Self {
        self.href = href.map(str::to_string);
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeLog {
    pub navigations: Vec<String>,
    pub searches: Vec<String>,
    pub next_clicks: usize,
    pub details_opened: usize,
    pub details_closed: usize,
    pub detail_urls: Vec<String>,
}

#[derive(Debug, Default)]
struct Cursor {
    site: Option<String>,
    input: String,
    keyword: Option<String>,
    page: usize,
}

#[derive(Default)]
struct Inner {
    results: HashMap<(String, String), Vec<Vec<FakeCard>>>,
    details: HashMap<String, String>,
    unreachable: HashSet<String>,
    hide_next: bool,
    cursor: RefCell<Cursor>,
    log: RefCell<FakeLog>,
}

#[derive(Clone)]
pub struct FakeSession {
    inner: Rc<Inner>,
}

#[derive(Default)]
pub struct FakeSessionBuilder {
    inner: Inner,
}

impl FakeSessionBuilder {
    /// 某站点某关键词的结果页
    pub fn pages(mut self, site: &str, keyword: &str, pages: Vec<Vec<FakeCard>>) -> Self {
        self.inner
            .results
            .insert((start_url(site), keyword.to_string()), pages);
        self
    }

    /// 详情页正文；未登记的详情页加载失败
    pub fn detail(mut self, url: &str, body: &str) -> Self {
        self.inner.details.insert(url.to_string(), body.to_string());
        self
    }

    pub fn unreachable(mut self, url: &str) -> Self {
        self.inner.unreachable.insert(url.to_string());
        self
    }

    /// 下一页按钮始终不可见
    pub fn hide_next(mut self) -> Self {
        self.inner.hide_next = true;
        self
    }

    pub fn build(self) -> FakeSession {
        FakeSession {
            inner: Rc::new(self.inner),
        }
    }
}

impl FakeSession {
    pub fn builder() -> FakeSessionBuilder {
        FakeSessionBuilder::default()
    }

    pub fn log(&self) -> std::cell::Ref<'_, FakeLog> {
        self.inner.log.borrow()
    }

    fn current_pages(&self) -> Option<&Vec<Vec<FakeCard>>> {
        let cursor = self.inner.cursor.borrow();
        let key = (cursor.site.clone()?, cursor.keyword.clone()?);
        self.inner.results.get(&key)
    }
}

impl BrowserSession for FakeSession {
    type Element = FakeElement;
    type Secondary = FakeDetail;

    async fn navigate(&self, url: &str, _timeout: Duration) -> AppResult<()> {
        self.inner.log.borrow_mut().navigations.push(url.to_string());
        if self.inner.unreachable.contains(url) {
            return Err(AppError::navigation_failed(url, "net::ERR_NAME_NOT_RESOLVED"));
        }
        let mut cursor = self.inner.cursor.borrow_mut();
        cursor.site = Some(url.to_string());
        cursor.keyword = None;
        cursor.page = 0;
        Ok(())
    }

    async fn wait_settled(&self, _timeout: Duration) -> AppResult<()> {
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> AppResult<()> {
        if selector != KEYWORD_INPUT {
            return Err(AppError::element_not_found(selector));
        }
        self.inner.cursor.borrow_mut().input = text.to_string();
        Ok(())
    }

    async fn click(&self, selector: &str) -> AppResult<()> {
        let mut cursor = self.inner.cursor.borrow_mut();
        match selector {
            SEARCH_BUTTON => {
                cursor.keyword = Some(cursor.input.clone());
                cursor.page = 0;
                self.inner.log.borrow_mut().searches.push(cursor.input.clone());
                Ok(())
            }
            NEXT_PAGE => {
                cursor.page += 1;
                self.inner.log.borrow_mut().next_clicks += 1;
                Ok(())
            }
            other => Err(AppError::element_not_found(other)),
        }
    }

    async fn locate_all(&self, selector: &str) -> AppResult<Vec<FakeElement>> {
        if selector != CARD {
            return Ok(Vec::new());
        }
        let page = self.inner.cursor.borrow().page;
        Ok(self
            .current_pages()
            .and_then(|pages| pages.get(page))
            .map(|cards| cards.iter().cloned().map(FakeElement).collect())
            .unwrap_or_default())
    }

    async fn is_visible(&self, selector: &str) -> AppResult<bool> {
        if selector != NEXT_PAGE || self.inner.hide_next {
            return Ok(false);
        }
        let page = self.inner.cursor.borrow().page;
        Ok(self
            .current_pages()
            .map(|pages| page + 1 < pages.len())
            .unwrap_or(false))
    }

    async fn open_secondary_page(&self) -> AppResult<FakeDetail> {
        self.inner.log.borrow_mut().details_opened += 1;
        Ok(FakeDetail {
            inner: Rc::clone(&self.inner),
            url: RefCell::new(None),
        })
    }
}

pub struct FakeElement(FakeCard);

impl PageElement for FakeElement {
    async fn read_text(&self, selector: &str) -> AppResult<String> {
        if self.0.broken {
            return Err(AppError::element_not_found(selector));
        }
        self.0
            .fields
            .get(selector)
            .cloned()
            .ok_or_else(|| AppError::element_not_found(selector))
    }

    async fn read_attribute(&self, selector: &str, _name: &str) -> AppResult<Option<String>> {
        if self.0.broken || selector != DETAIL {
            return Err(AppError::element_not_found(selector));
        }
        Ok(self.0.href.clone())
    }

    async fn read_all_attributes(&self, _selector: &str, _name: &str) -> AppResult<Vec<String>> {
        Ok(Vec::new())
    }
}

pub struct FakeDetail {
    inner: Rc<Inner>,
    url: RefCell<Option<String>>,
}

impl SecondaryPage for FakeDetail {
    async fn navigate(&self, url: &str, _timeout: Duration) -> AppResult<()> {
        self.inner.log.borrow_mut().detail_urls.push(url.to_string());
        if !self.inner.details.contains_key(url) {
            return Err(AppError::navigation_failed(url, "timeout"));
        }
        *self.url.borrow_mut() = Some(url.to_string());
        Ok(())
    }

    async fn wait_settled(&self, _timeout: Duration) -> AppResult<()> {
        Ok(())
    }

    async fn read_text(&self, selector: &str) -> AppResult<String> {
        let url = self.url.borrow().clone();
        url.and_then(|u| self.inner.details.get(&u).cloned())
            .ok_or_else(|| AppError::element_not_found(selector))
    }

    async fn close(self) -> AppResult<()> {
        self.inner.log.borrow_mut().details_closed += 1;
        Ok(())
    }
}

/// 记录调用次数的下游流程；克隆体共享同一份调用记录
#[derive(Clone, Default)]
pub struct RecordingPipeline {
    pub calls: Rc<RefCell<Vec<PathBuf>>>,
}

impl DownstreamPipeline for RecordingPipeline {
    async fn run(&self, dataset: &Path) -> AppResult<String> {
        self.calls.borrow_mut().push(dataset.to_path_buf());
        Ok(format!("{}.final", dataset.display()))
    }
}

/// 每个测试独立的输出目录
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tender_it_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

pub fn csv_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("csv"))
        .collect();
    files.sort();
    files
}
