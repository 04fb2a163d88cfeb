use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::normalize_cap;
use crate::error::{AppResult, ConfigError};

/// 门户类型（封闭集合，新门户通过新增变体接入）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScraperKind {
    Eprocure,
    TenderDetail,
    IndianTenders,
    TenderTiger,
}

impl ScraperKind {
    pub const ALL: [ScraperKind; 4] = [
        ScraperKind::Eprocure,
        ScraperKind::TenderDetail,
        ScraperKind::IndianTenders,
        ScraperKind::TenderTiger,
    ];

    /// 配置文件中使用的类型标签
    pub fn tag(&self) -> &'static str {
        match self {
            ScraperKind::Eprocure => "eprocure",
            ScraperKind::TenderDetail => "tenderdetail",
            ScraperKind::IndianTenders => "indiantenders",
            ScraperKind::TenderTiger => "tendertiger",
        }
    }
}

impl FromStr for ScraperKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        ScraperKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or(ConfigError::UnknownScraper { tag: s.to_string() })
    }
}

impl fmt::Display for ScraperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// 门户的元素选择器
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectorSet {
    pub keyword_input: String,
    pub search_button: String,
    pub next_page: String,
    pub tender_card: String,
    pub state: String,
    pub title: String,
    pub ref_id: String,
    pub deadline: String,
    pub value: String,
    pub detail_url: String,
    /// 只有部分门户展示城市
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// PDF 附件链接
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_links: Option<String>,
}

/// 单个门户的静态配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// 抓取器类型标签，见 [`ScraperKind`]
    pub scraper: String,
    pub base_url: String,
    pub start_url: String,
    pub selectors: SelectorSet,
    #[serde(default)]
    pub search_keywords: Vec<String>,
    /// 旧格式：单个关键词
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tenders: Option<usize>,
}

impl PortalConfig {
    /// 解析抓取器类型
    pub fn kind(&self) -> AppResult<ScraperKind> {
        Ok(self.scraper.parse()?)
    }

    /// 按配置顺序返回关键词，至少需要一个
    pub fn keywords(&self, portal: &str) -> AppResult<Vec<String>> {
        let keywords: Vec<String> = if !self.search_keywords.is_empty() {
            self.search_keywords.clone()
        } else {
            self.search_keyword.iter().cloned().collect()
        };

        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        if keywords.is_empty() {
            return Err(ConfigError::MissingKeywords {
                portal: portal.to_string(),
            }
            .into());
        }
        Ok(keywords)
    }

    /// 单条关键词 + 上限覆盖到静态配置上，得到一次运行用的配置
    pub fn for_pair(&self, keyword: &str, max_tenders: Option<usize>) -> Self {
        let mut cfg = self.clone();
        cfg.search_keyword = Some(keyword.to_string());
        cfg.search_keywords = vec![keyword.to_string()];
        cfg.max_tenders = max_tenders;
        cfg
    }

    /// 单次运行的条数上限
    pub fn cap(&self) -> Option<usize> {
        self.max_tenders.and_then(normalize_cap)
    }
}

/// 门户标识 → 门户配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortalRegistry {
    portals: BTreeMap<String, PortalConfig>,
}

impl PortalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, site: impl Into<String>, config: PortalConfig) {
        self.portals.insert(site.into(), config);
    }

    pub fn get(&self, site: &str) -> AppResult<&PortalConfig> {
        self.portals.get(site).ok_or_else(|| {
            ConfigError::UnknownPortal {
                site: site.to_string(),
            }
            .into()
        })
    }

    pub fn sites(&self) -> impl Iterator<Item = &str> {
        self.portals.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.portals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }
}
