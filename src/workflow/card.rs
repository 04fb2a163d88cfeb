//! 招标卡片字段提取
//!
//! 不同门户在字段前加了不同的标签（如 "Ref ID:"），金额带货币符号，
//! 这里按门户类型统一去掉。

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::error::AppResult;
use crate::infrastructure::PageElement;
use crate::models::{ScraperKind, SelectorSet};

/// 卡片上带标签前缀的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    State,
    Ref,
    Deadline,
    Value,
    City,
}

/// 门户类型对应的标签前缀
///
/// 先匹配本类型的标签，再回退到所有已知类型的同字段标签，
/// 门户改版换了标签写法时仍能去掉前缀。
#[derive(Debug, Clone, Copy)]
pub struct CardProfile {
    pub state_labels: &'static [&'static str],
    pub ref_labels: &'static [&'static str],
    pub deadline_labels: &'static [&'static str],
    pub value_labels: &'static [&'static str],
    pub city_labels: &'static [&'static str],
}

impl CardProfile {
    pub fn for_kind(kind: ScraperKind) -> Self {
        match kind {
            ScraperKind::IndianTenders => CardProfile {
                state_labels: &["State:"],
                ref_labels: &["Ref ID:"],
                deadline_labels: &["Deadline:"],
                value_labels: &["Value:"],
                city_labels: &["City:"],
            },
            ScraperKind::Eprocure => CardProfile {
                state_labels: &["State:", "Organisation Chain:"],
                ref_labels: &["Tender ID:", "Ref No:"],
                deadline_labels: &["Bid Submission End Date:", "Closing Date:"],
                value_labels: &["Tender Value:", "Value:"],
                city_labels: &["Location:", "City:"],
            },
            ScraperKind::TenderDetail => CardProfile {
                state_labels: &["State:", "Location:"],
                ref_labels: &["TDR No:", "TDR:"],
                deadline_labels: &["Due Date:", "Closing Date:"],
                value_labels: &["Tender Value:", "Value:"],
                city_labels: &["City:"],
            },
            ScraperKind::TenderTiger => CardProfile {
                state_labels: &["Location:", "State:"],
                ref_labels: &["TTID:", "Tender ID:"],
                deadline_labels: &["Closing Date:", "Due Date:"],
                value_labels: &["Estimated Cost:", "Value:"],
                city_labels: &["City:"],
            },
        }
    }

    pub fn labels(&self, field: CardField) -> &'static [&'static str] {
        match field {
            CardField::State => self.state_labels,
            CardField::Ref => self.ref_labels,
            CardField::Deadline => self.deadline_labels,
            CardField::Value => self.value_labels,
            CardField::City => self.city_labels,
        }
    }

    /// 去掉字段的标签前缀并 trim
    pub fn strip(&self, text: &str, field: CardField) -> String {
        match_label(text, self.labels(field))
            .or_else(|| {
                ScraperKind::ALL
                    .into_iter()
                    .find_map(|kind| match_label(text, CardProfile::for_kind(kind).labels(field)))
            })
            .unwrap_or_else(|| text.trim().to_string())
    }
}

/// 从卡片中提取出的字段（尚未包含详情页描述）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFields {
    pub state: String,
    pub title: String,
    pub reference_number: String,
    pub closing_date: String,
    pub tender_value: String,
    pub detail_url: String,
    pub city: String,
    pub pdf_urls: String,
}

/// 读取一张卡片的全部字段，任一必需字段缺失即返回错误
pub async fn extract_card<E: PageElement>(
    card: &E,
    selectors: &SelectorSet,
    profile: &CardProfile,
    base_url: &str,
) -> AppResult<CardFields> {
    let state = profile.strip(&card.read_text(&selectors.state).await?, CardField::State);
    let title = card.read_text(&selectors.title).await?.trim().to_string();
    let reference_number = profile.strip(&card.read_text(&selectors.ref_id).await?, CardField::Ref);
    let closing_date = profile.strip(&card.read_text(&selectors.deadline).await?, CardField::Deadline);
    let tender_value = clean_value(&profile.strip(
        &card.read_text(&selectors.value).await?,
        CardField::Value,
    ));
    let detail_url = card
        .read_attribute(&selectors.detail_url, "href")
        .await?
        .map(|href| resolve_detail_url(base_url, &href))
        .unwrap_or_default();

    let city = match &selectors.city {
        Some(sel) => profile.strip(&card.read_text(sel).await?, CardField::City),
        None => String::new(),
    };
    let pdf_urls = match &selectors.pdf_links {
        Some(sel) => card
            .read_all_attributes(sel, "href")
            .await?
            .iter()
            .map(|href| resolve_detail_url(base_url, href))
            .collect::<Vec<_>>()
            .join("; "),
        None => String::new(),
    };

    Ok(CardFields {
        state,
        title,
        reference_number,
        closing_date,
        tender_value,
        detail_url,
        city,
        pdf_urls,
    })
}

/// 去掉首部标签（不区分大小写）并 trim
pub fn strip_label(text: &str, labels: &[&str]) -> String {
    match_label(text, labels).unwrap_or_else(|| text.trim().to_string())
}

/// 命中某个标签时返回去掉标签后的文本
fn match_label(text: &str, labels: &[&str]) -> Option<String> {
    let trimmed = text.trim();
    labels.iter().find_map(|label| {
        let head = trimmed.get(..label.len())?;
        head.eq_ignore_ascii_case(label)
            .then(|| trimmed[label.len()..].trim().to_string())
    })
}

fn currency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)₹|^\s*(?:rs\.?|inr)\s*").expect("valid currency regex"))
}

/// 去掉货币符号，保留原始金额文本
pub fn clean_value(text: &str) -> String {
    currency_re().replace_all(text, "").trim().to_string()
}

/// 相对链接按门户根地址补全，无法解析时原样返回
pub fn resolve_detail_url(base_url: &str, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    Url::parse(href)
        .or_else(|_| Url::parse(base_url).and_then(|base| base.join(href)))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}
