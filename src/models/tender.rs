use serde::{Deserialize, Serialize};

/// 输出 CSV 的固定列顺序
pub const STANDARD_FIELDS: [&str; 11] = [
    "portal",
    "tdr_no",
    "title",
    "description",
    "tender_value",
    "state",
    "city",
    "closing_date",
    "detail_url",
    "pdf_urls",
    "crawled_at",
];

/// 一条规范化后的招标记录
///
/// 门户上不存在的字段输出为空字符串，保证所有门户的列一致。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderRecord {
    pub portal: String,
    #[serde(rename = "tdr_no")]
    pub reference_number: String,
    pub title: String,
    pub description: String,
    pub tender_value: String,
    pub state: String,
    pub city: String,
    pub closing_date: String,
    pub detail_url: String,
    pub pdf_urls: String,
    /// 命中这条记录的关键词（不写入 CSV）
    #[serde(skip)]
    pub searched_keyword: String,
    pub crawled_at: String,
}

impl TenderRecord {
    /// 去重键：优先编号，其次详情页地址
    pub fn identity_key(&self) -> Option<&str> {
        [self.reference_number.as_str(), self.detail_url.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|k| !k.is_empty())
    }
}

/// 当前时间，格式与输出 CSV 一致
pub fn crawl_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
