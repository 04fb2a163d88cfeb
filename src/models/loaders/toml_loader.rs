use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::models::portal::PortalRegistry;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文本解析门户配置
pub fn parse_portal_registry(content: &str, source: &str) -> AppResult<PortalRegistry> {
    toml::from_str(content).map_err(|e| {
        AppError::Config(ConfigError::PortalFileParse {
            path: source.to_string(),
            source: e,
        })
    })
}

/// 从 TOML 文件加载门户配置
pub async fn load_portal_registry(path: &Path) -> AppResult<PortalRegistry> {
    let content = fs::read_to_string(path).await.map_err(|e| FileError::ReadFailed {
        path: path.display().to_string(),
        source: e,
    })?;

    let registry = parse_portal_registry(&content, &path.display().to_string())?;

    tracing::info!(
        "成功加载 {} 个门户配置: {}",
        registry.len(),
        registry.sites().collect::<Vec<_>>().join(", ")
    );

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScraperKind;

    const SAMPLE: &str = r##"
[indiantenders]
scraper = "indiantenders"
base_url = "https://www.indiantenders.com"
start_url = "https://www.indiantenders.com/tenders"
search_keywords = ["solar", "road"]
max_tenders = 40

[indiantenders.selectors]
keyword_input = "input#keyword"
search_button = "button.search"
next_page = "a.next"
tender_card = "div.tender-card"
state = ".state"
title = ".title"
ref_id = ".ref"
deadline = ".deadline"
value = ".value"
detail_url = "a.detail"

[tendertiger]
scraper = "tendertiger"
base_url = "https://www.tendertiger.com"
start_url = "https://www.tendertiger.com/search"
search_keyword = "bridge"

[tendertiger.selectors]
keyword_input = "#q"
search_button = "#go"
next_page = ".pager .next"
tender_card = ".result"
state = ".loc"
title = "h3"
ref_id = ".ttid"
deadline = ".closing"
value = ".amount"
detail_url = "h3 a"
city = ".city"
pdf_links = "a.pdf"
"##;

    #[test]
    fn test_parse_portal_registry() {
        let registry = parse_portal_registry(SAMPLE, "inline").unwrap();
        assert_eq!(registry.len(), 2);

        let it = registry.get("indiantenders").unwrap();
        assert_eq!(it.kind().unwrap(), ScraperKind::IndianTenders);
        assert_eq!(it.keywords("indiantenders").unwrap().len(), 2);
        assert_eq!(it.cap(), Some(40));
        assert!(it.selectors.city.is_none());

        let tt = registry.get("tendertiger").unwrap();
        assert_eq!(tt.keywords("tendertiger").unwrap(), vec!["bridge".to_string()]);
        assert_eq!(tt.selectors.pdf_links.as_deref(), Some("a.pdf"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = parse_portal_registry("[broken", "inline").unwrap_err();
        assert!(err.is_config());
    }
}
