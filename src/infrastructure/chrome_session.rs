//! chromiumoxide 实现的浏览器会话 - 基础设施层

use std::time::Duration;

use chromiumoxide::{Browser, Element, Page};
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::session::{BrowserSession, PageElement, SecondaryPage};
use crate::infrastructure::JsExecutor;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 真实浏览器会话
///
/// 持有 Browser（用于打开详情页）和主页面的 JsExecutor
pub struct ChromeSession {
    browser: Browser,
    executor: JsExecutor,
}

impl ChromeSession {
    pub fn new(browser: Browser, page: Page) -> Self {
        Self {
            browser,
            executor: JsExecutor::new(page),
        }
    }
}

impl BrowserSession for ChromeSession {
    type Element = ChromeElement;
    type Secondary = ChromeDetailPage;

    async fn navigate(&self, url: &str, limit: Duration) -> AppResult<()> {
        goto_within(self.executor.page(), url, limit).await
    }

    async fn wait_settled(&self, limit: Duration) -> AppResult<()> {
        let page = self.executor.page();
        let settled = async {
            page.wait_for_navigation().await?;
            while !self.executor.is_document_complete().await? {
                sleep(READY_POLL_INTERVAL).await;
            }
            Ok::<(), AppError>(())
        };
        within(page_url(page).await, limit, settled).await
    }

    async fn fill(&self, selector: &str, text: &str) -> AppResult<()> {
        if !self.executor.clear_input(selector).await? {
            return Err(AppError::element_not_found(selector));
        }
        if text.is_empty() {
            return Ok(());
        }

        let input = self
            .executor
            .page()
            .find_element(selector)
            .await
            .map_err(|_| AppError::element_not_found(selector))?;
        input.click().await?;
        input.type_str(text).await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> AppResult<()> {
        let element = self
            .executor
            .page()
            .find_element(selector)
            .await
            .map_err(|_| AppError::element_not_found(selector))?;
        element.click().await?;
        Ok(())
    }

    async fn locate_all(&self, selector: &str) -> AppResult<Vec<ChromeElement>> {
        let elements = self.executor.page().find_elements(selector).await?;
        debug!("{} 匹配到 {} 个元素", selector, elements.len());
        Ok(elements.into_iter().map(ChromeElement).collect())
    }

    async fn is_visible(&self, selector: &str) -> AppResult<bool> {
        self.executor.is_visible(selector).await
    }

    async fn open_secondary_page(&self) -> AppResult<ChromeDetailPage> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(ChromeDetailPage { page })
    }
}

/// 页面元素句柄
pub struct ChromeElement(Element);

impl PageElement for ChromeElement {
    async fn read_text(&self, selector: &str) -> AppResult<String> {
        let child = self
            .0
            .find_element(selector)
            .await
            .map_err(|_| AppError::element_not_found(selector))?;
        Ok(child.inner_text().await?.unwrap_or_default())
    }

    async fn read_attribute(&self, selector: &str, name: &str) -> AppResult<Option<String>> {
        let child = self
            .0
            .find_element(selector)
            .await
            .map_err(|_| AppError::element_not_found(selector))?;
        Ok(child.attribute(name).await?)
    }

    async fn read_all_attributes(&self, selector: &str, name: &str) -> AppResult<Vec<String>> {
        let children = self.0.find_elements(selector).await?;
        let mut values = Vec::with_capacity(children.len());
        for child in children {
            if let Some(value) = child.attribute(name).await? {
                values.push(value);
            }
        }
        Ok(values)
    }
}

/// 详情页（独立标签页）
pub struct ChromeDetailPage {
    page: Page,
}

impl SecondaryPage for ChromeDetailPage {
    async fn navigate(&self, url: &str, limit: Duration) -> AppResult<()> {
        goto_within(&self.page, url, limit).await
    }

    async fn wait_settled(&self, limit: Duration) -> AppResult<()> {
        let page = &self.page;
        let settled = async {
            page.wait_for_navigation().await?;
            loop {
                let state: String = page.evaluate("document.readyState").await?.into_value()?;
                if state == "complete" {
                    break;
                }
                sleep(READY_POLL_INTERVAL).await;
            }
            Ok::<(), AppError>(())
        };
        within(page_url(page).await, limit, settled).await
    }

    async fn read_text(&self, selector: &str) -> AppResult<String> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| AppError::element_not_found(selector))?;
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn close(self) -> AppResult<()> {
        self.page.close().await?;
        Ok(())
    }
}

/// 带超时的导航
async fn goto_within(page: &Page, url: &str, limit: Duration) -> AppResult<()> {
    match timeout(limit, page.goto(url)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(AppError::navigation_failed(url, e)),
        Err(_) => Err(BrowserError::NavigationTimeout {
            url: url.to_string(),
            timeout_ms: limit.as_millis(),
        }
        .into()),
    }
}

async fn within<F>(url: String, limit: Duration, fut: F) -> AppResult<()>
where
    F: std::future::Future<Output = AppResult<()>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(BrowserError::NavigationTimeout {
            url,
            timeout_ms: limit.as_millis(),
        }
        .into()),
    }
}

async fn page_url(page: &Page) -> String {
    page.url().await.ok().flatten().unwrap_or_default()
}
