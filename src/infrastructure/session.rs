//! 浏览器能力接口 - 基础设施层
//!
//! 抓取流程只依赖这里的能力，不直接接触 chromiumoxide。
//! 测试中可以用脚本化的内存实现替换真实浏览器。

use std::time::Duration;

use crate::error::AppResult;

/// 主页面会话
///
/// 职责：
/// - 持有当前页面（一次运行期间独占）
/// - 提供导航、填写、点击、查找元素的能力
/// - 按需打开短生命周期的次级页面（详情页）
#[allow(async_fn_in_trait)]
pub trait BrowserSession {
    type Element: PageElement;
    type Secondary: SecondaryPage;

    /// 导航到指定 URL，超过 `timeout` 视为导航失败
    async fn navigate(&self, url: &str, timeout: Duration) -> AppResult<()>;

    /// 等待页面稳定（加载完成）
    async fn wait_settled(&self, timeout: Duration) -> AppResult<()>;

    /// 覆盖输入框内容
    async fn fill(&self, selector: &str, text: &str) -> AppResult<()>;

    async fn click(&self, selector: &str) -> AppResult<()>;

    /// 按 DOM 顺序返回所有匹配元素
    async fn locate_all(&self, selector: &str) -> AppResult<Vec<Self::Element>>;

    /// 元素存在、可见且可交互
    async fn is_visible(&self, selector: &str) -> AppResult<bool>;

    async fn open_secondary_page(&self) -> AppResult<Self::Secondary>;
}

/// 元素句柄（如一张招标卡片），读取其子元素
#[allow(async_fn_in_trait)]
pub trait PageElement {
    /// 读取子元素文本，子元素不存在时返回错误
    async fn read_text(&self, selector: &str) -> AppResult<String>;

    /// 读取子元素属性，属性不存在时返回 `None`
    async fn read_attribute(&self, selector: &str, name: &str) -> AppResult<Option<String>>;

    /// 读取所有匹配子元素的属性（按 DOM 顺序，跳过缺失的）
    async fn read_all_attributes(&self, selector: &str, name: &str) -> AppResult<Vec<String>>;
}

/// 次级页面（详情页），用完必须关闭
#[allow(async_fn_in_trait)]
pub trait SecondaryPage {
    async fn navigate(&self, url: &str, timeout: Duration) -> AppResult<()>;

    async fn wait_settled(&self, timeout: Duration) -> AppResult<()>;

    async fn read_text(&self, selector: &str) -> AppResult<String>;

    async fn close(self) -> AppResult<()>;
}
