use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（在任何浏览器操作之前触发）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 单条卡片 / 详情页错误（局部吸收）
    #[error("抓取错误: {0}")]
    Scrape(#[from] ScrapeError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 批处理错误
    #[error("批处理错误: {0}")]
    Batch(#[from] BatchError),
    /// 下游流程错误
    #[error("下游流程错误: {0}")]
    Pipeline(#[from] PipelineError),
    /// 其他错误
    #[error("错误: {0}")]
    Other(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 门户配置中没有任何搜索关键词
    #[error("门户 {portal} 没有配置 search_keyword(s)")]
    MissingKeywords { portal: String },
    /// 未知的抓取器类型
    #[error("未知的抓取器类型: {tag}")]
    UnknownScraper { tag: String },
    /// 门户标识不存在
    #[error("未知的门户: {site}")]
    UnknownPortal { site: String },
    /// 门户配置文件解析失败
    #[error("门户配置解析失败 ({path}): {source}")]
    PortalFileParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {reason}")]
    ConnectionFailed { port: u16, reason: String },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {reason}")]
    LaunchFailed { reason: String },
    /// 导航失败
    #[error("导航到 {url} 失败: {reason}")]
    NavigationFailed { url: String, reason: String },
    /// 导航超时
    #[error("导航到 {url} 超时 ({timeout_ms} ms)")]
    NavigationTimeout { url: String, timeout_ms: u128 },
    /// 元素不存在
    #[error("找不到元素: {selector}")]
    ElementNotFound { selector: String },
    /// CDP 调用失败
    #[error("CDP 调用失败: {reason}")]
    Cdp { reason: String },
}

/// 局部错误：只影响一张卡片或一个详情页
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// 详情页加载或提取失败
    #[error("详情页 {url} 获取失败: {reason}")]
    DetailFetchFailed { url: String, reason: String },
    /// 卡片字段提取失败
    #[error("第 {index} 张卡片解析失败: {reason}")]
    CardParseFailed { index: usize, reason: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// CSV 读写失败
    #[error("CSV 处理失败 ({path}): {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// 批处理错误
#[derive(Debug, Error)]
pub enum BatchError {
    /// 没有任何 (站点, 关键词) 产出数据
    #[error("没有抓取到任何招标数据，无法合并")]
    EmptyBatch,
    /// 某一对 (站点, 关键词) 执行失败
    #[error("[{site} | {keyword}] 执行失败: {source}")]
    PairFailed {
        site: String,
        keyword: String,
        #[source]
        source: Box<AppError>,
    },
}

/// 下游流程错误
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 无法启动下游命令
    #[error("无法启动下游命令 {program}: {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// 下游命令返回非零状态
    #[error("下游命令执行失败 (状态: {status}): {stderr}")]
    Failed { status: String, stderr: String },
    /// 下游命令没有输出结果路径
    #[error("下游命令没有输出结果路径")]
    NoOutput,
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::Cdp {
            reason: err.to_string(),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON解析失败: {}", err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建导航失败错误
    pub fn navigation_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            reason: reason.to_string(),
        })
    }

    /// 创建元素缺失错误
    pub fn element_not_found(selector: impl Into<String>) -> Self {
        AppError::Browser(BrowserError::ElementNotFound {
            selector: selector.into(),
        })
    }

    /// 创建 CSV 错误
    pub fn csv(path: impl Into<String>, source: csv::Error) -> Self {
        AppError::File(FileError::Csv {
            path: path.into(),
            source,
        })
    }

    /// 是否为配置错误
    pub fn is_config(&self) -> bool {
        matches!(self, AppError::Config(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
