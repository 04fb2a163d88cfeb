use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口（非 headless 模式下连接已打开的浏览器）
    pub browser_debug_port: u16,
    /// 是否自行启动无头浏览器
    pub headless: bool,
    /// 无头模式下的浏览器可执行文件路径（为空时由 chromiumoxide 自动查找）
    pub chrome_executable: Option<String>,
    /// 门户配置文件
    pub portals_file: String,
    /// CSV 输出目录
    pub output_dir: String,
    /// 要抓取的站点
    pub sites: Vec<String>,
    /// 搜索关键词
    pub keywords: Vec<String>,
    /// 每次运行最多保留的条数（None 表示不限）
    pub max_tenders: Option<usize>,
    /// 导航超时（毫秒）
    pub navigation_timeout_ms: u64,
    /// 提交搜索后的固定等待（毫秒）
    pub search_settle_ms: u64,
    /// 点击下一页后的固定等待（毫秒）
    pub page_settle_ms: u64,
    /// 下游流程命令，合并后的 CSV 路径作为最后一个参数
    pub pipeline_command: Option<String>,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            headless: true,
            chrome_executable: None,
            portals_file: "configs/portals.toml".to_string(),
            output_dir: "tender_results".to_string(),
            sites: vec!["indiantenders".to_string()],
            keywords: Vec::new(),
            max_tenders: None,
            navigation_timeout_ms: 60_000,
            search_settle_ms: 3_000,
            page_settle_ms: 2_000,
            pipeline_command: None,
            output_log_file: "scrape_log.txt".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().filter(|v| !v.is_empty()).or(default.chrome_executable),
            portals_file: std::env::var("PORTALS_FILE").unwrap_or(default.portals_file),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            sites: std::env::var("SITES").ok().map(|v| split_list(&v)).unwrap_or(default.sites),
            keywords: std::env::var("KEYWORDS").ok().map(|v| split_list(&v)).unwrap_or(default.keywords),
            max_tenders: std::env::var("MAX_TENDERS").ok().and_then(|v| v.parse().ok()).map(normalize_cap).unwrap_or(default.max_tenders),
            navigation_timeout_ms: std::env::var("NAVIGATION_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.navigation_timeout_ms),
            search_settle_ms: std::env::var("SEARCH_SETTLE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.search_settle_ms),
            page_settle_ms: std::env::var("PAGE_SETTLE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.page_settle_ms),
            pipeline_command: std::env::var("PIPELINE_COMMAND").ok().filter(|v| !v.trim().is_empty()).or(default.pipeline_command),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 各等待点的超时设置
    pub fn settle_timeouts(&self) -> SettleTimeouts {
        SettleTimeouts {
            navigation: Duration::from_millis(self.navigation_timeout_ms),
            after_search: Duration::from_millis(self.search_settle_ms),
            after_next_page: Duration::from_millis(self.page_settle_ms),
        }
    }
}

/// 固定等待时间
///
/// 搜索提交和翻页之后页面由前端重新渲染，按固定时长等待。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettleTimeouts {
    /// 页面导航 / 详情页加载的硬性超时
    pub navigation: Duration,
    /// 提交搜索后的等待
    pub after_search: Duration,
    /// 点击下一页后的等待
    pub after_next_page: Duration,
}

impl Default for SettleTimeouts {
    fn default() -> Self {
        Config::default().settle_timeouts()
    }
}

impl SettleTimeouts {
    /// 不等待（测试用）
    pub fn immediate() -> Self {
        Self {
            navigation: Duration::from_secs(5),
            after_search: Duration::ZERO,
            after_next_page: Duration::ZERO,
        }
    }
}

/// 0 表示不限
pub fn normalize_cap(cap: usize) -> Option<usize> {
    (cap > 0).then_some(cap)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
