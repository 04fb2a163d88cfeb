/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{AppResult, FileError};
use crate::orchestrator::{BatchOutcome, BatchRequest};

/// 初始化 tracing，默认 info 级别，`RUST_LOG` 可覆盖
pub fn init() {
    init_with_default("info");
}

/// 指定默认级别初始化（重复调用无副作用）
pub fn init_with_default(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n招标抓取日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header).map_err(|e| FileError::WriteFailed {
        path: log_file_path.to_string(),
        source: e,
    })?;
    Ok(())
}

/// 向日志文件追加一行
pub fn append_log_line(log_file_path: &str, line: &str) -> AppResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| FileError::WriteFailed {
            path: log_file_path.to_string(),
            source: e,
        })?;
    writeln!(file, "{}", line).map_err(|e| FileError::WriteFailed {
        path: log_file_path.to_string(),
        source: e,
    })?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 招标抓取");
    info!("🌐 站点: {}", config.sites.join(", "));
    info!("🔑 关键词: {}", config.keywords.join(", "));
    match config.max_tenders {
        Some(n) => info!("📊 每次运行上限: {}", n),
        None => info!("📊 每次运行上限: 不限"),
    }
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
pub fn log_batch_start(total: usize, request: &BatchRequest) {
    info!("\n{}", "=".repeat(60));
    info!(
        "📦 开始批量抓取: {} 个站点 × {} 个关键词 = {} 次运行",
        request.sites.len(),
        request.keywords.len(),
        total
    );
    info!("{}", "=".repeat(60));
}

/// 记录单个组合开始
pub fn log_pair_start(index: usize, total: usize, site: &str, keyword: &str) {
    info!("\n{}", "─".repeat(60));
    info!("▶ [{}/{}] 抓取 {} | {}", index, total, site, keyword);
}

/// 打印最终统计信息
pub fn print_final_stats(outcome: &BatchOutcome, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    for run in &outcome.runs {
        info!("  {:<20} {:>5} 条  {}", run.site, run.count, run.output.display());
    }
    info!("✅ 共 {} 条，{} 次运行", outcome.total_records(), outcome.runs.len());
    info!("🧩 数据集: {}", outcome.dataset.display());
    info!("🎯 最终产物: {}", outcome.final_output);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("招标公告全文", 4), "招标公告...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn test_log_write_failure_is_labelled_as_write() {
        let dir = std::env::temp_dir();
        let err = append_log_line(&dir.display().to_string(), "line").unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::File(FileError::WriteFailed { .. })
        ));
    }
}
