//! 数据集合并服务 - 业务能力层

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppResult;
use crate::services::csv_sink::{read_records, unique_path, write_records};

/// 按给定顺序读取各次运行的 CSV 并拼接成一个合并文件
///
/// 合并文件命名为 `_merged_<时间戳>.csv`，返回其路径
pub fn merge_outputs(outputs: &[PathBuf], output_dir: &Path) -> AppResult<PathBuf> {
    let mut merged = Vec::new();
    for path in outputs {
        let records = read_records(path)?;
        info!("读取 {} 条记录: {}", records.len(), path.display());
        merged.extend(records);
    }

    let stem = format!("_merged_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let merged_path = unique_path(output_dir, &stem, "csv")?;
    write_records(&merged_path, &merged)?;

    info!("🧩 合并 CSV 已生成 ({} 条): {}", merged.len(), merged_path.display());
    Ok(merged_path)
}
