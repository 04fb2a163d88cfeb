//! 结果写入服务 - 业务能力层
//!
//! 只负责"把一次运行的记录写成 CSV"，不关心流程

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AppError, AppResult, FileError};
use crate::models::{TenderRecord, STANDARD_FIELDS};

/// 结果落地能力
///
/// 每次调用都返回一个新的、唯一的输出位置。
pub trait ResultSink {
    fn save(&self, records: &[TenderRecord], portal: &str) -> AppResult<PathBuf>;
}

/// 写入 `<output_dir>/<portal>_<时间戳>.csv`
pub struct CsvSink {
    output_dir: PathBuf,
}

impl CsvSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl ResultSink for CsvSink {
    fn save(&self, records: &[TenderRecord], portal: &str) -> AppResult<PathBuf> {
        let stem = format!(
            "{}_{}",
            portal,
            chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
        );
        let path = unique_path(&self.output_dir, &stem, "csv")?;
        write_records(&path, records)?;

        debug!("写入 {} 条记录: {}", records.len(), path.display());
        Ok(fs::canonicalize(&path).unwrap_or(path))
    }
}

/// 在目录下找一个不存在的文件名，重名时追加 `_1`、`_2`……
pub(crate) fn unique_path(dir: &Path, stem: &str, ext: &str) -> AppResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| FileError::WriteFailed {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut candidate = dir.join(format!("{}.{}", stem, ext));
    let mut n = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{}_{}.{}", stem, n, ext));
        n += 1;
    }
    Ok(candidate)
}

/// 按固定列顺序写出记录；没有记录时只写表头
pub(crate) fn write_records(path: &Path, records: &[TenderRecord]) -> AppResult<()> {
    let shown = path.display().to_string();
    let mut writer = csv::Writer::from_path(path).map_err(|e| AppError::csv(&shown, e))?;

    if records.is_empty() {
        writer
            .write_record(STANDARD_FIELDS)
            .map_err(|e| AppError::csv(&shown, e))?;
    }
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| AppError::csv(&shown, e))?;
    }

    writer.flush().map_err(|e| FileError::WriteFailed {
        path: shown,
        source: e,
    })?;
    Ok(())
}

/// 读回一个 CSV 文件中的全部记录
pub fn read_records(path: &Path) -> AppResult<Vec<TenderRecord>> {
    let shown = path.display().to_string();
    let mut reader = csv::Reader::from_path(path).map_err(|e| AppError::csv(&shown, e))?;

    let mut records = Vec::new();
    for row in reader.deserialize::<TenderRecord>() {
        records.push(row.map_err(|e| AppError::csv(&shown, e))?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tender_sink_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_header_uses_standard_fields() {
        let dir = temp_dir("header");
        let sink = CsvSink::new(&dir);
        let record = TenderRecord {
            portal: "indiantenders".to_string(),
            reference_number: "IT-1".to_string(),
            title: "Solar plant".to_string(),
            searched_keyword: "solar".to_string(),
            ..Default::default()
        };

        let path = sink.save(&[record], "indiantenders").unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, STANDARD_FIELDS.join(","));

        // 缺失字段输出为空串，列数不变
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row.split(',').count(), STANDARD_FIELDS.len());
        assert!(row.starts_with("indiantenders,IT-1,Solar plant,,"));
    }

    #[test]
    fn test_empty_run_writes_header_only() {
        let dir = temp_dir("empty");
        let path = CsvSink::new(&dir).save(&[], "eprocure").unwrap();
        assert!(read_records(&path).unwrap().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_same_second_saves_get_distinct_paths() {
        let dir = temp_dir("distinct");
        let sink = CsvSink::new(&dir);
        let a = sink.save(&[], "tendertiger").unwrap();
        let b = sink.save(&[], "tendertiger").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_read_back_keeps_quoted_text() {
        let dir = temp_dir("quoted");
        let record = TenderRecord {
            portal: "tenderdetail".to_string(),
            description: "Line one, \"quoted\"\nline two".to_string(),
            detail_url: "https://x/1".to_string(),
            ..Default::default()
        };
        let path = CsvSink::new(&dir).save(&[record.clone()], "tenderdetail").unwrap();
        assert_eq!(read_records(&path).unwrap(), vec![record]);
    }
}
