//! 单次运行的状态
//!
//! 累积的记录和已见过的去重键都归这一次运行独占，
//! 在关键词 / 页面 / 卡片之间显式传递。

use std::collections::HashSet;

use tracing::trace;

use crate::models::TenderRecord;

/// 抓取状态机的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapePhase {
    Idle,
    SiteOpened,
    Searched,
    PageScraped,
    NextPage,
    Done,
}

/// 记录进入运行状态的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// 新记录，已保留
    Added,
    /// 去重键已存在，丢弃
    Duplicate,
    /// 编号和详情页地址都为空，无法去重
    Unidentified,
    /// 已达上限，丢弃
    CapReached,
}

#[derive(Debug)]
pub struct RunState {
    records: Vec<TenderRecord>,
    seen: HashSet<String>,
    cap: Option<usize>,
    phase: ScrapePhase,
}

impl RunState {
    pub fn new(cap: Option<usize>) -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
            cap,
            phase: ScrapePhase::Idle,
        }
    }

    /// 已达上限（未设上限时永远为 false）
    pub fn limit_reached(&self) -> bool {
        self.cap.is_some_and(|cap| self.records.len() >= cap)
    }

    pub fn is_seen(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// 登记去重键并追加记录
    pub fn admit(&mut self, record: TenderRecord) -> Admission {
        if self.limit_reached() {
            return Admission::CapReached;
        }
        let Some(key) = record.identity_key() else {
            return Admission::Unidentified;
        };
        if !self.seen.insert(key.to_string()) {
            return Admission::Duplicate;
        }
        self.records.push(record);
        Admission::Added
    }

    pub fn enter(&mut self, phase: ScrapePhase) {
        trace!("{:?} → {:?}", self.phase, phase);
        self.phase = phase;
    }

    pub fn phase(&self) -> ScrapePhase {
        self.phase
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TenderRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TenderRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(reference: &str, url: &str) -> TenderRecord {
        TenderRecord {
            reference_number: reference.to_string(),
            detail_url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_same_card_twice_is_kept_once() {
        let mut state = RunState::new(None);
        assert_eq!(state.admit(record("R1", "https://a/1")), Admission::Added);
        assert_eq!(state.admit(record("R1", "https://a/1")), Admission::Duplicate);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_url_key_used_when_reference_missing() {
        let mut state = RunState::new(None);
        assert_eq!(state.admit(record("", "https://a/1")), Admission::Added);
        assert_eq!(state.admit(record("", "https://a/2")), Admission::Added);
        assert_eq!(state.admit(record("", "https://a/1")), Admission::Duplicate);
        assert!(state.is_seen("https://a/2"));
    }

    #[test]
    fn test_unidentified_record_rejected() {
        let mut state = RunState::new(None);
        assert_eq!(state.admit(record("", "")), Admission::Unidentified);
        assert!(state.is_empty());
    }

    #[test]
    fn test_cap_is_never_exceeded() {
        let mut state = RunState::new(Some(2));
        assert!(!state.limit_reached());
        state.admit(record("1", ""));
        state.admit(record("2", ""));
        assert!(state.limit_reached());
        assert_eq!(state.admit(record("3", "")), Admission::CapReached);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_unbounded_never_reaches_limit() {
        let mut state = RunState::new(None);
        for i in 0..500 {
            state.admit(record(&i.to_string(), ""));
        }
        assert!(!state.limit_reached());
        assert_eq!(state.phase(), ScrapePhase::Idle);
    }
}
