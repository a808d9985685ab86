//! 통합 테스트 공용 헬퍼.
//!
//! 실제 PostgreSQL/Redis 없이 동기화 엔진과 추정치 서비스를
//! 검증하기 위한 인메모리 구현들입니다.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::time::Instant;

use fund_core::{DailyBar, FundCode, FundEstimate, PricePoint};
use fund_data::error::{DataError, Result};
use fund_data::provider::BarProvider;
use fund_data::storage::{CacheStats, EstimateStore, HistoryStore, SnapshotCache};

// ============================================================================
// 테스트 데이터 헬퍼
// ============================================================================

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn bar(date: NaiveDate, close: Decimal) -> DailyBar {
    DailyBar {
        date,
        open: close - dec!(0.01),
        close,
        high: close + dec!(0.01),
        low: close - dec!(0.02),
        change_percent: dec!(0.5),
        volume: 100_000,
        turnover: dec!(1000000),
    }
}

// ============================================================================
// 인메모리 가격/추정치 스토어
// ============================================================================

/// 인메모리 스토어. `unavailable`을 켜면 모든 호출이 연결 오류를
/// 반환합니다.
#[derive(Default)]
pub struct MemoryStore {
    points: Mutex<HashMap<(String, NaiveDate), PricePoint>>,
    estimates: Mutex<Vec<FundEstimate>>,
    pub unavailable: AtomicBool,
    pub upsert_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, value: bool) {
        self.unavailable.store(value, Ordering::SeqCst);
    }

    /// 저장된 행 수.
    pub fn row_count(&self) -> usize {
        self.points.lock().unwrap().len()
    }

    /// 저장 상태의 스냅샷 (멱등성 비교용).
    pub fn snapshot(&self) -> Vec<DailyBar> {
        let mut bars: Vec<DailyBar> = self
            .points
            .lock()
            .unwrap()
            .values()
            .map(|p| p.to_bar())
            .collect();
        bars.sort_by(|a, b| b.date.cmp(&a.date));
        bars
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DataError::Connection("store down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn query_range(
        &self,
        code: &FundCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>> {
        self.check_available()?;

        let mut rows: Vec<PricePoint> = self
            .points
            .lock()
            .unwrap()
            .values()
            .filter(|p| {
                p.fund_code == *code && p.trade_date >= start && p.trade_date <= end
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.trade_date.cmp(&a.trade_date));
        Ok(rows)
    }

    async fn upsert_batch(&self, code: &FundCode, bars: &[DailyBar]) -> Result<usize> {
        self.check_available()?;
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);

        let now = Utc::now();
        let mut points = self.points.lock().unwrap();
        for bar in bars {
            let key = (code.as_str().to_string(), bar.date);
            let created_at = points.get(&key).map(|p| p.created_at).unwrap_or(now);
            points.insert(
                key,
                PricePoint {
                    fund_code: code.clone(),
                    trade_date: bar.date,
                    open: bar.open,
                    close: bar.close,
                    high: bar.high,
                    low: bar.low,
                    change_percent: bar.change_percent,
                    volume: bar.volume,
                    turnover: bar.turnover,
                    created_at,
                    updated_at: now,
                },
            );
        }
        Ok(bars.len())
    }
}

#[async_trait]
impl EstimateStore for MemoryStore {
    async fn save_estimate(&self, estimate: &FundEstimate) -> Result<()> {
        self.check_available()?;
        self.estimates.lock().unwrap().push(estimate.clone());
        Ok(())
    }

    async fn latest_estimate(&self, code: &FundCode) -> Result<Option<FundEstimate>> {
        self.check_available()?;
        let estimates = self.estimates.lock().unwrap();
        Ok(estimates
            .iter()
            .filter(|e| e.code == *code)
            .max_by_key(|e| e.estimate_time)
            .cloned())
    }

    async fn history(&self, code: &FundCode, _days: i64) -> Result<Vec<FundEstimate>> {
        self.check_available()?;
        let mut rows: Vec<FundEstimate> = self
            .estimates
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.code == *code)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.estimate_time.cmp(&a.estimate_time));
        Ok(rows)
    }

    async fn ping(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}

// ============================================================================
// 인메모리 TTL cache
// ============================================================================

/// tokio 가상 시계 기반 TTL cache.
///
/// `tokio::time::advance`로 시간을 진행시키면 만료가 재현됩니다.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Option<Instant>)>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    pub unavailable: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, value: bool) {
        self.unavailable.store(value, Ordering::SeqCst);
    }

    fn full_key(namespace: &str, key: &str) -> String {
        format!("{}:{}", namespace, key)
    }
}

#[async_trait]
impl SnapshotCache for MemoryCache {
    async fn get_json(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DataError::Cache("cache down".to_string()));
        }

        let full = Self::full_key(namespace, key);
        let mut entries = self.entries.lock().unwrap();

        match entries.get(&full) {
            Some((value, expires_at)) => {
                if expires_at.map(|at| Instant::now() >= at).unwrap_or(false) {
                    entries.remove(&full);
                    self.misses.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                } else {
                    self.hits.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(value.clone()))
                }
            }
            None => {
                self.misses.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        }
    }

    async fn set_json(&self, namespace: &str, key: &str, json: &str, ttl_secs: u64) -> bool {
        if self.unavailable.load(Ordering::SeqCst) {
            return false;
        }

        let full = Self::full_key(namespace, key);
        let expires_at = Some(Instant::now() + Duration::from_secs(ttl_secs));
        self.entries
            .lock()
            .unwrap()
            .insert(full, (json.to_string(), expires_at));
        true
    }

    async fn remove(&self, namespace: &str, key: &str) -> Result<bool> {
        let full = Self::full_key(namespace, key);
        Ok(self.entries.lock().unwrap().remove(&full).is_some())
    }

    async fn clear_prefix(&self, namespace: &str) -> Result<usize> {
        let prefix = format!("{}:", namespace);
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(&prefix));
        Ok(before - entries.len())
    }

    async fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::SeqCst) as u64;
        let misses = self.misses.load(Ordering::SeqCst) as u64;
        let total = hits + misses;
        CacheStats {
            hits,
            misses,
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
            key_count: self.entries.lock().unwrap().len() as u64,
            used_memory_bytes: 0,
            uptime_secs: 0,
        }
    }
}

// ============================================================================
// Mock provider
// ============================================================================

/// provider 동작 모드.
pub enum ProviderMode {
    /// 보유 시계열에서 요청 구간을 필터링해 응답
    Serve,
    /// 항상 타임아웃
    Timeout,
    /// 항상 빈 응답
    Empty,
}

/// 호출 횟수와 마지막 요청 구간을 기록하는 mock provider.
pub struct MockProvider {
    bars: Vec<DailyBar>,
    estimates: HashMap<String, FundEstimate>,
    mode: ProviderMode,
    pub fetch_calls: AtomicUsize,
    pub estimate_calls: AtomicUsize,
    pub last_span: Mutex<Option<(NaiveDate, NaiveDate)>>,
}

impl MockProvider {
    pub fn serving(bars: Vec<DailyBar>) -> Self {
        Self {
            bars,
            estimates: HashMap::new(),
            mode: ProviderMode::Serve,
            fetch_calls: AtomicUsize::new(0),
            estimate_calls: AtomicUsize::new(0),
            last_span: Mutex::new(None),
        }
    }

    pub fn timing_out() -> Self {
        Self {
            bars: Vec::new(),
            estimates: HashMap::new(),
            mode: ProviderMode::Timeout,
            fetch_calls: AtomicUsize::new(0),
            estimate_calls: AtomicUsize::new(0),
            last_span: Mutex::new(None),
        }
    }

    pub fn empty() -> Self {
        Self {
            bars: Vec::new(),
            estimates: HashMap::new(),
            mode: ProviderMode::Empty,
            fetch_calls: AtomicUsize::new(0),
            estimate_calls: AtomicUsize::new(0),
            last_span: Mutex::new(None),
        }
    }

    pub fn with_estimate(mut self, estimate: FundEstimate) -> Self {
        self.estimates
            .insert(estimate.code.as_str().to_string(), estimate);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn estimate_count(&self) -> usize {
        self.estimate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BarProvider for MockProvider {
    async fn fetch_daily_bars(
        &self,
        _code: &FundCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_span.lock().unwrap() = Some((start, end));

        match self.mode {
            ProviderMode::Serve => {
                let bars: Vec<DailyBar> = self
                    .bars
                    .iter()
                    .filter(|b| b.date >= start && b.date <= end)
                    .cloned()
                    .collect();
                if bars.is_empty() {
                    Err(DataError::EmptyResult(format!("{} ~ {}", start, end)))
                } else {
                    Ok(bars)
                }
            }
            ProviderMode::Timeout => Err(DataError::Timeout("deadline exceeded".to_string())),
            ProviderMode::Empty => Err(DataError::EmptyResult(format!("{} ~ {}", start, end))),
        }
    }

    async fn fetch_estimate(&self, code: &FundCode) -> Result<FundEstimate> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);

        match self.mode {
            ProviderMode::Timeout => Err(DataError::Timeout("deadline exceeded".to_string())),
            _ => self
                .estimates
                .get(code.as_str())
                .cloned()
                .ok_or_else(|| DataError::EmptyResult(code.as_str().to_string())),
        }
    }
}
