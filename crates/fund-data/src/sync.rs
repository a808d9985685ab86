//! 다계층 동기화 엔진.
//!
//! 내구 원장(스토어)과 원격 소스를 비교하여 누락 거래일을 채웁니다.
//! 한 번의 동기화는 갭 감지 → 원격 조회 → 병합 → 멱등 기록의
//! 순서로 진행되며, 각 단계의 부분 실패는 degraded 결과로
//! 흡수됩니다. 스토어와 원격이 모두 불가용일 때만 합성 시계열로
//! 폴백하고 결과에 `Synthetic` 출처를 명시합니다.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use fund_core::{DailyBar, DataOrigin, SyncReport, SyncWindow};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::fallback::synthetic_series;
use crate::provider::BarProvider;
use crate::storage::HistoryStore;

/// 펀드 코드별 동기화 진행 상태를 추적하는 Lock 맵.
///
/// 엔트리는 코드당 하나만 생기고 제거되지 않습니다. 추적 대상 펀드
/// 유니버스는 유한하므로(코드당 수십 바이트) 축출 없이 유지합니다.
type FetchLockMap = Arc<RwLock<HashMap<String, Arc<RwLock<()>>>>>;

// =============================================================================
// 갭 감지
// =============================================================================

/// 기준일부터 거슬러 올라가며 기대 거래일(주중) N개를 오름차순으로
/// 반환합니다.
///
/// 휴장일 달력은 모델링하지 않습니다. 공휴일은 누락 거래일로 오판될
/// 수 있으며, 그 경우 원격 조회가 해당 날짜에 대해 빈 응답을
/// 돌려주고 병합 단계에서 자연히 무시됩니다.
pub fn expected_trading_days(as_of: NaiveDate, days: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(days);
    let mut cursor = as_of;
    while dates.len() < days {
        if !matches!(cursor.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(cursor);
        }
        cursor -= Duration::days(1);
    }
    dates.reverse();
    dates
}

/// 스토어 조회에 사용할 확장 구간.
///
/// 주말과 provider 지연을 흡수하기 위해 달력일 기준 약 2배로
/// 넓힙니다.
pub fn widened_span(as_of: NaiveDate, days: usize) -> (NaiveDate, NaiveDate) {
    (as_of - Duration::days(2 * days as i64), as_of)
}

/// 기대 거래일 중 보유 날짜 집합에 없는 날짜를 오름차순으로
/// 반환합니다.
pub fn missing_dates(expected: &[NaiveDate], persisted: &HashSet<NaiveDate>) -> Vec<NaiveDate> {
    expected
        .iter()
        .filter(|d| !persisted.contains(d))
        .copied()
        .collect()
}

// =============================================================================
// 병합
// =============================================================================

/// 병합 결과.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// 정규화된 시계열: 날짜 내림차순, 중복 없음, 길이 ≤ N
    pub bars: Vec<DailyBar>,
    /// 스토어 입력에 없던 새 행 (델타셋)
    pub delta: Vec<DailyBar>,
}

/// 보유 행과 신규 조회 행을 병합합니다.
///
/// 날짜가 겹치면 원격에서 온 행이 우선합니다. 결과는 날짜
/// 내림차순으로 정렬되고 최근 `limit`개로 잘립니다. 델타셋은
/// 보유 집합에 없던 원격 행입니다.
pub fn merge_bars(persisted: &[DailyBar], fetched: &[DailyBar], limit: usize) -> MergeOutcome {
    let persisted_dates: HashSet<NaiveDate> = persisted.iter().map(|b| b.date).collect();

    let mut by_date: HashMap<NaiveDate, DailyBar> = persisted
        .iter()
        .map(|b| (b.date, b.clone()))
        .collect();

    let mut delta = Vec::new();
    for bar in fetched {
        if !persisted_dates.contains(&bar.date) {
            delta.push(bar.clone());
        }
        by_date.insert(bar.date, bar.clone());
    }

    let mut bars: Vec<DailyBar> = by_date.into_values().collect();
    bars.sort_by(|a, b| b.date.cmp(&a.date));
    bars.truncate(limit);

    delta.sort_by(|a, b| b.date.cmp(&a.date));

    MergeOutcome { bars, delta }
}

// =============================================================================
// 동기화 엔진
// =============================================================================

/// 내구 원장과 원격 소스를 조정하는 동기화 엔진.
///
/// 같은 펀드 코드에 대한 동시 동기화는 코드별 lock으로 직렬화되어
/// 중복 원격 조회를 방지합니다. 서로 다른 코드는 간섭 없이 병행
/// 실행됩니다.
pub struct SyncEngine {
    store: Arc<dyn HistoryStore>,
    provider: Arc<dyn BarProvider>,
    fetch_locks: FetchLockMap,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn HistoryStore>, provider: Arc<dyn BarProvider>) -> Self {
        Self {
            store,
            provider,
            fetch_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn get_or_create_lock(&self, key: &str) -> Arc<RwLock<()>> {
        let locks = self.fetch_locks.read().await;
        if let Some(lock) = locks.get(key) {
            return lock.clone();
        }
        drop(locks);

        let mut locks = self.fetch_locks.write().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// 한 번의 동기화를 수행합니다.
    ///
    /// 흐름: 스토어 조회 → 갭 계산 → (갭 없음이면 종료) → 원격 조회
    /// → 병합 → 델타 기록. 스토어 불가용이면 원격 직행, 원격까지
    /// 실패하면 보유분 또는 합성 시계열로 degrade됩니다.
    #[instrument(skip(self), fields(code = %window.code, days = window.days))]
    pub async fn sync(&self, window: &SyncWindow) -> Result<SyncReport> {
        let lock = self.get_or_create_lock(window.code.as_str()).await;
        let _guard = lock.write().await;

        let expected = expected_trading_days(window.as_of, window.days);
        let (span_start, span_end) = widened_span(window.as_of, window.days);

        // 1. 스토어 조회
        let persisted = match self.store.query_range(&window.code, span_start, span_end).await {
            Ok(points) => points.into_iter().map(|p| p.to_bar()).collect::<Vec<_>>(),
            Err(e) if e.is_storage_unavailable() => {
                warn!(code = %window.code, error = %e, "스토어 불가용, 원격 직행 모드");
                return self.sync_without_store(window, &expected).await;
            }
            Err(e) => return Err(e),
        };

        // 2. 갭 계산
        let persisted_dates: HashSet<NaiveDate> = persisted.iter().map(|b| b.date).collect();
        let missing = missing_dates(&expected, &persisted_dates);

        if missing.is_empty() {
            debug!(code = %window.code, "갭 없음, 원격 조회 생략");
            let merged = merge_bars(&persisted, &[], window.days);
            return Ok(SyncReport {
                code: window.code.clone(),
                bars: merged.bars,
                delta: Vec::new(),
                persisted: 0,
                missing_dates: missing,
                origin: DataOrigin::Store,
            });
        }

        info!(
            code = %window.code,
            missing = missing.len(),
            first = %missing[0],
            last = %missing[missing.len() - 1],
            "누락 거래일 감지"
        );

        // 3. 원격 조회: 누락 날짜의 min~max를 덮는 연속 구간 한 번
        let fetched = match self
            .provider
            .fetch_daily_bars(&window.code, missing[0], missing[missing.len() - 1])
            .await
        {
            Ok(bars) => bars,
            Err(e) => {
                warn!(code = %window.code, error = %e, "원격 조회 실패");
                return Ok(self.degraded_report(window, persisted, missing));
            }
        };

        // 4. 병합 및 델타 기록
        let merged = merge_bars(&persisted, &fetched, window.days);
        let written = if merged.delta.is_empty() {
            0
        } else {
            match self.store.upsert_batch(&window.code, &merged.delta).await {
                Ok(count) => count,
                Err(e) => {
                    warn!(code = %window.code, error = %e, "델타 기록 실패, 결과는 그대로 반환");
                    0
                }
            }
        };

        info!(
            code = %window.code,
            rows = merged.bars.len(),
            delta = merged.delta.len(),
            written = written,
            "동기화 완료"
        );

        Ok(SyncReport {
            code: window.code.clone(),
            bars: merged.bars,
            delta: merged.delta,
            persisted: written,
            missing_dates: missing,
            origin: DataOrigin::Merged,
        })
    }

    /// 스토어 불가용 시의 원격 직행 경로.
    async fn sync_without_store(
        &self,
        window: &SyncWindow,
        expected: &[NaiveDate],
    ) -> Result<SyncReport> {
        if expected.is_empty() {
            return Ok(SyncReport {
                code: window.code.clone(),
                bars: Vec::new(),
                delta: Vec::new(),
                persisted: 0,
                missing_dates: Vec::new(),
                origin: DataOrigin::ProviderOnly,
            });
        }

        let start = expected[0];
        let end = expected[expected.len() - 1];

        match self.provider.fetch_daily_bars(&window.code, start, end).await {
            Ok(fetched) => {
                let merged = merge_bars(&[], &fetched, window.days);
                Ok(SyncReport {
                    code: window.code.clone(),
                    bars: merged.bars,
                    delta: merged.delta,
                    persisted: 0,
                    missing_dates: expected.to_vec(),
                    origin: DataOrigin::ProviderOnly,
                })
            }
            Err(e) => {
                warn!(code = %window.code, error = %e, "원격까지 실패, 합성 시계열로 폴백");
                Ok(self.degraded_report(window, Vec::new(), expected.to_vec()))
            }
        }
    }

    /// 원격 조회 실패 시의 degraded 결과.
    ///
    /// 스토어 보유분이 있으면 그것으로 응답하고, 전무하면 합성
    /// 시계열을 `Synthetic` 표시와 함께 반환합니다.
    fn degraded_report(
        &self,
        window: &SyncWindow,
        persisted: Vec<DailyBar>,
        missing: Vec<NaiveDate>,
    ) -> SyncReport {
        if persisted.is_empty() {
            let bars = synthetic_series(window.as_of, window.days);
            return SyncReport {
                code: window.code.clone(),
                bars,
                delta: Vec::new(),
                persisted: 0,
                missing_dates: missing,
                origin: DataOrigin::Synthetic,
            };
        }

        let merged = merge_bars(&persisted, &[], window.days);
        SyncReport {
            code: window.code.clone(),
            bars: merged.bars,
            delta: Vec::new(),
            persisted: 0,
            missing_dates: missing,
            origin: DataOrigin::StoreOnly,
        }
    }
}
