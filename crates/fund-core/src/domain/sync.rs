//! 동기화 요청/결과 디스크립터.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DailyBar, FundCode};

/// 동기화 요청 윈도우.
///
/// 호출마다 새로 계산되는 일회성 디스크립터이며 영속되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncWindow {
    /// 펀드 코드
    pub code: FundCode,
    /// 요청 거래일 수 (N)
    pub days: usize,
    /// 기준일
    pub as_of: NaiveDate,
}

impl SyncWindow {
    /// 새 동기화 윈도우를 생성합니다.
    pub fn new(code: FundCode, days: usize, as_of: NaiveDate) -> Self {
        Self { code, days, as_of }
    }
}

/// 동기화 결과 데이터의 출처.
///
/// `Synthetic`은 합성 데이터 표시이며, 호출자가 실데이터와 섞어 쓰지
/// 못하도록 결과에 항상 명시됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    /// 스토어만으로 충족 (원격 호출 없음)
    Store,
    /// 스토어 + 원격 데이터 병합
    Merged,
    /// 원격 실패, 스토어 보유분만 반환
    StoreOnly,
    /// 원격 전용 (스토어 불가용)
    ProviderOnly,
    /// 스토어와 원격 모두 불가용, 합성 데이터
    Synthetic,
}

impl DataOrigin {
    /// 실데이터 여부.
    pub fn is_authoritative(&self) -> bool {
        !matches!(self, DataOrigin::Synthetic)
    }
}

/// 한 번의 동기화 결과.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// 펀드 코드
    pub code: FundCode,
    /// 정규화된 결과: 날짜 내림차순, 중복 없음, 길이 ≤ N
    pub bars: Vec<DailyBar>,
    /// 델타셋: 스토어에 없던 새 행
    pub delta: Vec<DailyBar>,
    /// 스토어에 기록된 행 수
    pub persisted: usize,
    /// 누락으로 판정되었던 거래일 (갭 감지 결과)
    pub missing_dates: Vec<NaiveDate>,
    /// 데이터 출처
    pub origin: DataOrigin,
}

impl SyncReport {
    /// 갭 없이 스토어만으로 충족되었는지 여부.
    pub fn already_synced(&self) -> bool {
        self.origin == DataOrigin::Store && self.missing_dates.is_empty()
    }
}
