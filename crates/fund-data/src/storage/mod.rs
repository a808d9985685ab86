//! 스토리지 레이어.
//!
//! - PostgreSQL: 일별 가격 원장과 추정치 원장 (내구 계층)
//! - Redis: 추정치 스냅샷의 단기 TTL 캐시 (휘발 계층)
//!
//! 두 계층은 서로 독립적인 생명주기를 가집니다. 캐시는 언제나
//! 재파생 가능하며 정확성에 기여하지 않습니다. 동기화 엔진과
//! 추정치 서비스는 아래 trait 경계를 통해서만 스토리지에
//! 접근하므로 테스트에서 인메모리 구현으로 대체할 수 있습니다.

pub mod postgres;
pub mod redis;

use async_trait::async_trait;
use chrono::NaiveDate;
use fund_core::{DailyBar, FundCode, FundEstimate, PricePoint};

use crate::error::{DataError, Result};
pub use postgres::{Database, DatabaseConfig, EstimateRepository, FundHistoryRepository};
pub use redis::{CacheStats, RedisCache, RedisConfig};

/// 일별 가격 원장 접근 trait.
///
/// (fund_code, trade_date) 유일성은 구현이 보장합니다.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// 날짜 범위의 가격 레코드를 날짜 내림차순으로 조회합니다.
    async fn query_range(
        &self,
        code: &FundCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>>;

    /// 시세를 일괄 upsert하고 기록된 행 수를 반환합니다.
    ///
    /// 멱등 연산입니다: 동일한 배치를 다시 제출해도 저장 값이
    /// 변하지 않으며 오류가 발생하지 않습니다. 기존 키의 행은
    /// 비키 필드만 덮어쓰고 `updated_at`을 갱신합니다.
    async fn upsert_batch(&self, code: &FundCode, bars: &[DailyBar]) -> Result<usize>;
}

/// 추정치 원장 접근 trait.
#[async_trait]
pub trait EstimateStore: Send + Sync {
    /// 추정치 스냅샷을 upsert합니다.
    async fn save_estimate(&self, estimate: &FundEstimate) -> Result<()>;

    /// 가장 최근 추정치를 조회합니다.
    async fn latest_estimate(&self, code: &FundCode) -> Result<Option<FundEstimate>>;

    /// 최근 N일의 추정치 이력을 조회합니다 (시각 내림차순).
    async fn history(&self, code: &FundCode, days: i64) -> Result<Vec<FundEstimate>>;

    /// 스토어 연결 상태를 확인합니다.
    async fn ping(&self) -> bool;
}

/// 네임스페이스 기반 TTL 캐시 trait.
///
/// 페이로드는 직렬화된 JSON 문자열입니다. `set`은 best-effort로,
/// 백엔드 불가용은 로그 후 `false`로 보고될 뿐 오류로 전파되지
/// 않습니다. 캐시를 비활성화해도 결과는 변하지 않고 지연만
/// 늘어납니다.
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    /// 캐시에서 값을 조회합니다. 미스는 `Ok(None)`입니다.
    async fn get_json(&self, namespace: &str, key: &str) -> Result<Option<String>>;

    /// TTL과 함께 값을 저장합니다. 성공 여부를 반환합니다.
    async fn set_json(&self, namespace: &str, key: &str, json: &str, ttl_secs: u64) -> bool;

    /// 키를 삭제합니다.
    async fn remove(&self, namespace: &str, key: &str) -> Result<bool>;

    /// 네임스페이스의 모든 키를 삭제하고 삭제 수를 반환합니다.
    async fn clear_prefix(&self, namespace: &str) -> Result<usize>;

    /// 운영 통계를 조회합니다.
    async fn stats(&self) -> CacheStats;
}

/// cache 백엔드가 없을 때 그 자리를 채우는 no-op 구현.
///
/// Redis 연결 실패는 서비스 기동을 막지 않아야 하므로, cache 자리에
/// 이것을 주입하면 모든 읽기 경로가 미스로 degrade됩니다. 조회류
/// 연산은 불가용 오류를 보고하고 쓰기는 조용히 버려집니다.
pub struct NoopCache;

#[async_trait]
impl SnapshotCache for NoopCache {
    async fn get_json(&self, _namespace: &str, _key: &str) -> Result<Option<String>> {
        Err(DataError::Cache("cache 백엔드 미연결".to_string()))
    }

    async fn set_json(&self, _namespace: &str, _key: &str, _json: &str, _ttl_secs: u64) -> bool {
        false
    }

    async fn remove(&self, _namespace: &str, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn clear_prefix(&self, _namespace: &str) -> Result<usize> {
        Err(DataError::Cache("cache 백엔드 미연결".to_string()))
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}
