//! 실시간 추정치 서비스.
//!
//! 추정치 조회의 읽기 경로는 cache-aside입니다: cache 히트면 즉시
//! 반환하고, 미스면 원격에서 가져와 원장에 best-effort로 기록한 뒤
//! cache를 재충전합니다. cache 계층의 어떤 실패도 결과를 바꾸지
//! 않으며 지연만 늘립니다.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use fund_core::{FundCode, FundEstimate};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::provider::BarProvider;
use crate::storage::{CacheStats, EstimateStore, SnapshotCache};

/// 추정치 cache 네임스페이스.
const ESTIMATE_NAMESPACE: &str = "fund_estimate";

/// cache에 직렬화되는 스냅샷 페이로드.
#[derive(Debug, Serialize, Deserialize)]
struct CachedSnapshot {
    #[serde(flatten)]
    estimate: FundEstimate,
    #[serde(rename = "cachedAt")]
    cached_at: DateTime<Utc>,
}

/// 추정치 조회 결과.
#[derive(Debug, Clone)]
pub struct EstimateSnapshot {
    pub estimate: FundEstimate,
    /// cache 히트 여부
    pub cached: bool,
}

/// 서비스 상태 요약.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub storage: bool,
    pub cache: bool,
    pub cache_stats: CacheStats,
}

/// 실시간 추정치 서비스.
///
/// 모든 협력자는 생성 시 주입됩니다. 전역 싱글톤 핸들은 없습니다.
pub struct EstimateService {
    store: Arc<dyn EstimateStore>,
    cache: Arc<dyn SnapshotCache>,
    provider: Arc<dyn BarProvider>,
    ttl_secs: u64,
}

impl EstimateService {
    pub fn new(
        store: Arc<dyn EstimateStore>,
        cache: Arc<dyn SnapshotCache>,
        provider: Arc<dyn BarProvider>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            store,
            cache,
            provider,
            ttl_secs,
        }
    }

    /// 단일 펀드의 실시간 추정치를 조회합니다.
    ///
    /// cache 미스 시 원격 조회 → 원장 기록(best-effort) → cache
    /// 재충전 순서로 진행합니다. 원격 실패 시 원장의 최근 추정치로
    /// degrade됩니다.
    #[instrument(skip(self))]
    pub async fn get_estimate(&self, raw_code: &str) -> Result<EstimateSnapshot> {
        let code = FundCode::new(raw_code)?;

        // 1. cache 시도 (실패는 미스로 취급)
        match self.cache.get_json(ESTIMATE_NAMESPACE, code.as_str()).await {
            Ok(Some(json)) => match serde_json::from_str::<CachedSnapshot>(&json) {
                Ok(snapshot) => {
                    debug!(code = %code, "추정치 cache 히트");
                    return Ok(EstimateSnapshot {
                        estimate: snapshot.estimate,
                        cached: true,
                    });
                }
                Err(e) => {
                    warn!(code = %code, error = %e, "cache 페이로드 역직렬화 실패, 미스로 처리");
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(code = %code, error = %e, "cache 조회 실패, 원격 직행");
            }
        }

        // 2. 원격 조회
        let estimate = match self.provider.fetch_estimate(&code).await {
            Ok(estimate) => estimate,
            Err(e) if e.is_provider_unavailable() => {
                warn!(code = %code, error = %e, "원격 불가용, 원장의 최근 추정치로 degrade");
                return match self.store.latest_estimate(&code).await? {
                    Some(estimate) => Ok(EstimateSnapshot {
                        estimate,
                        cached: false,
                    }),
                    None => Err(e),
                };
            }
            Err(e) => return Err(e),
        };

        // 3. 원장 기록은 best-effort
        if let Err(e) = self.store.save_estimate(&estimate).await {
            warn!(code = %code, error = %e, "추정치 원장 기록 실패");
        }

        // 4. cache 재충전
        let payload = CachedSnapshot {
            estimate: estimate.clone(),
            cached_at: Utc::now(),
        };
        match serde_json::to_string(&payload) {
            Ok(json) => {
                self.cache
                    .set_json(ESTIMATE_NAMESPACE, code.as_str(), &json, self.ttl_secs)
                    .await;
            }
            Err(e) => {
                warn!(code = %code, error = %e, "cache 페이로드 직렬화 실패");
            }
        }

        info!(code = %code, nav = %estimate.estimate_nav, "추정치 조회 완료");

        Ok(EstimateSnapshot {
            estimate,
            cached: false,
        })
    }

    /// 여러 펀드의 추정치를 병렬 조회합니다.
    ///
    /// 개별 실패는 격리됩니다. 실패한 코드는 결과에서 빠지고 로그로
    /// 남습니다.
    pub async fn get_estimates(&self, codes: &[String]) -> HashMap<String, EstimateSnapshot> {
        let futures = codes.iter().map(|code| async move {
            (code.clone(), self.get_estimate(code).await)
        });

        let mut results = HashMap::new();
        for (code, result) in join_all(futures).await {
            match result {
                Ok(snapshot) => {
                    results.insert(code, snapshot);
                }
                Err(e) => {
                    warn!(code = %code, error = %e, "배치 조회에서 개별 실패");
                }
            }
        }
        results
    }

    /// 최근 N일의 추정치 이력을 조회합니다.
    pub async fn estimate_history(&self, raw_code: &str, days: i64) -> Result<Vec<FundEstimate>> {
        let code = FundCode::new(raw_code)?;
        self.store.history(&code, days).await
    }

    /// 추정치 cache를 비우고 삭제된 키 수를 반환합니다.
    pub async fn clear_cache(&self) -> Result<usize> {
        let removed = self.cache.clear_prefix(ESTIMATE_NAMESPACE).await?;
        info!(removed = removed, "추정치 cache 초기화");
        Ok(removed)
    }

    /// 스토리지와 cache의 상태를 보고합니다.
    pub async fn health(&self) -> HealthStatus {
        let storage = self.store.ping().await;
        let cache_stats = self.cache.stats().await;
        let cache = self
            .cache
            .get_json(ESTIMATE_NAMESPACE, "__health__")
            .await
            .is_ok();

        HealthStatus {
            storage,
            cache,
            cache_stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cached_snapshot_shape() {
        let code = FundCode::new("513100").unwrap();
        let at = Utc::now();
        let payload = CachedSnapshot {
            estimate: FundEstimate::from_nav(code, dec!(1.5010), dec!(0.60), at),
            cached_at: at,
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"estimateNav\""));
        assert!(json.contains("\"estimateChange\""));
        assert!(json.contains("\"cachedAt\""));

        let back: CachedSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.estimate.estimate_nav, dec!(1.5010));
    }
}
