//! 데이터 동기화 및 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - 일별 가격 원장과 원격 소스를 조정하는 동기화 엔진
//! - PostgreSQL 저장소 (가격/추정치 원장)
//! - Redis 단기 TTL 캐싱
//! - Eastmoney 원격 데이터 provider
//! - 실시간 추정치 서비스 (cache-aside)
//! - 양쪽 계층 불가용 시의 합성 데이터 폴백

pub mod error;
pub mod fallback;
pub mod provider;
pub mod service;
pub mod storage;
pub mod sync;

pub use error::{DataError, Result};

// 저장소 타입 재내보내기
pub use storage::postgres::{Database, DatabaseConfig, EstimateRepository, FundHistoryRepository};
pub use storage::redis::{CacheStats, RedisCache, RedisConfig};
pub use storage::{EstimateStore, HistoryStore, NoopCache, SnapshotCache};

// provider 재내보내기
pub use provider::{BarProvider, EastmoneyClient, ProviderConfig};

// 동기화 엔진 재내보내기
pub use sync::{expected_trading_days, merge_bars, missing_dates, MergeOutcome, SyncEngine};

// 추정치 서비스 재내보내기
pub use service::{EstimateService, EstimateSnapshot, HealthStatus};
