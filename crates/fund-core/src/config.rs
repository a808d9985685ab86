//! 설정 관리.
//!
//! 애플리케이션 수준 설정을 정의합니다. 스토리지/캐시 연결 설정은
//! 각 구성 요소가 자체 Config 타입으로 가지며, 여기서는 파일과
//! 환경 변수에서 로드 가능한 공통 설정을 다룹니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 동기화 설정
    #[serde(default)]
    pub sync: SyncSettings,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 동기화 동작 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncSettings {
    /// 기본 동기화 윈도우 (거래일 수)
    pub window_days: usize,
    /// 추정치 캐시 TTL (초)
    pub estimate_ttl_secs: u64,
    /// 원격 조회 타임아웃 (초)
    pub provider_timeout_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            window_days: 30,
            estimate_ttl_secs: 30,
            provider_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수는 `FUND__` 접두사로 파일 값을 오버라이드합니다
    /// (예: `FUND__SYNC__WINDOW_DAYS=60`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("FUND")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
