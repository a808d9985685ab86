//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
///
/// `Cache` 계열은 치명적이지 않으며 호출 지점에서 항상 흡수됩니다
/// (캐시 없이 계속 진행). `Connection`/`Query`는 스토어 불가용,
/// `Fetch`/`Timeout`은 원격 소스 불가용을 의미하며 동기화 엔진의
/// 폴백 체인(스토어 → 원격 → 합성)을 구동합니다.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    Connection(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    Query(String),

    /// 데이터 삽입 오류
    #[error("Insert error: {0}")]
    Insert(String),

    /// 원격 데이터 가져오기 오류
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// 원격 조회 타임아웃
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// 원격 소스가 데이터를 반환하지 않음
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// 캐시 오류 (비치명적)
    #[error("Cache error: {0}")]
    Cache(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 잘못된 펀드 코드
    #[error("Invalid fund code: {0}")]
    InvalidFundCode(String),

    /// 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    Config(String),

    /// 연결 풀 소진
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DataError {
    /// 원격 소스 불가용 여부 (타임아웃 포함).
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(self, DataError::Fetch(_) | DataError::Timeout(_))
    }

    /// 스토어 불가용 여부.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(
            self,
            DataError::Connection(_)
                | DataError::Query(_)
                | DataError::Insert(_)
                | DataError::PoolExhausted
        )
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DataError::PoolExhausted,
            sqlx::Error::Io(e) => DataError::Connection(e.to_string()),
            sqlx::Error::Database(db_err) => DataError::Query(db_err.message().to_string()),
            _ => DataError::Query(err.to_string()),
        }
    }
}

impl From<redis::RedisError> for DataError {
    fn from(err: redis::RedisError) -> Self {
        DataError::Cache(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout(err.to_string())
        } else {
            DataError::Fetch(err.to_string())
        }
    }
}

impl From<fund_core::InvalidFundCode> for DataError {
    fn from(err: fund_core::InvalidFundCode) -> Self {
        DataError::InvalidFundCode(err.0)
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(DataError::Timeout("slow".into()).is_provider_unavailable());
        assert!(DataError::Fetch("down".into()).is_provider_unavailable());
        assert!(!DataError::Cache("down".into()).is_provider_unavailable());

        assert!(DataError::Connection("refused".into()).is_storage_unavailable());
        assert!(DataError::PoolExhausted.is_storage_unavailable());
        assert!(!DataError::EmptyResult("none".into()).is_storage_unavailable());
    }
}
