//! 펀드 코드 타입.
//!
//! 국내 펀드/ETF 코드는 6자리 숫자입니다 (예: "513100", "000001").
//! 생성 시점에 형식을 검증하여 이후 단계에서는 항상 유효한 코드만 다룹니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 잘못된 펀드 코드.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid fund code: {0} (expected 6 digits)")]
pub struct InvalidFundCode(pub String);

/// 검증된 6자리 펀드 코드.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FundCode(String);

impl FundCode {
    /// 문자열에서 펀드 코드를 생성합니다.
    ///
    /// 정확히 6자리 ASCII 숫자만 허용합니다.
    pub fn new(code: impl Into<String>) -> Result<Self, InvalidFundCode> {
        let code = code.into();
        if code.len() == 6 && code.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(code))
        } else {
            Err(InvalidFundCode(code))
        }
    }

    /// 내부 문자열을 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FundCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FundCode {
    type Error = InvalidFundCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FundCode> for String {
    fn from(code: FundCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for FundCode {
    type Err = InvalidFundCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_codes() {
        assert!(FundCode::new("513100").is_ok());
        assert!(FundCode::new("000001").is_ok());
    }

    #[test]
    fn test_invalid_codes() {
        assert!(FundCode::new("51310").is_err());
        assert!(FundCode::new("5131000").is_err());
        assert!(FundCode::new("51310a").is_err());
        assert!(FundCode::new("").is_err());
        assert!(FundCode::new("AAPL").is_err());
    }

    #[test]
    fn test_display() {
        let code = FundCode::new("513100").unwrap();
        assert_eq!(code.to_string(), "513100");
        assert_eq!(code.as_str(), "513100");
    }
}
