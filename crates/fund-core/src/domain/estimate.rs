//! 실시간 추정치 스냅샷.
//!
//! 장중 펀드의 추정 순자산가치(NAV)와 등락 정보를 담는 스냅샷입니다.
//! 캐시 페이로드이자 외부 직렬화 형태(camelCase)이기도 합니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FundCode;

/// 펀드 실시간 추정치 스냅샷.
///
/// 캐시와 추정치 원장에 저장되는 단위입니다. 항상 새 조회로
/// 재파생 가능하므로 캐시에서 사라져도 데이터 손실이 아닙니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundEstimate {
    /// 펀드 코드
    pub code: FundCode,
    /// 추정 순자산가치 (소수 4자리)
    pub estimate_nav: Decimal,
    /// 추정 등락률 (%, 소수 2자리)
    pub estimate_change: Decimal,
    /// 추정 등락액 (소수 4자리)
    pub estimate_change_amount: Decimal,
    /// 추정 시각
    pub estimate_time: DateTime<Utc>,
    /// 갱신 시각
    pub update_time: DateTime<Utc>,
}

impl FundEstimate {
    /// NAV와 등락률로 스냅샷을 생성합니다.
    ///
    /// 등락액은 `nav * rate / (100 + rate)`로 파생하며 소수 4자리로
    /// 반올림합니다. 등락률은 소수 2자리로 반올림합니다.
    pub fn from_nav(code: FundCode, nav: Decimal, change_percent: Decimal, at: DateTime<Utc>) -> Self {
        Self {
            code,
            estimate_nav: nav.round_dp(4),
            estimate_change: change_percent.round_dp(2),
            estimate_change_amount: change_amount(nav, change_percent),
            estimate_time: at,
            update_time: at,
        }
    }
}

/// 등락액 계산.
///
/// 등락액 = 현재 NAV / (1 + 등락률/100) * 등락률/100.
/// NAV 또는 등락률이 0이면 0을 반환합니다.
pub fn change_amount(nav: Decimal, change_percent: Decimal) -> Decimal {
    if nav.is_zero() || change_percent.is_zero() {
        return Decimal::ZERO;
    }
    let denominator = Decimal::ONE_HUNDRED + change_percent;
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    (nav * change_percent / denominator).round_dp(4)
}

/// 퍼센트 문자열을 Decimal로 파싱합니다.
///
/// 데이터 소스는 "0.65%", "-0.03%" 같은 문자열이나 값이 없을 때
/// "---"를 반환합니다. 파싱할 수 없으면 0을 반환합니다.
pub fn parse_percent(raw: &str) -> Decimal {
    let trimmed = raw.trim().trim_end_matches('%');
    if trimmed.is_empty() || trimmed == "---" {
        return Decimal::ZERO;
    }
    trimmed.parse().unwrap_or(Decimal::ZERO)
}
