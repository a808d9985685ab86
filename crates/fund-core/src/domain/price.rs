//! 일별 시세 타입.
//!
//! - `DailyBar`: 데이터 소스에서 받은 하루치 원시 시세
//! - `PricePoint`: 영속 스토어가 소유하는 레코드 (생성/수정 시각 포함)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FundCode;

/// 하루치 원시 시세.
///
/// 데이터 소스(원격 API)와 병합기 사이를 오가는 형태로,
/// 영속 계층의 타임스탬프를 가지지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Decimal,
    /// 종가
    pub close: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 등락률 (%)
    pub change_percent: Decimal,
    /// 거래량
    pub volume: i64,
    /// 거래대금
    pub turnover: Decimal,
}

/// 영속 스토어의 일별 가격 레코드.
///
/// (fund_code, trade_date)별로 유일합니다. 최초 upsert 시 생성되고
/// 같은 키로 재 upsert되면 숫자 필드만 덮어쓰며 `created_at`은
/// 보존되고 `updated_at`만 갱신됩니다. 이 서브시스템은 레코드를
/// 삭제하지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    /// 펀드 코드
    pub fund_code: FundCode,
    /// 거래일 (fund_code와 함께 유일 키)
    pub trade_date: NaiveDate,
    /// 시가
    pub open: Decimal,
    /// 종가
    pub close: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 등락률 (%)
    pub change_percent: Decimal,
    /// 거래량
    pub volume: i64,
    /// 거래대금
    pub turnover: Decimal,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 마지막 수정 시각
    pub updated_at: DateTime<Utc>,
}

impl PricePoint {
    /// 영속 타임스탬프를 제외한 시세 부분을 DailyBar로 변환합니다.
    pub fn to_bar(&self) -> DailyBar {
        DailyBar {
            date: self.trade_date,
            open: self.open,
            close: self.close,
            high: self.high,
            low: self.low,
            change_percent: self.change_percent,
            volume: self.volume,
            turnover: self.turnover,
        }
    }
}
