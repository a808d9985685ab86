//! 원격 데이터 Provider 모듈.
//!
//! 외부 시세 소스에서 일별 가격과 실시간 추정치를 가져옵니다.
//!
//! Provider는 순수 읽기 계층입니다. 재시도하지 않고, 저장하지
//! 않으며, 요청된 연속 구간을 한 번에 조회할 뿐입니다. 타임아웃과
//! 빈 응답은 그대로 오류로 보고되고 복구 전략은 상위 계층의
//! 몫입니다.

pub mod eastmoney;

use async_trait::async_trait;
use chrono::NaiveDate;
use fund_core::{DailyBar, FundCode, FundEstimate};

use crate::error::Result;
pub use eastmoney::{EastmoneyClient, ProviderConfig};

/// 일별 시세 및 추정치 소스 trait.
#[async_trait]
pub trait BarProvider: Send + Sync {
    /// 연속 날짜 구간의 일별 시세를 조회합니다.
    ///
    /// 구간 내 휴장일은 응답에서 빠질 수 있습니다. 데이터가 전혀
    /// 없으면 `EmptyResult`, 응답 지연은 `Timeout`으로 실패합니다.
    async fn fetch_daily_bars(
        &self,
        code: &FundCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>>;

    /// 실시간 NAV 추정치를 조회합니다.
    async fn fetch_estimate(&self, code: &FundCode) -> Result<FundEstimate>;
}
