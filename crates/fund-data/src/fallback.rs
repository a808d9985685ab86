//! 합성 데이터 폴백 생성기.
//!
//! 스토어와 원격 소스가 모두 불가용일 때만 사용하는 마지막 수단입니다.
//! 고정 시드로 생성되므로 호출마다 동일한 시계열이 나오며, 결과는
//! 항상 `DataOrigin::Synthetic`으로 표시되어 실데이터와 섞이지
//! 않습니다.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::warn;

use fund_core::DailyBar;

/// 고정 랜덤 시드. 재현 가능한 시계열을 위해 고정합니다.
const SEED: u64 = 42;

/// 기준일 이전 영업일(주중)로 길이 N의 합성 시계열을 생성합니다.
///
/// 등락률은 -3% ~ +5% 균등분포, 종가는 100에서 시작하는 누적 경로,
/// 시가/고가/저가는 종가 주변의 작은 섭동입니다. 날짜 내림차순으로
/// 반환합니다.
pub fn synthetic_series(as_of: NaiveDate, days: usize) -> Vec<DailyBar> {
    warn!(as_of = %as_of, days = days, "스토어와 원격 모두 불가용, 합성 시계열 생성");

    let mut rng = StdRng::seed_from_u64(SEED);

    // 기준일 이전의 주중 날짜를 오래된 순으로 수집
    let mut dates = Vec::with_capacity(days);
    let mut cursor = as_of;
    while dates.len() < days {
        if !matches!(cursor.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(cursor);
        }
        cursor -= Duration::days(1);
    }
    dates.reverse();

    let mut close = 100.0_f64;
    let mut bars: Vec<DailyBar> = dates
        .into_iter()
        .map(|date| {
            let change: f64 = rng.gen_range(-3.0..5.0);
            close *= 1.0 + change / 100.0;

            let open = close * (1.0 + rng.gen_range(-0.01..0.01));
            let high = close * (1.0 + rng.gen_range(0.0..0.02));
            let low = close * (1.0 - rng.gen_range(0.0..0.02));
            let volume = rng.gen_range(100_000..500_000);

            DailyBar {
                date,
                open: to_decimal(open),
                close: to_decimal(close),
                high: to_decimal(high),
                low: to_decimal(low),
                change_percent: to_decimal(change),
                volume,
                turnover: Decimal::ZERO,
            }
        })
        .collect();

    bars.sort_by(|a, b| b.date.cmp(&a.date));
    bars
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp(4)
}
