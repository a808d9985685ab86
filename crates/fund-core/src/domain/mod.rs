//! 도메인 모델.
//!
//! - `FundCode`: 검증된 6자리 펀드 코드
//! - `DailyBar` / `PricePoint`: 일별 시세와 영속 레코드
//! - `FundEstimate`: 실시간 추정치 스냅샷
//! - `SyncWindow` / `SyncReport`: 동기화 요청과 결과

pub mod estimate;
pub mod fund_code;
pub mod price;
pub mod sync;

pub use estimate::{parse_percent, FundEstimate};
pub use fund_code::{FundCode, InvalidFundCode};
pub use price::{DailyBar, PricePoint};
pub use sync::{DataOrigin, SyncReport, SyncWindow};
