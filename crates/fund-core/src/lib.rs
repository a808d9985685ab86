//! # Fund Core
//!
//! 펀드 가치 추적 시스템의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 일별 시세 및 가격 레코드 구조체
//! - 실시간 추정치 스냅샷
//! - 펀드 코드 검증 타입
//! - 동기화 요청/결과 디스크립터
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use logging::*;
