//! Eastmoney API 클라이언트.
//!
//! 동방재부(Eastmoney) 공개 엔드포인트에서 펀드 데이터를 수집합니다.
//!
//! # 지원 데이터
//!
//! - 일별 K선 (시가/종가/고가/저가, 거래량, 거래대금, 등락률)
//! - 실시간 NAV 추정치 (jsonpgz 포맷)
//!
//! K선 응답은 쉼표로 연결된 문자열 배열이며, 추정치 응답은
//! `jsonpgz({...});` 형태의 JSONP 래퍼입니다.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use fund_core::{parse_percent, DailyBar, FundCode, FundEstimate};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{DataError, Result};
use crate::provider::BarProvider;

/// Provider 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// K선 API base URL
    #[serde(default = "default_kline_base")]
    pub kline_base_url: String,
    /// 추정치 API base URL
    #[serde(default = "default_estimate_base")]
    pub estimate_base_url: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_kline_base() -> String {
    "https://push2his.eastmoney.com".to_string()
}
fn default_estimate_base() -> String {
    "https://fundgz.1234567.com.cn".to_string()
}
fn default_timeout() -> u64 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kline_base_url: default_kline_base(),
            estimate_base_url: default_estimate_base(),
            timeout_secs: default_timeout(),
        }
    }
}

/// K선 API 응답 래퍼.
#[derive(Debug, Deserialize)]
struct KlineResponse {
    data: Option<KlineData>,
}

#[derive(Debug, Deserialize)]
struct KlineData {
    #[serde(default)]
    klines: Vec<String>,
}

/// jsonpgz 추정치 페이로드.
#[derive(Debug, Deserialize)]
struct EstimatePayload {
    fundcode: String,
    /// 추정 NAV
    gsz: String,
    /// 추정 등락률 (%)
    gszzl: String,
    /// 추정 시각 (yyyy-MM-dd HH:mm)
    gztime: String,
}

/// Eastmoney API 클라이언트.
#[derive(Clone)]
pub struct EastmoneyClient {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl EastmoneyClient {
    /// 새로운 Eastmoney 클라이언트 생성.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DataError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 시장 접두어가 붙은 secid를 반환합니다.
    ///
    /// 상하이 상장(5/6으로 시작)은 `1.`, 그 외는 `0.` 접두어입니다.
    fn secid(code: &FundCode) -> String {
        let prefix = match code.as_str().as_bytes().first() {
            Some(b'5') | Some(b'6') => "1",
            _ => "0",
        };
        format!("{}.{}", prefix, code)
    }

    /// 쉼표로 연결된 K선 문자열을 일별 시세로 파싱합니다.
    ///
    /// 필드 순서: 날짜, 시가, 종가, 고가, 저가, 거래량, 거래대금,
    /// 진폭, 등락률, 등락액, 회전율. 관용 없이 파싱합니다: 숫자
    /// 필드가 하나라도 깨져 있으면 레코드 전체를 거부합니다.
    fn parse_kline(raw: &str) -> Result<DailyBar> {
        let fields: Vec<&str> = raw.split(',').collect();
        if fields.len() < 9 {
            return Err(DataError::Parse(format!("짧은 K선 레코드: {}", raw)));
        }

        let date = NaiveDate::parse_from_str(fields[0], "%Y-%m-%d")
            .map_err(|e| DataError::Parse(format!("K선 날짜 파싱 실패 {}: {}", fields[0], e)))?;

        let decimal = |idx: usize| -> Result<Decimal> {
            Decimal::from_str(fields[idx])
                .map_err(|e| DataError::Parse(format!("K선 숫자 파싱 실패 {}: {}", fields[idx], e)))
        };

        Ok(DailyBar {
            date,
            open: decimal(1)?,
            close: decimal(2)?,
            high: decimal(3)?,
            low: decimal(4)?,
            volume: i64::from_str(fields[5])
                .map_err(|e| DataError::Parse(format!("K선 거래량 파싱 실패 {}: {}", fields[5], e)))?,
            turnover: decimal(6)?,
            change_percent: decimal(8)?,
        })
    }
}

#[async_trait]
impl BarProvider for EastmoneyClient {
    #[instrument(skip(self))]
    async fn fetch_daily_bars(
        &self,
        code: &FundCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        let url = format!("{}/api/qt/stock/kline/get", self.config.kline_base_url);
        let secid = Self::secid(code);
        let beg = start.format("%Y%m%d").to_string();
        let fin = end.format("%Y%m%d").to_string();

        let mut params = HashMap::new();
        params.insert("secid", secid.as_str());
        params.insert("fields1", "f1,f2,f3,f4,f5,f6");
        params.insert(
            "fields2",
            "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61",
        );
        params.insert("klt", "101");
        params.insert("fqt", "1");
        params.insert("beg", beg.as_str());
        params.insert("end", fin.as_str());

        debug!(code = %code, secid = %secid, beg = %beg, end = %fin, "K선 요청");

        let response = self.client.get(&url).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(DataError::Fetch(format!(
                "K선 API 오류 [{}]: HTTP {}",
                code,
                response.status()
            )));
        }

        let body: KlineResponse = response.json().await?;

        let klines = match body.data {
            Some(data) if !data.klines.is_empty() => data.klines,
            _ => {
                return Err(DataError::EmptyResult(format!(
                    "{} 구간 {} ~ {} K선 없음",
                    code, start, end
                )))
            }
        };

        let bars = klines
            .iter()
            .map(|raw| Self::parse_kline(raw))
            .collect::<Result<Vec<_>>>()?;

        debug!(code = %code, count = bars.len(), "K선 수신");

        Ok(bars)
    }

    #[instrument(skip(self))]
    async fn fetch_estimate(&self, code: &FundCode) -> Result<FundEstimate> {
        let url = format!("{}/js/{}.js", self.config.estimate_base_url, code);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(DataError::Fetch(format!(
                "추정치 API 오류 [{}]: HTTP {}",
                code,
                response.status()
            )));
        }

        let body = response.text().await?;

        // jsonpgz({...}); 래퍼 제거
        let json = body
            .trim()
            .strip_prefix("jsonpgz(")
            .and_then(|s| s.strip_suffix(");"))
            .ok_or_else(|| DataError::Parse(format!("jsonpgz 래퍼 아님: {}", body)))?;

        if json.is_empty() {
            return Err(DataError::EmptyResult(format!("{} 추정치 없음", code)));
        }

        let payload: EstimatePayload =
            serde_json::from_str(json).map_err(|e| DataError::Parse(e.to_string()))?;

        if payload.fundcode != code.as_str() {
            return Err(DataError::Parse(format!(
                "응답 코드 불일치: 요청 {} 응답 {}",
                code, payload.fundcode
            )));
        }

        let nav = Decimal::from_str(&payload.gsz)
            .map_err(|e| DataError::Parse(format!("추정 NAV 파싱 실패 {}: {}", payload.gsz, e)))?;
        let change = parse_percent(&payload.gszzl);

        let at = NaiveDateTime::parse_from_str(&payload.gztime, "%Y-%m-%d %H:%M")
            .map(|naive| naive.and_utc())
            .unwrap_or_else(|_| Utc::now());

        Ok(FundEstimate::from_nav(code.clone(), nav, change, at))
    }
}
