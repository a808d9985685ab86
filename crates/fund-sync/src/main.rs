//! Standalone sync CLI.
//!
//! 동기화 엔진과 추정치 서비스를 명령줄에서 구동합니다. 모든 협력자
//! (DB, Redis, 원격 provider)는 여기서 조립되어 주입되며 비즈니스
//! 로직은 전부 `fund-data`에 있습니다.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use fund_core::{init_logging, AppConfig, FundCode, SyncWindow};
use fund_data::{
    Database, DatabaseConfig, EastmoneyClient, EstimateRepository, EstimateService,
    FundHistoryRepository, NoopCache, ProviderConfig, RedisCache, RedisConfig, SnapshotCache,
    SyncEngine,
};

#[derive(Parser)]
#[command(name = "fund-sync")]
#[command(about = "Fundwatch data synchronization CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로
    #[arg(long, default_value = "config/default.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 일별 가격 원장을 원격 소스와 동기화
    Sync {
        /// 펀드 코드 (6자리)
        code: String,

        /// 동기화 윈도우 (거래일 수, 미지정 시 설정값)
        #[arg(long)]
        days: Option<usize>,
    },

    /// 실시간 추정치 조회
    Estimate {
        /// 펀드 코드 (공백으로 구분하여 여러 개 지정 가능)
        codes: Vec<String>,
    },

    /// 추정치 이력 조회
    History {
        /// 펀드 코드
        code: String,

        /// 조회 일수
        #[arg(long, default_value = "7")]
        days: i64,
    },

    /// 추정치 cache 비우기
    ClearCache,

    /// 스토리지/cache 상태 점검
    Health,

    /// 데이터베이스 마이그레이션 실행
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("설정 로드 실패: {}", cli.config))?;
    init_logging(&config.logging).map_err(|e| anyhow!("로깅 초기화 실패: {}", e))?;

    info!("fund-sync 시작");

    let db_config = DatabaseConfig {
        url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| DatabaseConfig::default().url),
        ..DatabaseConfig::default()
    };
    let db = Database::connect(&db_config).await?;

    match cli.command {
        Commands::Sync { code, days } => {
            let code = FundCode::new(code)?;
            let days = days.unwrap_or(config.sync.window_days);

            let provider = provider(&config)?;
            let store = Arc::new(FundHistoryRepository::new(db));
            let engine = SyncEngine::new(store, Arc::new(provider));

            let window = SyncWindow::new(code, days, Utc::now().date_naive());
            let report = engine.sync(&window).await?;

            println!(
                "{}: {}행 (출처 {:?}, 신규 {}, 기록 {}, 누락이었던 날짜 {})",
                report.code,
                report.bars.len(),
                report.origin,
                report.delta.len(),
                report.persisted,
                report.missing_dates.len()
            );
            if !report.origin.is_authoritative() {
                println!("경고: 합성 데이터입니다. 실데이터가 아닙니다.");
            }
        }

        Commands::Estimate { codes } => {
            if codes.is_empty() {
                return Err(anyhow!("펀드 코드를 하나 이상 지정하세요"));
            }

            let service = estimate_service(&config, db).await?;
            let results = service.get_estimates(&codes).await;

            for code in &codes {
                match results.get(code) {
                    Some(snapshot) => println!(
                        "{}: NAV {} ({}%) {}",
                        code,
                        snapshot.estimate.estimate_nav,
                        snapshot.estimate.estimate_change,
                        if snapshot.cached { "[cached]" } else { "" }
                    ),
                    None => println!("{}: 조회 실패", code),
                }
            }
        }

        Commands::History { code, days } => {
            let service = estimate_service(&config, db).await?;
            let rows = service.estimate_history(&code, days).await?;

            for row in rows {
                println!(
                    "{}  NAV {}  {}%",
                    row.estimate_time.format("%Y-%m-%d %H:%M"),
                    row.estimate_nav,
                    row.estimate_change
                );
            }
        }

        Commands::ClearCache => {
            let service = estimate_service(&config, db).await?;
            let removed = service.clear_cache().await?;
            println!("삭제된 cache 키: {}", removed);
        }

        Commands::Health => {
            let service = estimate_service(&config, db).await?;
            let health = service.health().await;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }

        Commands::Migrate => {
            db.migrate().await?;
            println!("마이그레이션 완료");
        }
    }

    Ok(())
}

fn provider(config: &AppConfig) -> Result<EastmoneyClient> {
    let provider_config = ProviderConfig {
        timeout_secs: config.sync.provider_timeout_secs,
        ..ProviderConfig::default()
    };
    Ok(EastmoneyClient::new(provider_config)?)
}

async fn estimate_service(config: &AppConfig, db: Database) -> Result<EstimateService> {
    let redis_config = RedisConfig {
        url: std::env::var("REDIS_URL").unwrap_or_else(|_| RedisConfig::default().url),
        default_ttl_secs: config.sync.estimate_ttl_secs,
    };
    // cache 불가용은 기동을 막지 않는다
    let cache: Arc<dyn SnapshotCache> = match RedisCache::connect(&redis_config).await {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            warn!(error = %e, "Redis 연결 실패, cache 없이 계속");
            Arc::new(NoopCache)
        }
    };

    let provider = provider(config)?;

    Ok(EstimateService::new(
        Arc::new(EstimateRepository::new(db)),
        cache,
        Arc::new(provider),
        config.sync.estimate_ttl_secs,
    ))
}
