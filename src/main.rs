//! # Seaquote Service
//!
//! Main entry point for the quotation service: configuration, tracing,
//! REST server and the estimate expiry sweeper.

use seaquote::api::rest::{AppState, create_router};
use seaquote::application::services::assembler::QuotationAssembler;
use seaquote::application::services::calculation::CalculationEngine;
use seaquote::application::services::estimate::EstimateService;
use seaquote::application::services::quotation_service::QuotationService;
use seaquote::config::AppConfig;
use seaquote::domain::services::formula_evaluator::FormulaEvaluator;
use seaquote::domain::value_objects::Currency;
use seaquote::infrastructure::persistence::in_memory::{
    InMemoryFeeRuleRepository, InMemoryQuotationRepository, InMemoryRateTableRepository,
    InMemorySavedEstimateRepository,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    let subscriber = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log.level.clone())),
    );
    if config.log.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting seaquote v{}", env!("CARGO_PKG_VERSION"));

    let currency = Currency::new(&config.pricing.currency)
        .map_err(|e| anyhow::anyhow!("invalid currency in config: {e}"))?;
    let evaluator = FormulaEvaluator::new(config.pricing.max_formula_depth);
    let engine = CalculationEngine::new(evaluator, config.pricing.tax_rate, currency);

    let fee_rules = Arc::new(InMemoryFeeRuleRepository::new());
    let rates = Arc::new(InMemoryRateTableRepository::new());
    let quotations = Arc::new(InMemoryQuotationRepository::new());
    let estimates = Arc::new(InMemorySavedEstimateRepository::new());

    let quotation_service = QuotationService::new(
        fee_rules.clone(),
        rates.clone(),
        quotations,
        engine.clone(),
        QuotationAssembler::new(config.pricing.quote_validity_days),
    );
    let estimate_service = EstimateService::new(
        fee_rules,
        rates,
        estimates,
        engine,
        config.pricing.estimate_ttl_days,
    );

    // Background sweep for expired, unconverted estimates.
    let sweeper = estimate_service.clone();
    let sweep_interval = Duration::from_secs(config.pricing.sweep_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = sweeper.sweep_expired().await {
                error!(error = %e, "estimate sweep failed");
            }
        }
    });

    let state = Arc::new(AppState {
        quotations: quotation_service,
        estimates: estimate_service,
    });
    let router = create_router(state);

    let addr = config.rest_addr()?;
    info!(%addr, "REST server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down seaquote");
        })
        .await?;

    Ok(())
}
