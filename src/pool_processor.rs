use std::fs::OpenOptions;
use std::sync::Arc;

use log::{info, warn};
use serde::de::DeserializeOwned;
use url::Url;

use crate::endpoints::{self, Endpoint};
use crate::filters::{filter_by_lend_token, filter_by_status, StatusFilter, TokenTab};
use crate::types::{
    ApiResponse, Config, PoolBaseInfoRes, PoolDataInfoRes, PoolMetrics, RawSettlementData, Result,
    SettlementAmounts, DEFAULT_CHAIN_ID,
};
use crate::utils::{
    borrow_capacity_percent, coerce_i64, coerce_or, format_timestamp, from_decimals, scale_field,
    term_days, to_thousands, utilization_percent, PoolField, SETTLE_AMOUNT_DECIMALS,
};

/// Pulls raw pool records from the backend API and turns them into
/// display-ready metrics.
pub struct PoolProcessor {
    config: Arc<Config>,
    client: reqwest::Client,
}

impl PoolProcessor {
    pub fn new(config: &Config) -> Self {
        Self {
            config: Arc::new(config.clone()),
            client: reqwest::Client::new(),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.config.chain_id.unwrap_or(DEFAULT_CHAIN_ID)
    }

    fn endpoint_url(&self, endpoint: Endpoint, chain_id: u64) -> Result<Url> {
        let base = match self.config.profile_override {
            Some(profile) => profile.url_for(endpoint),
            None => endpoints::resolve(endpoint, &self.config.hostname),
        };
        let url = Url::parse_with_params(&base, &[("chainId", chain_id.to_string())])?;
        Ok(url)
    }

    async fn fetch_endpoint<T>(&self, endpoint: Endpoint, chain_id: u64) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint_url(endpoint, chain_id)?;
        info!("[PoolProcessor::fetch_endpoint] GET {}", url);

        let response: ApiResponse<Vec<T>> = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(code) = response.code {
            if code != 0 {
                warn!(
                    "[PoolProcessor::fetch_endpoint] API returned code {}: {}",
                    code,
                    response.message.unwrap_or_default()
                );
            }
        }

        Ok(response.data.unwrap_or_default())
    }

    pub async fn fetch_pool_base_info(&self, chain_id: u64) -> Result<Vec<PoolBaseInfoRes>> {
        self.fetch_endpoint(Endpoint::PoolBaseInfo, chain_id).await
    }

    pub async fn fetch_pool_data_info(&self, chain_id: u64) -> Result<Vec<PoolDataInfoRes>> {
        self.fetch_endpoint(Endpoint::PoolDataInfo, chain_id).await
    }

    /// One full cycle: fetch both routes, derive metrics, append a CSV
    /// snapshot, log a per-pool summary.
    pub async fn run(&self) -> Result<()> {
        let chain_id = self.chain_id();
        let (base_info, data_info) = futures::future::try_join(
            self.fetch_pool_base_info(chain_id),
            self.fetch_pool_data_info(chain_id),
        )
        .await?;

        if base_info.is_empty() {
            warn!("[PoolProcessor::run] Chain {} returned no pools", chain_id);
        }

        let metrics = derive_batch(&base_info);
        info!(
            "[PoolProcessor::run] Derived {} pool records for chain {}",
            metrics.len(),
            chain_id
        );

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.csv_file)?;
        let mut writer = csv::Writer::from_writer(file);

        for record in &metrics {
            writer.serialize(record)?;
            info!(
                "[PoolProcessor::run] pool {} {} rate {}% utilization {:.2}% capacity {:.2}% lend {} / {}",
                record.key,
                record.underlying_asset,
                record.fixed_rate,
                utilization_percent(record.lend_supply, record.max_supply),
                borrow_capacity_percent(
                    record.borrow_supply,
                    record.borrow_price,
                    record.lend_price,
                    record.collateralization_ratio,
                    record.max_supply,
                ),
                to_thousands(record.lend_supply),
                to_thousands(record.max_supply),
            );
        }
        writer.flush()?;

        let live = filter_by_status(metrics.clone(), StatusFilter::Live);
        let live_busd = filter_by_lend_token(live, TokenTab::Busd);
        info!(
            "[PoolProcessor::run] {} of {} pools live on the BUSD tab",
            live_busd.len(),
            metrics.len()
        );

        for (ordinal, item) in data_info.iter().enumerate() {
            let amounts = derive_settlement_amounts(&item.pool_data);
            info!(
                "[PoolProcessor::run] pool {} settled lend {} borrow {}",
                ordinal + 1,
                to_thousands(amounts.settle_amount_lend),
                to_thousands(amounts.settle_amount_borrow),
            );
        }

        info!(
            "[PoolProcessor::run] Snapshot written to {}",
            self.config.csv_file
        );
        Ok(())
    }
}

/// Maps one raw record to its display metrics. Total: malformed numeric
/// input degrades to zero per field, it never errors. `ordinal` is the
/// record's position in the source batch; `key` is `ordinal + 1`.
pub fn derive_pool_metrics(item: &PoolBaseInfoRes, ordinal: usize) -> PoolMetrics {
    let pool = &item.pool_data;
    let settle_time = coerce_i64(&pool.settle_time);
    let end_time = coerce_i64(&pool.end_time);

    PoolMetrics {
        key: ordinal + 1,
        state: coerce_i64(&pool.state),
        underlying_asset: pool.borrow_token_info.token_name.clone(),
        fixed_rate: scale_field(&pool.interest_rate, PoolField::InterestRate),
        max_supply: scale_field(&pool.max_supply, PoolField::MaxSupply),
        borrow_supply: scale_field(&pool.borrow_supply, PoolField::BorrowSupply),
        lend_supply: scale_field(&pool.lend_supply, PoolField::LendSupply),
        settlement_date: format_timestamp(settle_time),
        length: term_days(settle_time, end_time),
        margin_ratio: scale_field(&pool.auto_liquidate_threshold, PoolField::AutoLiquidateThreshold),
        collateralization_ratio: scale_field(&pool.martgage_rate, PoolField::MartgageRate),
        pool_name: pool.lend_token_info.token_name.clone(),
        end_time,
        settle_time,
        logo: pool.borrow_token_info.token_logo.clone(),
        lend_token: pool.lend_token.clone(),
        borrow_token: pool.borrow_token.clone(),
        // Lend side falls back to 1, not 0: downstream capacity ratios
        // divide by it.
        borrow_price: coerce_or(&pool.borrow_token_info.token_price, 0.0),
        lend_price: coerce_or(&pool.lend_token_info.token_price, 1.0),
    }
}

/// Derives a whole batch, preserving input order (`key - 1` recovers the
/// position). Records are independent of each other.
pub fn derive_batch(items: &[PoolBaseInfoRes]) -> Vec<PoolMetrics> {
    items
        .iter()
        .enumerate()
        .map(|(ordinal, item)| derive_pool_metrics(item, ordinal))
        .collect()
}

pub fn derive_settlement_amounts(raw: &RawSettlementData) -> SettlementAmounts {
    SettlementAmounts {
        settle_amount_lend: from_decimals(&raw.settle_amount_lend, SETTLE_AMOUNT_DECIMALS),
        settle_amount_borrow: from_decimals(&raw.settle_amount_borrow, SETTLE_AMOUNT_DECIMALS),
        finish_amount_lend: from_decimals(&raw.finish_amount_lend, SETTLE_AMOUNT_DECIMALS),
        finish_amount_borrow: from_decimals(&raw.finish_amount_borrow, SETTLE_AMOUNT_DECIMALS),
        liquidation_amount_lend: from_decimals(&raw.liquidation_amount_lend, SETTLE_AMOUNT_DECIMALS),
        liquidation_amount_borrow: from_decimals(&raw.liquidation_amount_borrow, SETTLE_AMOUNT_DECIMALS),
    }
}
