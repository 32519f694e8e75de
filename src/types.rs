use serde::{Deserialize, Deserializer, Serialize};

use crate::endpoints::HostProfile;

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type Result<T> = std::result::Result<T, DynError>;

/// Chain id assumed when the connected provider reports none (56 = BSC mainnet).
pub const DEFAULT_CHAIN_ID: u64 = 56;

#[derive(Clone)]
pub struct Config {
    /// Hostname the feed is served from; drives backend selection.
    pub hostname: String,
    pub chain_id: Option<u64>,
    /// Forces a deployment target, bypassing hostname matching.
    pub profile_override: Option<HostProfile>,
    pub csv_file: String,
}

/// Accepts a JSON string or number and keeps it as its raw text; anything
/// else (null, objects) collapses to the empty string. The backend is not
/// consistent about quoting numeric fields, so the feed cannot be either.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Envelope every API route wraps its payload in.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

/// One element of the `/poolBaseInfo` response array. The wire object also
/// carries an `index` field; batch position is authoritative, so it is
/// ignored here.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolBaseInfoRes {
    pub pool_data: RawPoolData,
}

/// Raw pool record as served by the backend. All numeric values are
/// fixed-point integers encoded as decimal strings; the scale differs per
/// field (see `utils::PoolField`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPoolData {
    #[serde(deserialize_with = "string_or_number")]
    pub state: String,
    #[serde(deserialize_with = "string_or_number")]
    pub max_supply: String,
    #[serde(deserialize_with = "string_or_number")]
    pub lend_supply: String,
    #[serde(deserialize_with = "string_or_number")]
    pub borrow_supply: String,
    #[serde(deserialize_with = "string_or_number")]
    pub interest_rate: String,
    #[serde(deserialize_with = "string_or_number")]
    pub martgage_rate: String,
    #[serde(deserialize_with = "string_or_number")]
    pub auto_liquidate_threshold: String,
    #[serde(deserialize_with = "string_or_number")]
    pub settle_time: String,
    #[serde(deserialize_with = "string_or_number")]
    pub end_time: String,
    #[serde(deserialize_with = "string_or_number")]
    pub lend_token: String,
    #[serde(deserialize_with = "string_or_number")]
    pub borrow_token: String,
    pub borrow_token_info: TokenInfo,
    pub lend_token_info: TokenInfo,
}

/// Token metadata nested under a pool record, for either market side.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(deserialize_with = "string_or_number")]
    pub token_logo: String,
    #[serde(deserialize_with = "string_or_number")]
    pub token_name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub token_price: String,
}

/// One element of the `/poolDataInfo` response array.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolDataInfoRes {
    pub pool_data: RawSettlementData,
}

/// Per-pool settlement state, six 18-decimals amounts. The `Amoun` spelling
/// in the liquidation fields is the wire format and must not be corrected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSettlementData {
    #[serde(deserialize_with = "string_or_number")]
    pub settle_amount_lend: String,
    #[serde(deserialize_with = "string_or_number")]
    pub settle_amount_borrow: String,
    #[serde(deserialize_with = "string_or_number")]
    pub finish_amount_lend: String,
    #[serde(deserialize_with = "string_or_number")]
    pub finish_amount_borrow: String,
    #[serde(rename = "liquidationAmounLend", deserialize_with = "string_or_number")]
    pub liquidation_amount_lend: String,
    #[serde(rename = "liquidationAmounBorrow", deserialize_with = "string_or_number")]
    pub liquidation_amount_borrow: String,
}

/// Display-ready pool record. Every numeric field is finite regardless of
/// how malformed the raw input was; `key` is 1-based and only stable within
/// the batch it was derived from.
#[derive(Debug, Clone, Serialize)]
pub struct PoolMetrics {
    pub key: usize,
    pub state: i64,
    pub underlying_asset: String,
    pub fixed_rate: f64,
    pub max_supply: f64,
    pub borrow_supply: f64,
    pub lend_supply: f64,
    pub settlement_date: String,
    pub length: i64,
    pub margin_ratio: f64,
    pub collateralization_ratio: f64,
    pub pool_name: String,
    pub end_time: i64,
    pub settle_time: i64,
    pub logo: String,
    pub lend_token: String,
    pub borrow_token: String,
    pub borrow_price: f64,
    pub lend_price: f64,
}

/// Human-scaled settlement amounts derived from `RawSettlementData`.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementAmounts {
    pub settle_amount_lend: f64,
    pub settle_amount_borrow: f64,
    pub finish_amount_lend: f64,
    pub finish_amount_borrow: f64,
    pub liquidation_amount_lend: f64,
    pub liquidation_amount_borrow: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_record_accepts_mixed_string_and_number_fields() {
        let raw = serde_json::json!({
            "index": 0,
            "pool_data": {
                "pool_id": 1,
                "state": 1,
                "maxSupply": "1000000000000000000000",
                "settleTime": "1672531200",
                "endTime": 1675123200u64,
                "borrowTokenInfo": { "tokenName": "BTC", "tokenPrice": 30000 },
                "lendTokenInfo": { "tokenName": "BUSD", "tokenPrice": "1" }
            }
        });

        let record: PoolBaseInfoRes = serde_json::from_value(raw).unwrap();
        assert_eq!(record.pool_data.state, "1");
        assert_eq!(record.pool_data.max_supply, "1000000000000000000000");
        assert_eq!(record.pool_data.end_time, "1675123200");
        assert_eq!(record.pool_data.borrow_token_info.token_price, "30000");
        assert_eq!(record.pool_data.lend_token_info.token_price, "1");
        // Fields the backend omitted decode as empty strings.
        assert_eq!(record.pool_data.lend_token, "");
        assert_eq!(record.pool_data.borrow_supply, "");
    }

    #[test]
    fn pool_record_tolerates_null_fields() {
        let raw = serde_json::json!({ "pool_data": { "state": null } });
        let record: PoolBaseInfoRes = serde_json::from_value(raw).unwrap();
        assert_eq!(record.pool_data.state, "");
        assert_eq!(record.pool_data.borrow_token_info.token_name, "");
    }

    #[test]
    fn envelope_with_null_data_decodes() {
        let body = r#"{"code":0,"message":"success","data":null}"#;
        let response: ApiResponse<Vec<PoolBaseInfoRes>> = serde_json::from_str(body).unwrap();
        assert_eq!(response.code, Some(0));
        assert!(response.data.is_none());
    }

    #[test]
    fn settlement_record_keeps_wire_typo() {
        let raw = serde_json::json!({
            "pool_data": {
                "settleAmountLend": "5000000000000000000",
                "liquidationAmounLend": "1000000000000000000"
            }
        });
        let record: PoolDataInfoRes = serde_json::from_value(raw).unwrap();
        assert_eq!(record.pool_data.settle_amount_lend, "5000000000000000000");
        assert_eq!(record.pool_data.liquidation_amount_lend, "1000000000000000000");
    }
}
