use crate::types::PoolMetrics;

/// Pool-list status views. `Live` is everything not yet settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Live,
    All,
    Finished,
}

pub fn filter_by_status(rows: Vec<PoolMetrics>, filter: StatusFilter) -> Vec<PoolMetrics> {
    match filter {
        StatusFilter::All => rows,
        StatusFilter::Live => rows.into_iter().filter(|row| row.state < 1).collect(),
        StatusFilter::Finished => rows.into_iter().filter(|row| row.state >= 1).collect(),
    }
}

/// Lend-token tabs of the pool list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTab {
    Busd,
    Usdt,
    Dai,
    Plgr,
}

impl TokenTab {
    /// Lend-token contract addresses grouped under each tab. USDT lists a
    /// single empty string: pools with no lend token set land on that tab.
    pub fn lend_token_addresses(self) -> &'static [&'static str] {
        match self {
            TokenTab::Busd => &[
                "0xe9e7CEA3DedcA5984780Bafc599bD69ADd087D56",
                "0xE676Dcd74f44023b95E0E2C6436C97991A7497DA",
            ],
            TokenTab::Usdt => &[""],
            TokenTab::Dai => &[
                "0x1AF3F329e8BE154074D8769D1FFa4eE058B1DBc3",
                "0x490BC3FCc845d37C1686044Cd2d6589585DE9B8B",
            ],
            TokenTab::Plgr => &["0x6Aa91CbfE045f9D154050226fCc830ddbA886CED"],
        }
    }
}

/// Keeps rows whose lend token belongs to the tab. An empty address list
/// means the tab is unfiltered.
pub fn filter_by_lend_token(rows: Vec<PoolMetrics>, tab: TokenTab) -> Vec<PoolMetrics> {
    let addresses = tab.lend_token_addresses();
    if addresses.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| addresses.contains(&row.lend_token.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: usize, state: i64, lend_token: &str) -> PoolMetrics {
        PoolMetrics {
            key,
            state,
            underlying_asset: String::new(),
            fixed_rate: 0.0,
            max_supply: 0.0,
            borrow_supply: 0.0,
            lend_supply: 0.0,
            settlement_date: String::new(),
            length: 0,
            margin_ratio: 0.0,
            collateralization_ratio: 0.0,
            pool_name: String::new(),
            end_time: 0,
            settle_time: 0,
            logo: String::new(),
            lend_token: lend_token.to_string(),
            borrow_token: String::new(),
            borrow_price: 0.0,
            lend_price: 1.0,
        }
    }

    #[test]
    fn status_filter_partitions_on_state() {
        let rows = vec![record(1, 0, ""), record(2, 1, ""), record(3, 2, "")];

        let live = filter_by_status(rows.clone(), StatusFilter::Live);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].key, 1);

        let finished = filter_by_status(rows.clone(), StatusFilter::Finished);
        let keys: Vec<usize> = finished.iter().map(|row| row.key).collect();
        assert_eq!(keys, vec![2, 3]);

        assert_eq!(filter_by_status(rows, StatusFilter::All).len(), 3);
    }

    #[test]
    fn token_filter_matches_tab_addresses() {
        let busd = "0xe9e7CEA3DedcA5984780Bafc599bD69ADd087D56";
        let plgr = "0x6Aa91CbfE045f9D154050226fCc830ddbA886CED";
        let rows = vec![record(1, 0, busd), record(2, 0, plgr), record(3, 0, "0xdead")];

        let filtered = filter_by_lend_token(rows.clone(), TokenTab::Busd);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].key, 1);

        let filtered = filter_by_lend_token(rows, TokenTab::Plgr);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].key, 2);
    }

    #[test]
    fn usdt_tab_only_matches_blank_lend_tokens() {
        let rows = vec![record(1, 0, ""), record(2, 0, "0xdead")];
        let filtered = filter_by_lend_token(rows, TokenTab::Usdt);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].key, 1);
    }
}
