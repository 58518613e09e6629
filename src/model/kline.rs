use serde::Deserialize;

/// Raw Binance kline. The REST API returns each one as a 12-element array,
/// deserialized positionally.
#[derive(Debug, Clone, Deserialize)]
pub struct Kline {
    pub open_time: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub close_time: i64,
    pub quote_asset_volume: String,
    pub number_of_trades: u64,
    pub taker_buy_base_asset_volume: String,
    pub taker_buy_quote_asset_volume: String,
    pub ignore: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_rest_array() {
        let raw = r#"[[1609459200000,"736.42000000","739.00000000","735.10000000","738.50000000","1020.5",1609459259999,"752000.1",712,"500.2","368000.3","0"]]"#;
        let klines: Vec<Kline> = serde_json::from_str(raw).unwrap();
        assert_eq!(klines.len(), 1);
        assert_eq!(klines[0].open_time, 1609459200000);
        assert_eq!(klines[0].close, "738.50000000");
        assert_eq!(klines[0].close_time, 1609459259999);
        assert_eq!(klines[0].number_of_trades, 712);
    }
}
