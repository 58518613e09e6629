pub mod backtest_result;
pub mod bar;
pub mod interval;
pub mod kline;
pub mod order;
pub mod position;
pub mod price;
pub mod trade;
pub mod trade_result;
pub mod trading_model;
