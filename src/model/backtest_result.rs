use std::fmt;

use rust_decimal::Decimal;

use super::{order::OrderEvent, trade::Trade, trade_result::TradeResult};

pub struct BacktestResult {
    pub trades: Vec<Trade>,
    /// Every completed order, in execution order.
    pub fills: Vec<OrderEvent>,
    pub starting_value: Decimal,
    pub final_value: Decimal,
}

impl BacktestResult {
    pub fn number_of_trades(&self) -> usize {
        self.trades.len()
    }

    pub fn result(&self, tr: TradeResult) -> usize {
        self.trades.iter().filter(|x| x.result == tr).count()
    }

    pub fn realized_pnl(&self) -> Decimal {
        self.trades.iter().map(|x| x.pnl()).sum()
    }

    pub fn total_return_pct(&self) -> Decimal {
        if self.starting_value.is_zero() {
            return Decimal::ZERO;
        }
        (self.final_value - self.starting_value) / self.starting_value * Decimal::ONE_HUNDRED
    }
}

impl fmt::Debug for BacktestResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("BacktestResult")
            .field("trades", &self.trades)
            .field("number_of_trades", &self.number_of_trades())
            .field("winners", &self.result(TradeResult::Winner))
            .field("expenses", &self.result(TradeResult::Expense))
            .field("break_evens", &self.result(TradeResult::BreakEven))
            .field("realized_pnl", &self.realized_pnl())
            .field("starting_value", &self.starting_value)
            .field("final_value", &self.final_value)
            .finish()
    }
}
