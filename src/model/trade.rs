use std::fmt;

use rust_decimal::Decimal;

use crate::model::price::Price;
use crate::to_utc_time;

use super::trade_result::TradeResult;

/// A closed long round trip.
#[derive(Clone, Copy, PartialEq)]
pub struct Trade {
    pub open_time: i64,
    pub close_time: i64,
    pub entry: Price,
    pub exit: Price,
    pub size: Decimal,
    pub result: TradeResult,
}

impl Trade {
    pub fn close(open_time: i64, entry: Price, close_time: i64, exit: Price, size: Decimal) -> Trade {
        let result = if exit > entry {
            TradeResult::Winner
        } else if exit < entry {
            TradeResult::Expense
        } else {
            TradeResult::BreakEven
        };
        Trade {
            open_time,
            close_time,
            entry,
            exit,
            size,
            result,
        }
    }

    pub fn pnl(&self) -> Decimal {
        (self.exit - self.entry) * self.size
    }

    /// Return relative to entry, in percent. `None` for a zero entry price.
    pub fn return_pct(&self) -> Option<Decimal> {
        (self.exit - self.entry)
            .0
            .checked_div(self.entry.0)
            .map(|r| r * Decimal::ONE_HUNDRED)
    }
}

fn fmt_time(ts: i64) -> String {
    to_utc_time(ts)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

impl fmt::Debug for Trade {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Trade")
            .field("open_time", &fmt_time(self.open_time))
            .field("close_time", &fmt_time(self.close_time))
            .field("entry", &self.entry.0)
            .field("exit", &self.exit.0)
            .field("size", &self.size)
            .field("pnl", &self.pnl())
            .field("result", &self.result)
            .finish()
    }
}
