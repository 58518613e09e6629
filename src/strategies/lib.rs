use rust_decimal::Decimal;

use crate::model::price::Price;

/// Close rose more than `buy_trigger` percent over the previous close.
pub fn is_entry_trigger(close: Price, previous_close: Price, buy_trigger: Decimal) -> bool {
    close > previous_close.plus_pct(buy_trigger)
}

pub fn is_take_profit(close: Price, entry: Price, take_profit: Decimal) -> bool {
    close > entry.plus_pct(take_profit)
}

pub fn is_stop_loss(close: Price, entry: Price, stop_loss: Decimal) -> bool {
    close < entry.minus_pct(stop_loss)
}
