use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::broker::Broker;
use crate::config::StrategyConfig;
use crate::model::bar::Bar;
use crate::model::order::{OrderEvent, OrderId, OrderSide, OrderStatus};
use crate::model::position::PositionState;
use crate::model::price::Price;
use crate::to_utc_time;

use super::lib::{is_entry_trigger, is_stop_loss, is_take_profit};
use super::Strategy;

/// Long-only momentum entry with fixed take-profit and stop-loss exits.
///
/// Flat: buy `trade_size` when the close beats the previous close by more
/// than `buy_trigger` %. Long: sell the whole position once the close is
/// above entry by more than `take_profit` % or below it by more than
/// `stop_loss` %. While an order is unresolved nothing new is submitted.
pub struct ThresholdStrategy {
    config: StrategyConfig,
    pending: Option<OrderId>,
    previous_close: Option<Price>,
}

fn bar_date(timestamp: i64) -> Option<NaiveDate> {
    to_utc_time(timestamp).map(|t| t.date_naive())
}

impl ThresholdStrategy {
    pub fn new(config: StrategyConfig) -> Self {
        ThresholdStrategy {
            config,
            pending: None,
            previous_close: None,
        }
    }

    pub fn pending_order(&self) -> Option<OrderId> {
        self.pending
    }

    /// The order the rules call for at `close`, ignoring the pending guard.
    pub fn decide(
        &self,
        close: Price,
        previous_close: Option<Price>,
        position: PositionState,
    ) -> Option<(OrderSide, Decimal)> {
        match position {
            PositionState::Flat => previous_close
                .filter(|&prev| is_entry_trigger(close, prev, self.config.buy_trigger))
                .map(|_| (OrderSide::Buy, self.config.trade_size)),
            PositionState::Long {
                entry_price, size, ..
            } => {
                let exit = is_take_profit(close, entry_price, self.config.take_profit)
                    || is_stop_loss(close, entry_price, self.config.stop_loss);
                exit.then_some((OrderSide::Sell, size))
            }
        }
    }
}

impl Strategy for ThresholdStrategy {
    fn next<B: Broker>(&mut self, bar: &Bar, broker: &mut B) {
        let date = bar_date(bar.timestamp);
        debug!(?date, close = %bar.close, "Close");

        let previous_close = self.previous_close.replace(bar.close);

        if let Some(id) = self.pending {
            debug!(?date, id, "order pending, skipping bar");
            return;
        }

        if let Some((side, size)) = self.decide(bar.close, previous_close, broker.position()) {
            info!(?date, close = %bar.close, "{side} CREATE");
            self.pending = Some(broker.submit_order(side, size));
        }
    }

    fn notify_order(&mut self, event: &OrderEvent) {
        let date = bar_date(event.timestamp);
        match event.status {
            OrderStatus::Submitted | OrderStatus::Accepted => return,
            OrderStatus::Completed { price } => {
                info!(?date, price = %price, size = %event.order.size, "{} EXECUTED", event.order.side)
            }
            OrderStatus::Canceled | OrderStatus::Margin | OrderStatus::Rejected => {
                warn!(?date, id = event.order.id, status = ?event.status, "Order Canceled/Margin/Rejected")
            }
        }

        if self.pending == Some(event.order.id) {
            self.pending = None;
        }
    }
}
