use chrono::{NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use tracing::info;

use crate::broker::{Broker, SimBroker};
use crate::config::{RunConfig, StrategyConfig};
use crate::error::Result;
use crate::model::backtest_result::BacktestResult;
use crate::model::bar::Bar;
use crate::model::order::{OrderEvent, OrderSide, OrderStatus};
use crate::model::position::PositionState;
use crate::model::trade::Trade;
use crate::model::trading_model::TradingModel;
use crate::strategies::threshold::ThresholdStrategy;
use crate::strategies::Strategy;

/// Bars whose open time lies in `[from, to]`, both taken as UTC.
pub fn in_window(bars: Vec<Bar>, from: NaiveDateTime, to: NaiveDateTime) -> Vec<Bar> {
    let from = Utc.from_utc_datetime(&from).timestamp_millis();
    let to = Utc.from_utc_datetime(&to).timestamp_millis();
    bars.into_iter()
        .filter(|b| b.timestamp >= from && b.timestamp <= to)
        .collect()
}

/// Backtests the threshold strategy over the part of `bars` inside the
/// configured window.
pub fn run(config: &RunConfig, bars: Vec<Bar>) -> Result<BacktestResult> {
    let (from, to) = config.window()?;
    let s = &config.strategy;
    let strategy = StrategyConfig::new(s.trade_size, s.take_profit, s.stop_loss, s.buy_trigger)?;
    let bars = in_window(bars, from, to);
    let mut backtest = Backtest::new(bars, ThresholdStrategy::new(strategy), config.account_balance);
    Ok(backtest.execute())
}

/// Replays `bars` through `strategy` against a `SimBroker`.
pub struct Backtest<S: Strategy> {
    pub bars: Vec<Bar>,
    pub strategy: S,
    pub cash: Decimal,
}

impl<S: Strategy> Backtest<S> {
    pub fn new(bars: Vec<Bar>, strategy: S, cash: Decimal) -> Self {
        Backtest {
            bars,
            strategy,
            cash,
        }
    }

    /// Hands `events` to the strategy, recording fills and the trades they
    /// close. `before` is the broker position prior to the first event.
    fn deliver(
        &mut self,
        events: Vec<OrderEvent>,
        before: PositionState,
        fills: &mut Vec<OrderEvent>,
        trades: &mut Vec<Trade>,
    ) {
        let mut position = before;
        for event in events {
            if let OrderStatus::Completed { price } = event.status {
                if let (OrderSide::Sell, PositionState::Long { entry_price, open_time, .. }) =
                    (event.order.side, position)
                {
                    trades.push(Trade::close(
                        open_time,
                        entry_price,
                        event.timestamp,
                        price,
                        event.order.size,
                    ));
                }
                position = match event.order.side {
                    OrderSide::Buy => position.bought(price, event.order.size, event.timestamp),
                    OrderSide::Sell => position.sold(event.order.size),
                };
                fills.push(event);
            }
            self.strategy.notify_order(&event);
        }
    }
}

impl<S: Strategy> TradingModel for Backtest<S> {
    fn execute(&mut self) -> BacktestResult {
        let mut broker = SimBroker::new(self.cash);
        let mut fills: Vec<OrderEvent> = vec![];
        let mut trades: Vec<Trade> = vec![];

        info!(cash = %self.cash, bars = self.bars.len(), "Starting Portfolio Value");

        let bars = std::mem::take(&mut self.bars);
        for bar in &bars {
            broker.set_time(bar.timestamp);

            let queued = broker.drain_events();
            self.deliver(queued, broker.position(), &mut fills, &mut trades);

            let before = broker.position();
            let executed = broker.execute_pending(bar);
            self.deliver(executed, before, &mut fills, &mut trades);

            self.strategy.next(bar, &mut broker);
        }
        let queued = broker.drain_events();
        self.deliver(queued, broker.position(), &mut fills, &mut trades);

        let final_value = bars
            .last()
            .map(|b| broker.value(b.close))
            .unwrap_or_else(|| broker.cash());
        self.bars = bars;

        info!(value = %final_value, trades = trades.len(), "Final Portfolio Value");

        BacktestResult {
            trades,
            fills,
            starting_value: self.cash,
            final_value,
        }
    }
}
