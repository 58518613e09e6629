use rust_decimal::Decimal;
use tracing::debug;

use crate::model::bar::Bar;
use crate::model::order::{Order, OrderEvent, OrderId, OrderSide, OrderStatus};
use crate::model::position::PositionState;
use crate::model::price::Price;

/// What a strategy may ask of whoever executes its orders.
pub trait Broker {
    /// Queues a market order and returns its id. Execution is reported later
    /// through `OrderEvent`s.
    fn submit_order(&mut self, side: OrderSide, size: Decimal) -> OrderId;

    fn position(&self) -> PositionState;
}

/// Single-asset simulated broker. Market orders fill at the open of the bar
/// after submission, with no commission or slippage.
pub struct SimBroker {
    cash: Decimal,
    position: PositionState,
    pending: Vec<Order>,
    events: Vec<OrderEvent>,
    next_id: OrderId,
    now: i64,
}

impl SimBroker {
    pub fn new(cash: Decimal) -> Self {
        SimBroker {
            cash,
            position: PositionState::Flat,
            pending: Vec::new(),
            events: Vec::new(),
            next_id: 1,
            now: 0,
        }
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    /// Cash plus the held size marked at `close`.
    pub fn value(&self, close: Price) -> Decimal {
        self.cash + close * self.position.size()
    }

    /// Marks the start of a new bar. Orders submitted from here on carry its
    /// timestamp.
    pub fn set_time(&mut self, timestamp: i64) {
        self.now = timestamp;
    }

    /// Events queued since the last drain, in the order they happened.
    pub fn drain_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.events)
    }

    /// Fills every queued order at `bar.open` and returns the resulting
    /// final events.
    pub fn execute_pending(&mut self, bar: &Bar) -> Vec<OrderEvent> {
        self.now = bar.timestamp;
        let orders = std::mem::take(&mut self.pending);
        orders
            .into_iter()
            .map(|order| {
                let status = self.execute(&order, bar.open);
                debug!(id = order.id, side = %order.side, ?status, "order executed");
                OrderEvent {
                    order,
                    status,
                    timestamp: bar.timestamp,
                }
            })
            .collect()
    }

    fn execute(&mut self, order: &Order, price: Price) -> OrderStatus {
        if order.size <= Decimal::ZERO {
            return OrderStatus::Rejected;
        }
        match order.side {
            OrderSide::Buy => {
                let cost = price * order.size;
                if cost > self.cash {
                    return OrderStatus::Margin;
                }
                self.cash -= cost;
                self.position = self.position.bought(price, order.size, self.now);
            }
            OrderSide::Sell => {
                if order.size > self.position.size() {
                    return OrderStatus::Rejected;
                }
                self.cash += price * order.size;
                self.position = self.position.sold(order.size);
            }
        }
        OrderStatus::Completed { price }
    }
}

impl Broker for SimBroker {
    fn submit_order(&mut self, side: OrderSide, size: Decimal) -> OrderId {
        let order = Order {
            id: self.next_id,
            side,
            size,
        };
        self.next_id += 1;
        self.pending.push(order);
        for status in [OrderStatus::Submitted, OrderStatus::Accepted] {
            self.events.push(OrderEvent {
                order,
                status,
                timestamp: self.now,
            });
        }
        order.id
    }

    fn position(&self) -> PositionState {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(timestamp: i64, open: i64) -> Bar {
        Bar {
            timestamp,
            high: Price::new(open),
            low: Price::new(open),
            open: Price::new(open),
            close: Price::new(open),
        }
    }

    #[test]
    fn test_submit_queues_and_reports_submitted_accepted() {
        let mut broker = SimBroker::new(Decimal::from(1000));
        let id = broker.submit_order(OrderSide::Buy, Decimal::ONE);
        let events = broker.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].status, OrderStatus::Submitted);
        assert_eq!(events[1].status, OrderStatus::Accepted);
        assert!(events.iter().all(|e| e.order.id == id));
        assert!(broker.drain_events().is_empty());
        assert!(broker.position().is_flat());
    }

    #[test]
    fn test_buy_fills_at_next_open() {
        let mut broker = SimBroker::new(Decimal::from(1000));
        broker.submit_order(OrderSide::Buy, Decimal::from(2));
        let events = broker.execute_pending(&bar(60, 100));

        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].status,
            OrderStatus::Completed {
                price: Price::new(100)
            }
        );
        assert_eq!(broker.cash(), Decimal::from(800));
        assert_eq!(
            broker.position(),
            PositionState::Long {
                entry_price: Price::new(100),
                size: Decimal::from(2),
                open_time: 60
            }
        );
        assert_eq!(broker.value(Price::new(110)), Decimal::from(1020));
    }

    #[test]
    fn test_buy_without_cash_is_margin() {
        let mut broker = SimBroker::new(Decimal::from(50));
        broker.submit_order(OrderSide::Buy, Decimal::ONE);
        let events = broker.execute_pending(&bar(0, 100));
        assert_eq!(events[0].status, OrderStatus::Margin);
        assert!(broker.position().is_flat());
        assert_eq!(broker.cash(), Decimal::from(50));
    }

    #[test]
    fn test_sell_while_flat_is_rejected() {
        let mut broker = SimBroker::new(Decimal::from(1000));
        broker.submit_order(OrderSide::Sell, Decimal::ONE);
        let events = broker.execute_pending(&bar(0, 100));
        assert_eq!(events[0].status, OrderStatus::Rejected);
        assert_eq!(broker.cash(), Decimal::from(1000));
    }

    #[test]
    fn test_round_trip_returns_to_flat() {
        let mut broker = SimBroker::new(Decimal::from(1000));
        broker.submit_order(OrderSide::Buy, Decimal::ONE);
        broker.execute_pending(&bar(0, 100));
        broker.submit_order(OrderSide::Sell, Decimal::ONE);
        broker.execute_pending(&bar(60, 111));
        assert!(broker.position().is_flat());
        assert_eq!(broker.cash(), Decimal::from(1011));
    }
}
