use std::fmt;

use rust_decimal::Decimal;

use super::price::Price;

pub type OrderId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// A market order. There are no limit orders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub side: OrderSide,
    pub size: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderStatus {
    Submitted,
    Accepted,
    Completed { price: Price },
    Canceled,
    /// Not enough cash to cover the order.
    Margin,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderEvent {
    pub order: Order,
    pub status: OrderStatus,
    /// Timestamp of the bar on which the status changed.
    pub timestamp: i64,
}
