pub mod lib;
pub mod threshold;

use crate::broker::Broker;
use crate::model::bar::Bar;
use crate::model::order::OrderEvent;

/// Bar-by-bar callbacks driven by a backtest.
pub trait Strategy {
    /// Called once per bar, in feed order, after pending orders have been
    /// executed and reported.
    fn next<B: Broker>(&mut self, bar: &Bar, broker: &mut B);

    /// Called for every order lifecycle change.
    fn notify_order(&mut self, event: &OrderEvent);
}
