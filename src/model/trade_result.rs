#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeResult {
    Winner,
    Expense,
    BreakEven,
}
