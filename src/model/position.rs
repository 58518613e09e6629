use rust_decimal::Decimal;

use super::price::Price;

/// The single open position, if any. `Long` never carries a zero size: the
/// broker only builds it from a fill and collapses it to `Flat` when the
/// size reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long {
        entry_price: Price,
        size: Decimal,
        open_time: i64,
    },
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    pub fn size(&self) -> Decimal {
        match self {
            PositionState::Flat => Decimal::ZERO,
            PositionState::Long { size, .. } => *size,
        }
    }

    /// Position after buying `size` at `price`. Adds to an existing long at
    /// the size-weighted average price.
    pub fn bought(self, price: Price, size: Decimal, time: i64) -> PositionState {
        match self {
            PositionState::Flat => PositionState::Long {
                entry_price: price,
                size,
                open_time: time,
            },
            PositionState::Long {
                entry_price,
                size: held,
                open_time,
            } => {
                let total = held + size;
                PositionState::Long {
                    entry_price: Price((entry_price * held + price * size) / total),
                    size: total,
                    open_time,
                }
            }
        }
    }

    /// Position after selling `size`. Callers must not sell more than held.
    pub fn sold(self, size: Decimal) -> PositionState {
        match self {
            PositionState::Long {
                entry_price,
                size: held,
                open_time,
            } if held > size => PositionState::Long {
                entry_price,
                size: held - size,
                open_time,
            },
            _ => PositionState::Flat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_from_flat_opens_long() {
        let p = PositionState::Flat.bought(Price::new(100), Decimal::ONE, 7);
        assert_eq!(
            p,
            PositionState::Long {
                entry_price: Price::new(100),
                size: Decimal::ONE,
                open_time: 7
            }
        );
    }

    #[test]
    fn test_buy_averages_entry() {
        let p = PositionState::Flat
            .bought(Price::new(100), Decimal::ONE, 0)
            .bought(Price::new(110), Decimal::ONE, 1);
        assert_eq!(p.size(), Decimal::from(2));
        assert!(matches!(p, PositionState::Long { entry_price, open_time: 0, .. } if entry_price == Price::new(105)));
    }

    #[test]
    fn test_full_sell_goes_flat() {
        let p = PositionState::Flat.bought(Price::new(100), Decimal::ONE, 0);
        assert!(p.sold(Decimal::ONE).is_flat());
        assert_eq!(p.sold(Decimal::ONE).size(), Decimal::ZERO);
    }

    #[test]
    fn test_partial_sell_keeps_entry() {
        let p = PositionState::Flat.bought(Price::new(100), Decimal::from(3), 0);
        let p = p.sold(Decimal::ONE);
        assert_eq!(p.size(), Decimal::from(2));
        assert!(!p.is_flat());
    }
}
