//! A single held position with weighted-average cost basis.

use chrono::NaiveDate;

/// Quantities at or below this are treated as zero when deciding whether a
/// position still exists (absorbs float residue from capped sells).
pub const QTY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub quantity: f64,
    pub avg_cost: f64,
    pub last_buy_date: Option<NaiveDate>,
    pub last_sell_date: Option<NaiveDate>,
}

impl Holding {
    /// Open a new position from a first buy.
    pub fn open(symbol: &str, quantity: f64, price: f64, date: NaiveDate) -> Self {
        Holding {
            symbol: symbol.to_string(),
            quantity,
            avg_cost: price,
            last_buy_date: Some(date),
            last_sell_date: None,
        }
    }

    /// Add to the position, recomputing the quantity-weighted average cost.
    /// Sells never touch the basis; only buys do.
    pub fn apply_buy(&mut self, quantity: f64, price: f64, date: NaiveDate) {
        let new_quantity = self.quantity + quantity;
        self.avg_cost = (self.quantity * self.avg_cost + quantity * price) / new_quantity;
        self.quantity = new_quantity;
        self.last_buy_date = Some(date);
    }

    /// Reduce the position. The caller caps `quantity` at the held amount;
    /// the decrement is clamped so quantity can never go negative.
    pub fn apply_sell(&mut self, quantity: f64, date: NaiveDate) {
        self.quantity = (self.quantity - quantity).max(0.0);
        self.last_sell_date = Some(date);
    }

    /// True once the position has been sold down to nothing.
    pub fn is_depleted(&self) -> bool {
        self.quantity <= QTY_EPSILON
    }

    pub fn book_cost(&self) -> f64 {
        self.quantity * self.avg_cost
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.market_value(price) - self.book_cost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn open_sets_basis_to_first_price() {
        let h = Holding::open("AAPL", 0.05, 100.0, date(2026, 8, 3));
        assert_eq!(h.symbol, "AAPL");
        assert_relative_eq!(h.quantity, 0.05);
        assert_relative_eq!(h.avg_cost, 100.0);
        assert_eq!(h.last_buy_date, Some(date(2026, 8, 3)));
        assert_eq!(h.last_sell_date, None);
    }

    #[test]
    fn buy_recomputes_weighted_average() {
        let mut h = Holding::open("AAPL", 1.0, 100.0, date(2026, 8, 3));
        h.apply_buy(1.0, 200.0, date(2026, 8, 4));
        assert_relative_eq!(h.quantity, 2.0);
        assert_relative_eq!(h.avg_cost, 150.0);
        assert_eq!(h.last_buy_date, Some(date(2026, 8, 4)));
    }

    #[test]
    fn buy_weighted_by_quantity() {
        // 3 units @ 10 plus 1 unit @ 30 -> (30 + 30) / 4 = 15
        let mut h = Holding::open("MSFT", 3.0, 10.0, date(2026, 8, 3));
        h.apply_buy(1.0, 30.0, date(2026, 8, 4));
        assert_relative_eq!(h.avg_cost, 15.0);
    }

    #[test]
    fn sell_leaves_basis_untouched() {
        let mut h = Holding::open("AAPL", 2.0, 150.0, date(2026, 8, 3));
        h.apply_sell(0.5, date(2026, 8, 5));
        assert_relative_eq!(h.quantity, 1.5);
        assert_relative_eq!(h.avg_cost, 150.0);
        assert_eq!(h.last_sell_date, Some(date(2026, 8, 5)));
    }

    #[test]
    fn sell_clamps_at_zero() {
        let mut h = Holding::open("AAPL", 1.0, 150.0, date(2026, 8, 3));
        h.apply_sell(1.0 + 1e-12, date(2026, 8, 5));
        assert!(h.quantity >= 0.0);
        assert!(h.is_depleted());
    }

    #[test]
    fn depleted_after_full_sell() {
        let mut h = Holding::open("AAPL", 0.05, 100.0, date(2026, 8, 3));
        assert!(!h.is_depleted());
        h.apply_sell(0.05, date(2026, 8, 5));
        assert!(h.is_depleted());
    }

    #[test]
    fn valuation_methods() {
        let h = Holding::open("AAPL", 2.0, 50.0, date(2026, 8, 3));
        assert_relative_eq!(h.book_cost(), 100.0);
        assert_relative_eq!(h.market_value(60.0), 120.0);
        assert_relative_eq!(h.unrealized_pnl(60.0), 20.0);
        assert_relative_eq!(h.unrealized_pnl(40.0), -20.0);
    }
}
