//! # Sale Builder
//!
//! Accumulates product lines for a sale that has not been committed yet.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator Action          Builder Call             State Change         │
//! │  ───────────────          ────────────             ────────────         │
//! │                                                                         │
//! │  Pick product + qty ────► add(product, n) ───────► upsert line          │
//! │                                                   (price re-snapshot)   │
//! │  Lower quantity ────────► remove(id, n) ─────────► decrement / delete   │
//! │                                                                         │
//! │  Remove line ───────────► delete_line(id) ───────► line gone            │
//! │                                                                         │
//! │  Charge ────────────────► draft() ───────────────► (read only)          │
//! │                            └── SaleRepository::commit_sale              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failing call leaves the builder exactly as it was.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;

/// One line of the sale being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    /// Name at time of the last add.
    pub product_name: String,
    pub quantity: i64,
    /// Price snapshotted on the most recent add for this product.
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Snapshot handed to persistence on commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleDraft {
    pub lines: Vec<CartLine>,
    pub total: Money,
}

/// The in-memory sale.
///
/// ## Invariants
/// - Lines are unique by `product_id`, kept in insertion order
/// - Every line has `quantity > 0`
/// - `subtotal == unit_price × quantity` for every line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleBuilder {
    lines: Vec<CartLine>,
}

impl SaleBuilder {
    pub fn new() -> Self {
        SaleBuilder::default()
    }

    /// Adds `quantity` units of `product`, merging with an existing line.
    ///
    /// ## Errors
    /// - `InvalidQuantity` when `quantity <= 0`
    /// - `InsufficientStock` when the accumulated quantity would exceed
    ///   `product.stock` (reaching it exactly is fine)
    /// - `AmountTooLarge` when the line or the sale total no longer fits
    pub fn add(&mut self, product: &Product, quantity: i64) -> CoreResult<&CartLine> {
        if quantity <= 0 {
            return Err(CoreError::InvalidQuantity {
                input: quantity.to_string(),
            });
        }

        let index = self.position(product.id);
        let existing = index.map(|i| self.lines[i].quantity).unwrap_or(0);
        let new_quantity = existing
            .checked_add(quantity)
            .ok_or_else(|| CoreError::InvalidQuantity {
                input: quantity.to_string(),
            })?;

        if new_quantity > product.stock {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock,
                requested: new_quantity,
            });
        }

        let too_large = || CoreError::AmountTooLarge {
            product: product.name.clone(),
        };
        let unit_price = product.price();
        let subtotal = unit_price
            .checked_mul_quantity(new_quantity)
            .ok_or_else(too_large)?;
        self.lines
            .iter()
            .filter(|l| l.product_id != product.id)
            .try_fold(subtotal, |acc, l| acc.checked_add(l.subtotal))
            .ok_or_else(too_large)?;

        let index = match index {
            Some(i) => i,
            None => {
                self.lines.push(CartLine {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    quantity: 0,
                    unit_price: Money::zero(),
                    subtotal: Money::zero(),
                });
                self.lines.len() - 1
            }
        };

        let line = &mut self.lines[index];
        line.product_name = product.name.clone();
        line.quantity = new_quantity;
        line.unit_price = unit_price;
        line.subtotal = subtotal;

        Ok(&self.lines[index])
    }

    /// Like [`SaleBuilder::add`], with the quantity typed by the operator.
    pub fn add_input(&mut self, product: &Product, input: &str) -> CoreResult<&CartLine> {
        let quantity = parse_quantity(input)?;
        self.add(product, quantity)
    }

    /// Takes `quantity` units off a line. Deletes the line when
    /// `quantity >= line.quantity`.
    ///
    /// ## Returns
    /// The line after the change, or `None` if it was deleted.
    pub fn remove(&mut self, product_id: i64, quantity: i64) -> CoreResult<Option<&CartLine>> {
        if quantity <= 0 {
            return Err(CoreError::InvalidQuantity {
                input: quantity.to_string(),
            });
        }

        let index = self
            .position(product_id)
            .ok_or(CoreError::NotInCart(product_id))?;

        if quantity >= self.lines[index].quantity {
            self.lines.remove(index);
            return Ok(None);
        }

        let line = &mut self.lines[index];
        let remaining = line.quantity - quantity;
        line.subtotal = line
            .unit_price
            .checked_mul_quantity(remaining)
            .ok_or_else(|| CoreError::AmountTooLarge {
                product: line.product_name.clone(),
            })?;
        line.quantity = remaining;

        Ok(Some(&self.lines[index]))
    }

    /// Removes the line for a product. Returns whether there was one.
    pub fn delete_line(&mut self, product_id: i64) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Sum of line subtotals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.subtotal).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Number of distinct products.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).fold(0, i64::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// What a commit would persist.
    ///
    /// ## Errors
    /// `EmptySale` when there are no lines.
    pub fn draft(&self) -> CoreResult<SaleDraft> {
        if self.is_empty() {
            return Err(CoreError::EmptySale);
        }

        Ok(SaleDraft {
            lines: self.lines.clone(),
            total: self.total(),
        })
    }

    fn position(&self, product_id: i64) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }
}

/// Parses an operator-typed quantity.
///
/// Accepts a decimal comma and truncates toward zero, so `"2,9"` is 2.
/// Anything that does not end up as a positive whole number is rejected.
///
/// ## Example
/// ```rust
/// use cafe_core::cart::parse_quantity;
///
/// assert_eq!(parse_quantity(" 3 ").unwrap(), 3);
/// assert_eq!(parse_quantity("2,9").unwrap(), 2);
/// assert!(parse_quantity("0").is_err());
/// assert!(parse_quantity("two").is_err());
/// ```
pub fn parse_quantity(input: &str) -> CoreResult<i64> {
    let invalid = || CoreError::InvalidQuantity {
        input: input.to_string(),
    };

    let value: f64 = input.trim().replace(',', ".").parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }

    let quantity = value.trunc();
    if quantity < 1.0 || quantity > i64::MAX as f64 {
        return Err(invalid());
    }

    Ok(quantity as i64)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_product(id: i64, price_cents: i64, stock: i64) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            category: "Hot Drinks".to_string(),
            price_cents,
            stock,
            min_stock: 2,
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_accumulates_and_rejects_over_stock() {
        let p = test_product(1, 350, 10);
        let mut cart = SaleBuilder::new();

        cart.add(&p, 4).unwrap();
        assert_eq!(cart.line(1).unwrap().quantity, 4);
        assert_eq!(cart.line(1).unwrap().subtotal, Money::from_cents(1400));
        assert_eq!(cart.total(), Money::from_cents(1400));

        cart.add(&p, 4).unwrap();
        assert_eq!(cart.line(1).unwrap().quantity, 8);
        assert_eq!(cart.total(), Money::from_cents(2800));

        let before = cart.clone();
        let err = cart.add(&p, 5).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 10,
                requested: 13,
                ..
            }
        ));
        assert_eq!(cart, before);
        assert_eq!(cart.total(), Money::from_cents(2800));
    }

    #[test]
    fn test_remove_uses_stored_price() {
        let p = test_product(1, 350, 10);
        let mut cart = SaleBuilder::new();
        cart.add(&p, 4).unwrap();
        cart.add(&p, 4).unwrap();

        let line = cart.remove(1, 3).unwrap().unwrap();
        assert_eq!(line.quantity, 5);
        assert_eq!(line.subtotal, Money::from_cents(1750));
        assert_eq!(cart.total(), Money::from_cents(1750));

        assert!(cart.remove(1, 10).unwrap().is_none());
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_add_up_to_exact_stock() {
        let p = test_product(1, 100, 3);
        let mut cart = SaleBuilder::new();

        cart.add(&p, 3).unwrap();
        assert_eq!(cart.total_quantity(), 3);
        assert!(cart.add(&p, 1).is_err());
    }

    #[test]
    fn test_add_resnapshots_price() {
        let mut p = test_product(1, 300, 10);
        let mut cart = SaleBuilder::new();
        cart.add(&p, 2).unwrap();

        p.price_cents = 400;
        let line = cart.add(&p, 1).unwrap();
        assert_eq!(line.unit_price, Money::from_cents(400));
        assert_eq!(line.subtotal, Money::from_cents(1200));
    }

    #[test]
    fn test_invalid_quantities_leave_state() {
        let p = test_product(1, 300, 10);
        let mut cart = SaleBuilder::new();
        cart.add(&p, 2).unwrap();
        let before = cart.clone();

        assert!(matches!(cart.add(&p, 0), Err(CoreError::InvalidQuantity { .. })));
        assert!(matches!(cart.add(&p, -3), Err(CoreError::InvalidQuantity { .. })));
        assert!(cart.add_input(&p, "abc").is_err());
        assert!(matches!(cart.remove(1, 0), Err(CoreError::InvalidQuantity { .. })));
        assert!(matches!(cart.remove(99, 1), Err(CoreError::NotInCart(99))));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_amount_overflow_rejected_without_change() {
        let pricey = test_product(1, 4_000_000_000_000_000_000, 10);
        let mut cart = SaleBuilder::new();

        cart.add(&pricey, 2).unwrap();
        let before = cart.clone();
        assert!(matches!(
            cart.add(&pricey, 1),
            Err(CoreError::AmountTooLarge { .. })
        ));
        assert_eq!(cart, before);

        // each line fits, the total does not
        let other = test_product(2, 4_000_000_000_000_000_000, 10);
        assert!(matches!(
            cart.add(&other, 1),
            Err(CoreError::AmountTooLarge { .. })
        ));
        assert_eq!(cart, before);
        assert_eq!(cart.total(), Money::from_cents(8_000_000_000_000_000_000));
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = SaleBuilder::new();
        cart.add(&test_product(3, 100, 10), 1).unwrap();
        cart.add(&test_product(1, 200, 10), 1).unwrap();
        cart.add(&test_product(3, 100, 10), 1).unwrap();

        let ids: Vec<i64> = cart.lines().iter().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Money::from_cents(400));
        assert_eq!(cart.total(), cart.total());
    }

    #[test]
    fn test_delete_line() {
        let mut cart = SaleBuilder::new();
        cart.add(&test_product(1, 100, 10), 2).unwrap();

        assert!(!cart.delete_line(7));
        assert!(cart.delete_line(1));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_draft() {
        let mut cart = SaleBuilder::new();
        assert!(matches!(cart.draft(), Err(CoreError::EmptySale)));

        cart.add(&test_product(1, 250, 10), 2).unwrap();
        let draft = cart.draft().unwrap();
        assert_eq!(draft.total, Money::from_cents(500));
        assert_eq!(draft.lines.len(), 1);
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("5").unwrap(), 5);
        assert_eq!(parse_quantity("1.7").unwrap(), 1);
        assert!(parse_quantity("0,5").is_err());
        assert!(parse_quantity("-2").is_err());
        assert!(parse_quantity("").is_err());
        assert!(parse_quantity("NaN").is_err());
    }

    mod properties {
        use super::*;
        use crate::validation::MAX_PRICE_CENTS;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(usize, i64),
            Remove(usize, i64),
            Delete(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => (0..3usize, -3i64..40).prop_map(|(i, q)| Op::Add(i, q)),
                2 => (0..3usize, -3i64..40).prop_map(|(i, q)| Op::Remove(i, q)),
                1 => (0..3usize).prop_map(Op::Delete),
            ]
        }

        /// Three products with prices in the accepted range.
        fn catalog() -> impl Strategy<Value = Vec<Product>> {
            prop::collection::vec((0..=MAX_PRICE_CENTS, 0i64..100), 3).prop_map(|specs| {
                specs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (price, stock))| test_product(i as i64 + 1, price, stock))
                    .collect()
            })
        }

        proptest! {
            /// The builder tracks a per-product count through any sequence of
            /// calls, and a rejected call leaves it untouched.
            #[test]
            fn test_cart_follows_quantities(
                products in catalog(),
                ops in prop::collection::vec(op(), 0..40),
            ) {
                let mut cart = SaleBuilder::new();
                let mut held = [0i64; 3];

                for op in ops {
                    let before = cart.clone();
                    match op {
                        Op::Add(i, qty) => {
                            let accepted = cart.add(&products[i], qty).is_ok();
                            if qty <= 0 || held[i] + qty > products[i].stock {
                                prop_assert!(!accepted);
                                prop_assert_eq!(&cart, &before);
                            } else {
                                prop_assert!(accepted);
                                held[i] += qty;
                            }
                        }
                        Op::Remove(i, qty) => {
                            let accepted = cart.remove(products[i].id, qty).is_ok();
                            if qty <= 0 || held[i] == 0 {
                                prop_assert!(!accepted);
                                prop_assert_eq!(&cart, &before);
                            } else {
                                prop_assert!(accepted);
                                held[i] = (held[i] - qty).max(0);
                            }
                        }
                        Op::Delete(i) => {
                            prop_assert_eq!(cart.delete_line(products[i].id), held[i] > 0);
                            held[i] = 0;
                        }
                    }
                }

                let expected: i64 = products
                    .iter()
                    .zip(held)
                    .map(|(p, q)| p.price_cents * q)
                    .sum();
                prop_assert_eq!(cart.total(), Money::from_cents(expected));
                prop_assert_eq!(cart.total(), cart.total());
                prop_assert_eq!(cart.total_quantity(), held.iter().sum::<i64>());
                prop_assert!(cart.lines().iter().all(|l| l.quantity > 0));
            }

            /// Any price, stock and quantity: the call returns, and on error
            /// nothing changed.
            #[test]
            fn test_add_with_any_numbers(
                price in any::<i64>(),
                stock in any::<i64>(),
                first in any::<i64>(),
                second in any::<i64>(),
            ) {
                let p = test_product(1, price, stock);
                let mut cart = SaleBuilder::new();
                let _ = cart.add(&p, first);

                let before = cart.clone();
                if cart.add(&p, second).is_err() {
                    prop_assert_eq!(&cart, &before);
                }
                for line in cart.lines() {
                    prop_assert_eq!(
                        Some(line.subtotal),
                        line.unit_price.checked_mul_quantity(line.quantity)
                    );
                }
            }
        }
    }
}
