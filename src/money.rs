//! Money and quantity bounds shared by listings, carts and orders.
//!
//! Amounts are stored as `NUMERIC(12, 2)`, every price and order total must
//! fit that column.

use rust_decimal::Decimal;

use crate::error::{Result, ServerError};

const DECIMAL_PLACES: u32 = 2;

/// Largest storable amount, 9 999 999 999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, DECIMAL_PLACES);

/// Largest quantity of one item in a cart entry or an order line.
pub const MAX_QUANTITY: i32 = 10_000;

/// Strictly positive, at most two decimal places, at most [`MAX_AMOUNT`].
pub fn is_valid_amount(amount: &Decimal) -> bool {
    *amount > Decimal::ZERO
        && *amount <= MAX_AMOUNT
        && amount.normalize().scale() <= DECIMAL_PLACES
}

/// Listing price check.
pub fn check_price(price: Decimal) -> Result<()> {
    if !is_valid_amount(&price) {
        return Err(ServerError::field(
            "price",
            "range",
            "Price must be between 0.01 and 9999999999.99 with at most 2 decimals.",
        ));
    }
    Ok(())
}

pub fn check_quantity(quantity: i32) -> Result<()> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(quantity_range());
    }
    Ok(())
}

pub fn quantity_range() -> ServerError {
    ServerError::field(
        "quantity",
        "range",
        "Quantity must be between 1 and 10000.",
    )
}

/// `price * quantity`, `None` on overflow.
pub fn line_amount(price: Decimal, quantity: i32) -> Option<Decimal> {
    price.checked_mul(Decimal::from(quantity))
}

/// Sum of line amounts, `None` when any line or the sum overflows.
pub fn checked_sum(amounts: impl IntoIterator<Item = Option<Decimal>>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(amount?))
}

/// Order total, bounded by [`MAX_AMOUNT`].
pub fn order_total(amounts: impl IntoIterator<Item = Option<Decimal>>) -> Result<Decimal> {
    checked_sum(amounts)
        .filter(|total| *total <= MAX_AMOUNT)
        .ok_or_else(|| {
            ServerError::field(
                "totalAmount",
                "range",
                "Total amount must be at most 9999999999.99.",
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_amount() {
        assert_eq!(MAX_AMOUNT.to_string(), "9999999999.99");
        assert!(is_valid_amount(&MAX_AMOUNT));
        assert!(!is_valid_amount(&(MAX_AMOUNT + Decimal::new(1, 2))));
        assert!(!is_valid_amount(&Decimal::MAX));
    }

    #[test]
    fn test_amount_precision() {
        assert!(is_valid_amount(&Decimal::new(1, 2)));
        assert!(is_valid_amount(&Decimal::new(12_500, 3)));
        assert!(!is_valid_amount(&Decimal::new(1, 3)));
        assert!(!is_valid_amount(&Decimal::ZERO));
        assert!(!is_valid_amount(&Decimal::NEGATIVE_ONE));
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(check_quantity(1).is_ok());
        assert!(check_quantity(MAX_QUANTITY).is_ok());
        assert!(check_quantity(0).is_err());
        assert!(check_quantity(MAX_QUANTITY + 1).is_err());
        assert!(check_quantity(i32::MAX).is_err());
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(line_amount(Decimal::MAX, 2), None);
        assert_eq!(checked_sum([Some(Decimal::MAX), Some(Decimal::ONE)]), None);
        assert_eq!(checked_sum([Some(Decimal::ONE), None]), None);

        let line = line_amount(MAX_AMOUNT, MAX_QUANTITY);
        assert!(line.is_some());
        assert!(matches!(order_total([line]), Err(ServerError::Validation(_))));
        assert_eq!(
            order_total([line_amount(Decimal::new(1250, 2), 3)]).unwrap(),
            Decimal::new(3750, 2)
        );
    }
}
