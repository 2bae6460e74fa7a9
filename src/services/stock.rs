use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::ValidationError;

/// Largest quantity the `products.quantity` column (INTEGER) can hold.
pub const MAX_QUANTITY: u32 = i32::MAX as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    pub movement: Movement,
    pub amount: u32,
}

impl Adjustment {
    pub fn increment(amount: u32) -> Self {
        Self {
            movement: Movement::Increment,
            amount,
        }
    }

    pub fn decrement(amount: u32) -> Self {
        Self {
            movement: Movement::Decrement,
            amount,
        }
    }

    /// New on-hand quantity after this adjustment.
    ///
    /// Decrements larger than `on_hand` are refused; the store is never asked.
    pub fn apply(self, on_hand: u32) -> Result<u32, ValidationError> {
        if self.amount == 0 {
            return Err(ValidationError::ZeroAmount);
        }
        match self.movement {
            Movement::Increment => on_hand
                .checked_add(self.amount)
                .filter(|q| *q <= MAX_QUANTITY)
                .ok_or(ValidationError::QuantityTooLarge),
            Movement::Decrement => {
                on_hand
                    .checked_sub(self.amount)
                    .ok_or(ValidationError::InsufficientStock {
                        on_hand,
                        requested: self.amount,
                    })
            }
        }
    }
}

pub fn check_quantity(quantity: i64) -> Result<u32, ValidationError> {
    if quantity < 0 {
        return Err(ValidationError::NegativeQuantity);
    }
    u32::try_from(quantity)
        .ok()
        .filter(|q| *q <= MAX_QUANTITY)
        .ok_or(ValidationError::QuantityTooLarge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrement_beyond_on_hand_is_rejected() {
        assert_eq!(
            Adjustment::decrement(6).apply(5),
            Err(ValidationError::InsufficientStock {
                on_hand: 5,
                requested: 6
            })
        );
    }

    #[test]
    fn decrement_to_exactly_zero() {
        assert_eq!(Adjustment::decrement(5).apply(5), Ok(0));
    }

    #[test]
    fn increment_adds_and_caps() {
        assert_eq!(Adjustment::increment(3).apply(2), Ok(5));
        assert_eq!(
            Adjustment::increment(1).apply(MAX_QUANTITY),
            Err(ValidationError::QuantityTooLarge)
        );
    }

    #[test]
    fn zero_amount_is_rejected() {
        assert_eq!(
            Adjustment::increment(0).apply(2),
            Err(ValidationError::ZeroAmount)
        );
    }

    #[test]
    fn absolute_quantity_bounds() {
        assert_eq!(check_quantity(0), Ok(0));
        assert_eq!(check_quantity(-1), Err(ValidationError::NegativeQuantity));
        assert_eq!(
            check_quantity(i64::from(i32::MAX) + 1),
            Err(ValidationError::QuantityTooLarge)
        );
    }
}
