//! Postal address, embedded by members and deliveries.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Address value object (city/street/zipcode).
///
/// Copied by value onto a delivery at order time; the delivery keeps the
/// address the member had when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub street: String,
    pub zipcode: String,
}

impl Address {
    pub fn new(
        city: impl Into<String>,
        street: impl Into<String>,
        zipcode: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            street: street.into(),
            zipcode: zipcode.into(),
        }
    }
}

impl ValueObject for Address {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_with_same_values_are_equal() {
        let a = Address::new("Seoul", "Teheran-ro 1", "06000");
        let b = Address::new("Seoul", "Teheran-ro 1", "06000");
        assert_eq!(a, b);
    }

    #[test]
    fn addresses_with_different_values_are_not_equal() {
        let a = Address::new("Seoul", "Teheran-ro 1", "06000");
        let b = Address::new("Busan", "Haeundae-ro 2", "48000");
        assert_ne!(a, b);
    }
}
