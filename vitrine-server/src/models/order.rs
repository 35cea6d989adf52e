//! Order domain types

use uuid::Uuid;

use super::ValidationError;

/// Maximum quantity per line item
const MAX_QUANTITY: i32 = 99;

/// Payment lifecycle state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(ValidationError::InvalidVariant {
                field: "payment_status",
                value: other.to_owned(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// A validated checkout line item
#[derive(Debug, Clone, Copy)]
pub struct CheckoutItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl CheckoutItem {
    pub fn new(product_id: Uuid, quantity: i32) -> Result<Self, ValidationError> {
        if !(1..=MAX_QUANTITY).contains(&quantity) {
            return Err(ValidationError::OutOfRange {
                field: "quantity",
                min: 1,
                max: MAX_QUANTITY as i64,
            });
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_status_round_trip() {
        for s in ["pending", "completed", "failed"] {
            assert_eq!(PaymentStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(PaymentStatus::parse("paid").is_err());
    }

    #[test]
    fn quantity_bounds() {
        let id = Uuid::new_v4();
        assert!(CheckoutItem::new(id, 1).is_ok());
        assert!(CheckoutItem::new(id, 99).is_ok());
        assert!(CheckoutItem::new(id, 0).is_err());
        assert!(CheckoutItem::new(id, 100).is_err());
        assert!(CheckoutItem::new(id, -1).is_err());
    }
}
