//! Status enums for orders.

use serde::{Deserialize, Serialize};

/// Payment status of an order.
///
/// Maps to Stripe's checkout session `payment_status` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment not yet collected (e.g. delayed payment methods).
    #[default]
    Unpaid,
    /// Payment collected.
    Paid,
    /// No payment was required (free-items-only order).
    NoPaymentRequired,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::Paid => write!(f, "paid"),
            Self::NoPaymentRequired => write!(f, "no_payment_required"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            "no_payment_required" => Ok(Self::NoPaymentRequired),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// Shipping status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    /// Not yet handed to a carrier.
    #[default]
    Pending,
    /// Handed to a carrier.
    Shipped,
    /// Confirmed delivered.
    Delivered,
}

impl std::fmt::Display for ShippingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

impl std::str::FromStr for ShippingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid shipping status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_payment_status_roundtrip() {
        for status in [
            PaymentStatus::Unpaid,
            PaymentStatus::Paid,
            PaymentStatus::NoPaymentRequired,
        ] {
            let parsed = PaymentStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_shipping_status_roundtrip() {
        for status in [
            ShippingStatus::Pending,
            ShippingStatus::Shipped,
            ShippingStatus::Delivered,
        ] {
            let parsed = ShippingStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_invalid_status_rejected() {
        assert!(PaymentStatus::from_str("refunded").is_err());
        assert!(ShippingStatus::from_str("lost").is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&PaymentStatus::NoPaymentRequired).unwrap();
        assert_eq!(json, "\"no_payment_required\"");
    }
}
