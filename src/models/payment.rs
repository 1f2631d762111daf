//! Payment model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

pub const PAYMENT_RENTAL_UNIQUE_CONSTRAINT: &str = "payments_rental_id_key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Payment {
    pub id: i32,
    #[serde(rename = "rental")]
    pub rental_id: i32,
    /// "<renter> - <book title>"
    pub rental_details: String,
    #[schema(value_type = String, example = "5.00")]
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePayment {
    #[serde(rename = "rental")]
    pub rental_id: i32,
    #[schema(value_type = String, example = "5.00")]
    pub amount: Decimal,
    pub status: Option<PaymentStatus>,
    #[validate(length(max = 100))]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePayment {
    #[schema(value_type = Option<String>, example = "5.00")]
    pub amount: Option<Decimal>,
    pub status: Option<PaymentStatus>,
    #[validate(length(max = 100))]
    pub transaction_id: Option<String>,
}

/// Amounts fit NUMERIC(10, 2) and are never negative
pub fn validate_amount(amount: Decimal) -> Result<(), String> {
    if amount.is_sign_negative() {
        return Err("Amount must not be negative".to_string());
    }
    if amount.normalize().scale() > 2 {
        return Err("Amount must have at most 2 decimal places".to_string());
    }
    if amount.trunc() >= Decimal::from(100_000_000i64) {
        return Err("Amount must have at most 8 integer digits".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn amount_limits() {
        assert!(validate_amount(Decimal::from_str("5.00").unwrap()).is_ok());
        assert!(validate_amount(Decimal::from_str("5.500").unwrap()).is_ok());
        assert!(validate_amount(Decimal::from_str("99999999.99").unwrap()).is_ok());
        assert!(validate_amount(Decimal::from_str("-1.00").unwrap()).is_err());
        assert!(validate_amount(Decimal::from_str("1.005").unwrap()).is_err());
        assert!(validate_amount(Decimal::from_str("100000000").unwrap()).is_err());
    }

    #[test]
    fn payment_serializes_rental_key_and_amount() {
        let payment = Payment {
            id: 1,
            rental_id: 3,
            rental_details: "renter1 - Dune".to_string(),
            amount: Decimal::from_str("5.00").unwrap(),
            status: PaymentStatus::Completed,
            transaction_id: Some("TR-12345".to_string()),
        };

        let value = serde_json::to_value(&payment).unwrap();
        assert_eq!(value["rental"], 3);
        assert_eq!(value["amount"], "5.00");
        assert_eq!(value["status"], "completed");
    }
}
