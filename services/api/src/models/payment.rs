//! Payment model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Upi,
    NetBanking,
    Wallet,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::NetBanking => "net_banking",
            PaymentMethod::Wallet => "wallet",
            PaymentMethod::Cash => "cash",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "credit_card" => PaymentMethod::CreditCard,
            "debit_card" => PaymentMethod::DebitCard,
            "net_banking" => PaymentMethod::NetBanking,
            "wallet" => PaymentMethod::Wallet,
            "cash" => PaymentMethod::Cash,
            _ => PaymentMethod::Upi,
        }
    }
}

/// Payment attempt status. `Success` and `Refunded` are terminal for
/// the attempt; a booking whose payment failed may carry a fresh
/// attempt while the failed row stays for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Refunded,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "success" => PaymentStatus::Success,
            "failed" => PaymentStatus::Failed,
            "refunded" => PaymentStatus::Refunded,
            "cancelled" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Pending,
        }
    }
}

/// Payment entity, one-to-one with a booking attempt. The transaction
/// identifier is unique per attempt.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: String,
    pub failure_reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New payment attempt payload.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub transaction_id: String,
}
