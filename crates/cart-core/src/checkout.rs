//! # Checkout Request
//!
//! Wire types exchanged between the checkout submitter and the
//! payment-session endpoint, plus the validation both sides apply.

use crate::cart::CartItem;
use crate::error::{CartError, PaymentResult};
use crate::money::major_units::{self, MAX_UNIT_AMOUNT};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Item in a checkout request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub id: String,
    pub title: String,
    /// Unit price in minor units; travels as a decimal `price`
    #[serde(rename = "price", with = "major_units")]
    pub unit_price: i64,
    pub quantity: u32,
}

impl CheckoutItem {
    /// Line total in minor units, `None` on overflow
    pub fn total(&self) -> Option<i64> {
        self.unit_price.checked_mul(i64::from(self.quantity))
    }
}

impl From<&CartItem> for CheckoutItem {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

/// Body of `POST /functions/v1/create-payment`
///
/// Every field defaults so that absent fields reach validation and produce
/// the endpoint's own error message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub items: Vec<CheckoutItem>,

    /// Total in minor units (cents)
    #[serde(default)]
    pub total_amount: i64,

    /// Per-attempt key; identical retries resolve to the same payment session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl CheckoutRequest {
    /// Builder: set idempotency key
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Sum of item totals in minor units, `None` on overflow
    pub fn items_total(&self) -> Option<i64> {
        self.items
            .iter()
            .try_fold(0i64, |sum, item| sum.checked_add(item.total()?))
    }

    /// Sum of quantities
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Presence check applied by the payment endpoint
    pub fn validate_required(&self) -> PaymentResult<()> {
        if self.email.trim().is_empty() || self.items.is_empty() || self.total_amount <= 0 {
            return Err(CartError::InvalidRequest(
                "Missing required fields: email, items, or totalAmount".to_string(),
            ));
        }
        Ok(())
    }

    /// Quantities must be positive and `totalAmount` must match the items to the cent
    pub fn validate_amounts(&self) -> PaymentResult<()> {
        if let Some(item) = self.items.iter().find(|i| i.quantity == 0) {
            return Err(CartError::InvalidRequest(format!(
                "Item {} has quantity 0",
                item.id
            )));
        }

        if let Some(item) = self
            .items
            .iter()
            .find(|i| !(0..=MAX_UNIT_AMOUNT).contains(&i.unit_price))
        {
            return Err(CartError::InvalidPrice {
                message: format!("Item {} has an out-of-range price", item.id),
            });
        }

        let expected = self.items_total().ok_or_else(|| CartError::InvalidPrice {
            message: "Item total is out of range".to_string(),
        })?;
        if expected != self.total_amount {
            return Err(CartError::InvalidPrice {
                message: format!(
                    "totalAmount {} does not match item total {}",
                    self.total_amount, expected
                ),
            });
        }
        Ok(())
    }

    /// Full server-side validation
    pub fn validate(&self) -> PaymentResult<()> {
        self.validate_required()?;
        self.validate_amounts()
    }
}

/// Generate a fresh idempotency key for one checkout attempt
pub fn new_idempotency_key() -> String {
    Uuid::new_v4().to_string()
}

/// Client-side email check: present and plausibly shaped
pub fn validate_email(email: &str) -> PaymentResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(CartError::MissingEmail);
    }
    if !is_plausible_email(email) {
        return Err(CartError::InvalidEmail {
            email: email.to_string(),
        });
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace; not a full RFC 5322 parser
pub fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Response body of the payment endpoint: `{url}` or `{error}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSessionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PaymentSessionResponse {
    pub fn redirect(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            url: None,
            error: Some(message.into()),
        }
    }
}

/// Success/cancel URLs for a hosted checkout, derived from the caller's origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutUrls {
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutUrls {
    /// `{origin}/success` and `{origin}/checkout`
    pub fn from_origin(origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        Self {
            success_url: format!("{}/success", origin),
            cancel_url: format!("{}/checkout", origin),
        }
    }
}
