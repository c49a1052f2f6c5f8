//! Redemption request validation: a pure gate run on every submission
//! attempt, before anything reaches the API client. Results are not cached;
//! balance and settings may have changed between keystrokes and submission.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Payout channel for a redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedeemMethod {
    Paypal,
    Giftcard,
    Crypto,
}

impl RedeemMethod {
    pub fn parse(s: &str) -> Option<RedeemMethod> {
        match s.to_ascii_lowercase().as_str() {
            "paypal" => Some(RedeemMethod::Paypal),
            "giftcard" => Some(RedeemMethod::Giftcard),
            "crypto" => Some(RedeemMethod::Crypto),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RedeemMethod::Paypal => "PayPal",
            RedeemMethod::Giftcard => "Gift Card",
            RedeemMethod::Crypto => "Crypto",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RedeemMethod::Paypal => "Receive funds via PayPal",
            RedeemMethod::Giftcard => "Amazon, Visa, and more",
            RedeemMethod::Crypto => "Bitcoin, Ethereum, USDT",
        }
    }

    /// Label for the account-details field of this method.
    pub fn details_label(&self) -> &'static str {
        match self {
            RedeemMethod::Paypal => "PayPal Email",
            RedeemMethod::Giftcard => "Email for Gift Card",
            RedeemMethod::Crypto => "Wallet Address",
        }
    }
}

/// One submission attempt. `points` is already normalized to a non-negative
/// integer by [`parse_points`]; fractions of a point do not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionRequest {
    pub points: u64,
    pub method: Option<RedeemMethod>,
    pub account_details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RedeemError {
    #[error("please choose a redemption method")]
    MethodNotSelected,

    #[error("minimum redemption is {min} points")]
    BelowMinimum { min: u64 },

    #[error("you don't have enough points")]
    InsufficientBalance { balance: u64 },
}

/// Validate a request against the live balance and the platform minimum.
/// Both boundaries are inclusive: redeeming exactly the minimum or exactly
/// the full balance is allowed. A request that fails here must never be
/// dispatched.
pub fn validate(
    request: &RedemptionRequest,
    balance: u64,
    min_redeem_points: u64,
) -> Result<(), RedeemError> {
    if request.method.is_none() {
        return Err(RedeemError::MethodNotSelected);
    }
    if request.points < min_redeem_points {
        return Err(RedeemError::BelowMinimum { min: min_redeem_points });
    }
    if request.points > balance {
        return Err(RedeemError::InsufficientBalance { balance });
    }
    Ok(())
}

/// Normalize free-text point input. Negative, fractional and non-numeric
/// input is rejected outright rather than clamped.
pub fn parse_points(input: &str) -> Option<u64> {
    input.trim().parse::<u64>().ok()
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static WALLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{20,}$").unwrap());

/// Shape check for the account-details field, used by the form layer before
/// submission. Not part of the validation contract above.
pub fn details_look_valid(method: RedeemMethod, details: &str) -> bool {
    let details = details.trim();
    match method {
        RedeemMethod::Paypal | RedeemMethod::Giftcard => EMAIL_RE.is_match(details),
        RedeemMethod::Crypto => WALLET_RE.is_match(details),
    }
}
