use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::redeem::{RedeemMethod, RedemptionRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferKind {
    Survey,
    Video,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub title: String,
    pub description: String,
    pub points: u64,
    #[serde(rename = "type")]
    pub kind: OfferKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Points awarded for a completed offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferCompletion {
    pub points: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Earned,
    Redeemed,
    Referral,
    Bonus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Signed: redemptions appear as negative amounts.
    pub points: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletData {
    pub balance: u64,
    pub lifetime_earned: u64,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralData {
    pub referral_code: String,
    pub referral_link: String,
    pub referral_count: u64,
    pub bonus_points: u64,
}

/// Body of a redemption submission. Only constructible from a request that
/// has a method selected; validation against balance/minimum happens in
/// `redeem::validate` before anything is dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemSubmission {
    pub points: u64,
    pub method: RedeemMethod,
    pub details: HashMap<String, String>,
}

impl RedeemSubmission {
    pub fn from_request(request: &RedemptionRequest) -> Option<Self> {
        let method = request.method?;
        let mut details = HashMap::new();
        details.insert("account".to_string(), request.account_details.trim().to_string());
        Some(Self { points: request.points, method, details })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemReceipt {
    pub id: String,
    pub status: String,
}

/// Platform tunables. `min_redeem_points` feeds the redemption validator;
/// the rest are consumed by views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub referral_bonus_points: u64,
    pub min_redeem_points: u64,
    pub daily_earning_cap: u64,
    pub survey_point_multiplier: f64,
    pub video_ad_points: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_bonus_points: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_redeem_points: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_earning_cap: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_point_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_ad_points: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalContent {
    pub title: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactReceipt {
    pub success: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

// --- Admin surface ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub is_enabled: bool,
    pub offer_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Suspended,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub wallet_balance: u64,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    Pending,
    Approved,
    Rejected,
}

impl RedemptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedemptionStatus::Pending => "pending",
            RedemptionStatus::Approved => "approved",
            RedemptionStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub points: u64,
    pub method: String,
    pub status: RedemptionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub active_offers: u64,
    pub pending_redemptions: u64,
    pub total_points_distributed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_kind_uses_the_wire_tag() {
        let json = r#"{
            "id": "o-1",
            "title": "Quick survey",
            "description": "Five questions",
            "points": 150,
            "type": "survey"
        }"#;
        let offer: Offer = serde_json::from_str(json).unwrap();
        assert_eq!(offer.kind, OfferKind::Survey);
        assert!(offer.estimated_time.is_none());
    }

    #[test]
    fn submission_requires_a_method() {
        let no_method = RedemptionRequest { points: 500, method: None, account_details: "x".into() };
        assert!(RedeemSubmission::from_request(&no_method).is_none());

        let ok = RedemptionRequest {
            points: 500,
            method: Some(RedeemMethod::Paypal),
            account_details: " demo@earnvra.com ".into(),
        };
        let sub = RedeemSubmission::from_request(&ok).unwrap();
        assert_eq!(sub.details.get("account").unwrap(), "demo@earnvra.com");
        assert_eq!(serde_json::to_value(&sub.method).unwrap(), "paypal");
    }

    #[test]
    fn settings_update_serializes_only_set_fields() {
        let patch = SettingsUpdate { min_redeem_points: Some(750), ..Default::default() };
        let v = serde_json::to_value(&patch).unwrap();
        assert_eq!(v, serde_json::json!({ "min_redeem_points": 750 }));
    }
}
