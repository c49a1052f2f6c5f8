//! Admin pages: read-mostly tables over the admin API surface plus the
//! moderation actions (provider toggle, redemption review, settings edits).

use anyhow::Result;

use crate::api::{ApiClient, RedemptionStatus, SettingsUpdate};

use super::format::{print_kv, print_table};

pub async fn dashboard(api: &ApiClient) -> Result<()> {
    println!("Admin Dashboard");
    let stats = api.admin_stats().await?;
    print_kv(&[
        ("Total users", stats.total_users.to_string()),
        ("Active offers", stats.active_offers.to_string()),
        ("Pending redemptions", stats.pending_redemptions.to_string()),
        ("Points distributed", stats.total_points_distributed.to_string()),
    ]);
    Ok(())
}

pub async fn providers(api: &ApiClient) -> Result<()> {
    println!("Offer Providers");
    let providers = api.admin_providers().await?;
    let rows: Vec<Vec<String>> = providers
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.name.clone(),
                if p.is_enabled { "enabled".into() } else { "disabled".into() },
                p.offer_count.to_string(),
            ]
        })
        .collect();
    print_table(&["id", "name", "status", "offers"], &rows);
    println!("Toggle with: provider <id> <on|off>");
    Ok(())
}

pub async fn toggle_provider(api: &ApiClient, provider_id: &str, enabled: bool) -> Result<()> {
    let provider = api.admin_toggle_provider(provider_id, enabled).await?;
    println!(
        "Provider '{}' is now {}.",
        provider.name,
        if provider.is_enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

pub async fn offers(api: &ApiClient) -> Result<()> {
    println!("Offers (read-only)");
    let offers = api.admin_offers().await?;
    let rows: Vec<Vec<String>> = offers
        .iter()
        .map(|o| {
            vec![
                o.id.clone(),
                o.title.clone(),
                o.points.to_string(),
                format!("{:?}", o.kind).to_lowercase(),
            ]
        })
        .collect();
    print_table(&["id", "title", "points", "type"], &rows);
    Ok(())
}

pub async fn users(api: &ApiClient) -> Result<()> {
    println!("Users");
    let users = api.admin_users().await?;
    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            vec![
                u.id.clone(),
                u.email.clone(),
                u.name.clone(),
                u.wallet_balance.to_string(),
                format!("{:?}", u.status).to_lowercase(),
            ]
        })
        .collect();
    print_table(&["id", "email", "name", "balance", "status"], &rows);
    println!("Details with: user <id>");
    Ok(())
}

pub async fn user_detail(api: &ApiClient, user_id: &str) -> Result<()> {
    let user = api.admin_user(user_id).await?;
    print_kv(&[
        ("Id", user.id.clone()),
        ("Email", user.email.clone()),
        ("Name", user.name.clone()),
        ("Balance", format!("{} points", user.wallet_balance)),
        ("Status", format!("{:?}", user.status).to_lowercase()),
        ("Joined", user.created_at.format("%Y-%m-%d").to_string()),
    ]);
    Ok(())
}

pub async fn redemptions(api: &ApiClient) -> Result<()> {
    println!("Redemption Requests");
    let redemptions = api.admin_redemptions().await?;
    let rows: Vec<Vec<String>> = redemptions
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.user_email.clone(),
                r.points.to_string(),
                r.method.clone(),
                r.status.as_str().to_string(),
            ]
        })
        .collect();
    print_table(&["id", "user", "points", "method", "status"], &rows);
    println!("Review with: approve <id> | reject <id>");
    Ok(())
}

pub async fn update_redemption(
    api: &ApiClient,
    redemption_id: &str,
    status: RedemptionStatus,
) -> Result<()> {
    let redemption = api.admin_update_redemption(redemption_id, status).await?;
    println!(
        "Redemption {} ({} points for {}) marked {}.",
        redemption.id,
        redemption.points,
        redemption.user_email,
        redemption.status.as_str()
    );
    Ok(())
}

pub async fn settings(api: &ApiClient) -> Result<()> {
    println!("Platform Settings");
    let settings = api.admin_settings().await?;
    print_kv(&[
        ("referral_bonus_points", settings.referral_bonus_points.to_string()),
        ("min_redeem_points", settings.min_redeem_points.to_string()),
        ("daily_earning_cap", settings.daily_earning_cap.to_string()),
        ("survey_point_multiplier", settings.survey_point_multiplier.to_string()),
        ("video_ad_points", settings.video_ad_points.to_string()),
    ]);
    println!("Edit with: settings set <key> <value>");
    Ok(())
}

pub async fn update_settings(api: &ApiClient, key: &str, value: &str) -> Result<()> {
    let mut patch = SettingsUpdate::default();
    let parsed = value.parse::<u64>();
    match (key, parsed) {
        ("referral_bonus_points", Ok(v)) => patch.referral_bonus_points = Some(v),
        ("min_redeem_points", Ok(v)) => patch.min_redeem_points = Some(v),
        ("daily_earning_cap", Ok(v)) => patch.daily_earning_cap = Some(v),
        ("video_ad_points", Ok(v)) => patch.video_ad_points = Some(v),
        ("survey_point_multiplier", _) => match value.parse::<f64>() {
            Ok(v) => patch.survey_point_multiplier = Some(v),
            Err(_) => {
                println!("'{}' is not a number.", value);
                return Ok(());
            }
        },
        (
            "referral_bonus_points" | "min_redeem_points" | "daily_earning_cap" | "video_ad_points",
            Err(_),
        ) => {
            println!("'{}' is not a whole number.", value);
            return Ok(());
        }
        (other, _) => {
            println!("Unknown setting '{}'.", other);
            return Ok(());
        }
    }
    let updated = api.admin_update_settings(&patch).await?;
    println!("Settings saved. min_redeem_points is now {}.", updated.min_redeem_points);
    Ok(())
}

pub async fn legal_pages(api: &ApiClient, slug: &str) -> Result<()> {
    println!("Legal Pages (editing '{}')", slug);
    let content = api.admin_legal(slug).await?;
    println!("{} (updated {})", content.title, content.updated_at.format("%Y-%m-%d"));
    println!();
    println!("{}", content.content);
    println!("Replace with: legal set <privacy-policy|terms> <markdown...>");
    Ok(())
}

pub async fn update_legal(api: &ApiClient, slug: &str, content: &str) -> Result<()> {
    let updated = api.admin_update_legal(slug, content).await?;
    println!("'{}' saved ({} chars).", updated.title, updated.content.chars().count());
    Ok(())
}

pub fn login_page() {
    println!("Admin Login");
    println!("Sign in with: login <email> <password>");
}
