//! User-facing pages. Each renderer consumes the API client and prints to
//! the terminal; form-like actions (redeem, contact, profile edits) are
//! invoked as shell commands and report inline messages instead of toasts.

use anyhow::Result;

use crate::api::{ApiClient, ContactMessage, ProfileUpdate, RedeemSubmission};
use crate::identity::{SessionSnapshot, SessionStore};
use crate::redeem::{self, RedeemMethod, RedemptionRequest};

use super::format::{print_kv, print_table};

pub async fn home(api: &ApiClient, session: &SessionSnapshot) -> Result<()> {
    let name = session.actor.as_ref().map(|a| a.name.as_str()).unwrap_or("there");
    println!("Welcome back, {}!", name);
    let wallet = api.wallet().await?;
    let offers = api.offers().await?;
    print_kv(&[
        ("Balance", format!("{} points", wallet.balance)),
        ("Lifetime earned", format!("{} points", wallet.lifetime_earned)),
        ("Offers available", offers.len().to_string()),
    ]);
    println!("Try /user/offers to start earning.");
    Ok(())
}

pub async fn offers(api: &ApiClient) -> Result<()> {
    println!("Available Offers");
    let offers = api.offers().await?;
    let rows: Vec<Vec<String>> = offers
        .iter()
        .map(|o| {
            vec![
                o.id.clone(),
                o.title.clone(),
                o.points.to_string(),
                format!("{:?}", o.kind).to_lowercase(),
                o.estimated_time.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["id", "title", "points", "type", "time"], &rows);
    println!("Complete one with: complete <offer-id>");
    Ok(())
}

pub async fn complete_offer(api: &ApiClient, offer_id: &str) -> Result<()> {
    let completion = api.complete_offer(offer_id).await?;
    println!("Offer completed! You earned {} points.", completion.points);
    Ok(())
}

pub async fn wallet(api: &ApiClient) -> Result<()> {
    println!("My Wallet");
    let wallet = api.wallet().await?;
    print_kv(&[
        ("Balance", format!("{} points", wallet.balance)),
        ("Lifetime earned", format!("{} points", wallet.lifetime_earned)),
    ]);
    let rows: Vec<Vec<String>> = wallet
        .transactions
        .iter()
        .map(|t| {
            vec![
                t.created_at.format("%Y-%m-%d").to_string(),
                format!("{:?}", t.kind).to_lowercase(),
                t.points.to_string(),
                t.description.clone(),
            ]
        })
        .collect();
    print_table(&["date", "type", "points", "description"], &rows);
    Ok(())
}

pub async fn redeem_overview(api: &ApiClient) -> Result<()> {
    println!("Redeem Points");
    let wallet = api.wallet().await?;
    let settings = api.settings().await?;
    print_kv(&[
        ("Available to redeem", format!("{} points", wallet.balance)),
        ("Minimum redemption", format!("{} points", settings.min_redeem_points)),
    ]);
    let rows: Vec<Vec<String>> = [RedeemMethod::Paypal, RedeemMethod::Giftcard, RedeemMethod::Crypto]
        .iter()
        .map(|m| {
            vec![
                m.name().to_string(),
                m.description().to_string(),
                m.details_label().to_string(),
            ]
        })
        .collect();
    print_table(&["method", "description", "account field"], &rows);
    println!("Submit with: redeem <paypal|giftcard|crypto> <points> <account>");
    Ok(())
}

/// Run the validation gate against live balance and settings, then dispatch.
/// Validation failures block the submission with an inline message; they are
/// not errors of this function.
pub async fn submit_redemption(
    api: &ApiClient,
    method_input: &str,
    points_input: &str,
    account_details: &str,
) -> Result<()> {
    let Some(points) = redeem::parse_points(points_input) else {
        println!("Points must be a whole, non-negative number.");
        return Ok(());
    };
    let method = RedeemMethod::parse(method_input);
    if method.is_none() && !method_input.is_empty() {
        println!("Unknown method '{}'. Choose paypal, giftcard or crypto.", method_input);
        return Ok(());
    }

    // Balance and minimum are re-fetched on every attempt; a previous
    // validation result is never reused.
    let wallet = api.wallet().await?;
    let settings = api.settings().await?;

    let request = RedemptionRequest {
        points,
        method,
        account_details: account_details.to_string(),
    };
    if let Err(e) = redeem::validate(&request, wallet.balance, settings.min_redeem_points) {
        println!("{}", e);
        return Ok(());
    }
    // A validated request always carries a method; from_request only returns
    // None without one.
    let Some(submission) = RedeemSubmission::from_request(&request) else { return Ok(()) };
    if !redeem::details_look_valid(submission.method, &request.account_details) {
        println!(
            "'{}' does not look like a valid {}.",
            request.account_details,
            submission.method.details_label()
        );
        return Ok(());
    }
    let receipt = api.request_redeem(&submission).await?;
    println!(
        "Redemption submitted! Request {} is {}. You'll receive your reward soon.",
        receipt.id, receipt.status
    );
    Ok(())
}

pub async fn profile(api: &ApiClient) -> Result<()> {
    println!("My Profile");
    let profile = api.profile().await?;
    print_kv(&[
        ("Name", profile.name.clone()),
        ("Email", profile.email.clone()),
        ("Role", profile.role.as_str().to_string()),
        ("Age", profile.age.map(|a| a.to_string()).unwrap_or_else(|| "-".into())),
        ("Gender", profile.gender.clone().unwrap_or_else(|| "-".into())),
        ("Country", profile.country.clone().unwrap_or_else(|| "-".into())),
        ("Member since", profile.created_at.format("%Y-%m-%d").to_string()),
    ]);
    println!("Edit with: profile set <name|age|gender|country> <value>");
    Ok(())
}

pub async fn update_profile(
    api: &ApiClient,
    store: &SessionStore,
    field: &str,
    value: &str,
) -> Result<()> {
    let mut patch = ProfileUpdate::default();
    match field {
        "name" => patch.name = Some(value.to_string()),
        "age" => match value.parse::<u32>() {
            Ok(age) => patch.age = Some(age),
            Err(_) => {
                println!("Age must be a number.");
                return Ok(());
            }
        },
        "gender" => patch.gender = Some(value.to_string()),
        "country" => patch.country = Some(value.to_string()),
        other => {
            println!("Unknown profile field '{}'.", other);
            return Ok(());
        }
    }
    api.update_profile(&patch).await?;
    // Local actor re-resolves from the backend after an edit.
    store.refresh_profile().await;
    println!("Profile updated.");
    Ok(())
}

pub async fn referrals(api: &ApiClient) -> Result<()> {
    println!("Refer & Earn");
    let data = api.referrals().await?;
    print_kv(&[
        ("Referral code", data.referral_code),
        ("Referral link", data.referral_link),
        ("Friends referred", data.referral_count.to_string()),
        ("Bonus points earned", data.bonus_points.to_string()),
    ]);
    Ok(())
}

pub async fn legal(api: &ApiClient, slug: &str) -> Result<()> {
    let content = api.legal(slug).await?;
    println!("{}", content.title);
    println!("(updated {})", content.updated_at.format("%Y-%m-%d"));
    println!();
    println!("{}", content.content);
    Ok(())
}

pub fn contact_page() {
    println!("Contact Us");
    println!("Send a message with: contact <your-email> <message...>");
}

pub async fn submit_contact(api: &ApiClient, name: &str, email: &str, message: &str) -> Result<()> {
    let receipt = api
        .submit_contact(&ContactMessage {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })
        .await?;
    if receipt.success {
        println!("Message sent. We'll get back to you shortly.");
    } else {
        println!("Message could not be delivered; please try again later.");
    }
    Ok(())
}

pub fn login_page() {
    println!("User Login");
    println!("Sign in with: login <email> <password>");
    println!("No account yet? /user/signup");
}

pub fn signup_page() {
    println!("Create your account");
    println!("Sign up with: signup <email> <password> <name...>");
}
