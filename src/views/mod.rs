//! Terminal view layer: one renderer per routed page, consuming the session
//! snapshot and the API client. Guard decisions happen in `routing` before
//! any of this runs.

pub mod admin;
pub mod format;
pub mod user;

use anyhow::Result;

use crate::api::ApiClient;
use crate::identity::SessionSnapshot;
use crate::routing::Route;

/// Render the view behind a route the guard has already cleared.
pub async fn render(route: Route, api: &ApiClient, session: &SessionSnapshot) -> Result<()> {
    match route {
        Route::UserLogin => user::login_page(),
        Route::UserSignup => user::signup_page(),
        Route::UserHome => user::home(api, session).await?,
        Route::UserOffers => user::offers(api).await?,
        Route::UserWallet => user::wallet(api).await?,
        Route::UserRedeem => user::redeem_overview(api).await?,
        Route::UserProfile => user::profile(api).await?,
        Route::UserReferrals => user::referrals(api).await?,
        Route::UserContact => user::contact_page(),
        Route::PrivacyPolicy => user::legal(api, "privacy-policy").await?,
        Route::Terms => user::legal(api, "terms").await?,
        Route::AdminLogin => admin::login_page(),
        Route::AdminDashboard => admin::dashboard(api).await?,
        Route::AdminProviders => admin::providers(api).await?,
        Route::AdminOffers => admin::offers(api).await?,
        Route::AdminUsers => admin::users(api).await?,
        Route::AdminRedemptions => admin::redemptions(api).await?,
        Route::AdminSettings => admin::settings(api).await?,
        Route::AdminLegalPages => admin::legal_pages(api, "privacy-policy").await?,
        Route::Root | Route::AdminIndex => {
            // Structural redirects are resolved before rendering; nothing to
            // draw if one slips through.
        }
        Route::NotFound => {
            println!("404 — this page does not exist.");
        }
    }
    Ok(())
}
