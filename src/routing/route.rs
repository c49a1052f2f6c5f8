use crate::identity::Role;

/// Every navigable surface of the client. Unmatched paths map to `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    // User auth (guest-only)
    UserLogin,
    UserSignup,
    // User app
    UserHome,
    UserOffers,
    UserWallet,
    UserRedeem,
    UserProfile,
    UserReferrals,
    UserContact,
    // Public legal pages
    PrivacyPolicy,
    Terms,
    // Admin auth (guest-only)
    AdminLogin,
    // Admin app
    AdminIndex,
    AdminDashboard,
    AdminProviders,
    AdminOffers,
    AdminUsers,
    AdminRedemptions,
    AdminSettings,
    AdminLegalPages,
    NotFound,
}

/// How a route is gated. One tagged variant consumed by a single evaluation
/// function, instead of per-page guard components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardMode {
    /// Only the given role may see the view; everyone else is redirected.
    RoleRequired(Role),
    /// Only unauthenticated actors may see the view (login/signup forms).
    /// An authenticated actor goes to `redirect_to`, or to their role's
    /// landing route when none is configured.
    GuestOnly(Option<Route>),
    Public,
}

impl Route {
    /// Map a navigation path onto the route table. Trailing slashes are
    /// ignored; anything unknown is the not-found view.
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim();
        let trimmed = if trimmed.len() > 1 { trimmed.trim_end_matches('/') } else { trimmed };
        match trimmed {
            "/" => Route::Root,
            "/user/login" => Route::UserLogin,
            "/user/signup" => Route::UserSignup,
            "/user" => Route::UserHome,
            "/user/offers" => Route::UserOffers,
            "/user/wallet" => Route::UserWallet,
            "/user/redeem" => Route::UserRedeem,
            "/user/profile" => Route::UserProfile,
            "/user/referrals" => Route::UserReferrals,
            "/user/contact" => Route::UserContact,
            "/user/privacy-policy" => Route::PrivacyPolicy,
            "/user/terms" => Route::Terms,
            "/admin/login" => Route::AdminLogin,
            "/admin" => Route::AdminIndex,
            "/admin/dashboard" => Route::AdminDashboard,
            "/admin/providers" => Route::AdminProviders,
            "/admin/offers" => Route::AdminOffers,
            "/admin/users" => Route::AdminUsers,
            "/admin/redemptions" => Route::AdminRedemptions,
            "/admin/settings" => Route::AdminSettings,
            "/admin/legal-pages" => Route::AdminLegalPages,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::UserLogin => "/user/login",
            Route::UserSignup => "/user/signup",
            Route::UserHome => "/user",
            Route::UserOffers => "/user/offers",
            Route::UserWallet => "/user/wallet",
            Route::UserRedeem => "/user/redeem",
            Route::UserProfile => "/user/profile",
            Route::UserReferrals => "/user/referrals",
            Route::UserContact => "/user/contact",
            Route::PrivacyPolicy => "/user/privacy-policy",
            Route::Terms => "/user/terms",
            Route::AdminLogin => "/admin/login",
            Route::AdminIndex => "/admin",
            Route::AdminDashboard => "/admin/dashboard",
            Route::AdminProviders => "/admin/providers",
            Route::AdminOffers => "/admin/offers",
            Route::AdminUsers => "/admin/users",
            Route::AdminRedemptions => "/admin/redemptions",
            Route::AdminSettings => "/admin/settings",
            Route::AdminLegalPages => "/admin/legal-pages",
            Route::NotFound => "/404",
        }
    }

    pub fn guard(&self) -> GuardMode {
        match self {
            Route::UserLogin | Route::UserSignup => GuardMode::GuestOnly(Some(Route::UserHome)),
            Route::AdminLogin => GuardMode::GuestOnly(Some(Route::AdminDashboard)),
            Route::UserHome
            | Route::UserOffers
            | Route::UserWallet
            | Route::UserRedeem
            | Route::UserProfile
            | Route::UserReferrals
            | Route::UserContact => GuardMode::RoleRequired(Role::User),
            Route::AdminIndex
            | Route::AdminDashboard
            | Route::AdminProviders
            | Route::AdminOffers
            | Route::AdminUsers
            | Route::AdminRedemptions
            | Route::AdminSettings
            | Route::AdminLegalPages => GuardMode::RoleRequired(Role::Admin),
            Route::Root | Route::PrivacyPolicy | Route::Terms | Route::NotFound => GuardMode::Public,
        }
    }

    /// Default destination for a role immediately after authentication.
    pub fn landing(role: Role) -> Route {
        match role {
            Role::User => Route::UserHome,
            Role::Admin => Route::AdminDashboard,
        }
    }

    /// Login entry point associated with a role; each role has its own.
    pub fn login_for(role: Role) -> Route {
        match role {
            Role::User => Route::UserLogin,
            Role::Admin => Route::AdminLogin,
        }
    }
}
