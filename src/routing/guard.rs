use crate::identity::SessionSnapshot;

use super::route::{GuardMode, Route};

/// Navigation decision for a guarded view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Session still resolving: show a neutral placeholder, make no
    /// navigation decision yet. Avoids the redirect-then-flash race that a
    /// premature decision would cause.
    Placeholder,
    Render,
    Redirect(Route),
}

/// Outcome of resolving a raw path: the route it mapped to plus the guard
/// decision for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub route: Route,
    pub outcome: Outcome,
}

/// Single evaluation function over the guard variants. Cross-role access is
/// always redirected, never rendered, not even transiently.
pub fn evaluate(mode: GuardMode, session: &SessionSnapshot) -> Outcome {
    match mode {
        GuardMode::Public => Outcome::Render,
        GuardMode::RoleRequired(required) => {
            if session.is_loading() {
                return Outcome::Placeholder;
            }
            if !session.is_authenticated() {
                return Outcome::Redirect(Route::login_for(required));
            }
            match session.role() {
                Some(actual) if actual == required => Outcome::Render,
                Some(actual) => Outcome::Redirect(Route::landing(actual)),
                // Unreachable while the snapshot invariant holds; redirect
                // to login rather than render if it ever breaks.
                None => Outcome::Redirect(Route::login_for(required)),
            }
        }
        GuardMode::GuestOnly(redirect_to) => {
            if session.is_loading() {
                return Outcome::Placeholder;
            }
            match session.role() {
                Some(role) if session.is_authenticated() => {
                    Outcome::Redirect(redirect_to.unwrap_or_else(|| Route::landing(role)))
                }
                _ => Outcome::Render,
            }
        }
    }
}

/// Parse a path, apply structural redirects, then the route's guard.
pub fn resolve(path: &str, session: &SessionSnapshot) -> Resolution {
    let route = Route::parse(path);
    let outcome = match route {
        // The root always forwards into the user app; its guard takes over
        // on the next hop.
        Route::Root => Outcome::Redirect(Route::UserHome),
        // The admin index is guarded like any admin page, then forwards to
        // the dashboard.
        Route::AdminIndex => match evaluate(route.guard(), session) {
            Outcome::Render => Outcome::Redirect(Route::AdminDashboard),
            other => other,
        },
        _ => evaluate(route.guard(), session),
    };
    Resolution { route, outcome }
}
