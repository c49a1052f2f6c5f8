//! Role-scoped navigation: the typed route table and the access guard that
//! decides render / placeholder / redirect on every navigation.

mod guard;
mod route;

pub use guard::{evaluate, resolve, Outcome, Resolution};
pub use route::{GuardMode, Route};
