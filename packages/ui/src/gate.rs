//! # Access gate: may this navigation proceed?
//!
//! A pure function of the session store's [`AuthState`], the requested path,
//! and the [`RouteTable`]. It is recomputed on every state or route change;
//! there is no state machine to keep in sync.
//!
//! | Loading | Session | Route | Decision |
//! |---------|---------|-------|----------|
//! | yes | — | — | [`Decision::Pending`] |
//! | no | none | protected | [`Decision::RedirectToLogin`] |
//! | no | present | auth, not allow-listed | [`Decision::RedirectToHome`] |
//! | no | — | anything else | [`Decision::Allow`] |
//!
//! Paths missing from the route table are protected.

use std::collections::BTreeSet;

use store::{ConfigError, NutriTrackConfig, RoutesConfig};

use crate::session::AuthState;

/// Which screen group a route belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Requires a session.
    Protected,
    /// Requires the absence of a session, unless allow-listed.
    Auth,
}

/// Outcome of evaluating a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The session store has not settled; no decision yet.
    Pending,
    Allow,
    RedirectToLogin,
    RedirectToHome,
}

/// Outcome of the per-screen guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenGuard {
    /// Still loading: render nothing.
    Blank,
    Render,
    RedirectToLogin,
}

/// Navigation metadata, validated and normalised.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTable {
    login: String,
    home: String,
    auth: BTreeSet<String>,
    protected: BTreeSet<String>,
    allow: BTreeSet<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::build(&RoutesConfig::default())
    }
}

impl RouteTable {
    /// Normalise every path in `config`, then validate it.
    pub fn from_config(config: &NutriTrackConfig) -> Result<Self, ConfigError> {
        let mut normalised = config.clone();
        let routes = &mut normalised.routes;
        routes.login = normalize_path(&routes.login);
        routes.home = normalize_path(&routes.home);
        for list in [&mut routes.auth, &mut routes.protected, &mut routes.allow] {
            for path in list.iter_mut() {
                *path = normalize_path(path);
            }
        }
        normalised.validate()?;
        Ok(Self::build(&normalised.routes))
    }

    fn build(routes: &RoutesConfig) -> Self {
        Self {
            login: normalize_path(&routes.login),
            home: normalize_path(&routes.home),
            auth: routes.auth.iter().map(|p| normalize_path(p)).collect(),
            protected: routes.protected.iter().map(|p| normalize_path(p)).collect(),
            allow: routes.allow.iter().map(|p| normalize_path(p)).collect(),
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn home(&self) -> &str {
        &self.home
    }

    pub fn classify(&self, path: &str) -> RouteKind {
        let path = normalize_path(path);
        if self.auth.contains(&path) {
            return RouteKind::Auth;
        }
        if !self.protected.contains(&path) {
            tracing::debug!(path = %path, "route not in navigation metadata, treating as protected");
        }
        RouteKind::Protected
    }

    pub fn is_allow_listed(&self, path: &str) -> bool {
        self.allow.contains(&normalize_path(path))
    }

    /// Where a redirect decision sends the user.
    pub fn redirect_target(&self, decision: Decision) -> Option<&str> {
        match decision {
            Decision::RedirectToLogin => Some(&self.login),
            Decision::RedirectToHome => Some(&self.home),
            Decision::Pending | Decision::Allow => None,
        }
    }
}

/// Strip query and fragment, force a leading slash, drop trailing slashes.
pub fn normalize_path(path: &str) -> String {
    let path = path
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or_default()
        .trim();
    let trimmed = path.trim_matches('/');
    format!("/{trimmed}")
}

/// Evaluate a navigation request against the current state.
pub fn decide(state: &AuthState, path: &str, routes: &RouteTable) -> Decision {
    if state.loading {
        return Decision::Pending;
    }
    let decision = match (state.is_signed_in(), routes.classify(path)) {
        (false, RouteKind::Protected) => Decision::RedirectToLogin,
        (true, RouteKind::Auth) if !routes.is_allow_listed(path) => Decision::RedirectToHome,
        _ => Decision::Allow,
    };
    tracing::debug!(path, ?decision, "access gate evaluated");
    decision
}

/// Per-screen guard for screens reachable without passing the top-level gate.
pub fn guard_screen(state: &AuthState) -> ScreenGuard {
    if state.loading {
        ScreenGuard::Blank
    } else if state.is_signed_in() {
        ScreenGuard::Render
    } else {
        ScreenGuard::RedirectToLogin
    }
}
