//! Authentication context, hooks and gate components for the UI.

use std::rc::Rc;

use api::{AuthError, SupabaseAuth};
use dioxus::prelude::*;
use store::NutriTrackConfig;

use crate::account::sign_out_everywhere;
use crate::gate::{decide, guard_screen, Decision, RouteTable, ScreenGuard};
use crate::session::{AuthState, SessionError, SessionStore};
use crate::storage::{make_store, AppStore};

/// Everything the auth components share, provided as context by
/// [`AuthProvider`].
#[derive(Clone)]
pub struct SessionHandle {
    pub store: Rc<SessionStore<AppStore>>,
    pub routes: Rc<RouteTable>,
    client: Rc<Result<SupabaseAuth, AuthError>>,
}

impl SessionHandle {
    /// Build the handle from configuration. An invalid route table or storage
    /// key falls back to the defaults.
    pub fn new(config: &NutriTrackConfig) -> Self {
        let (config, routes) = match RouteTable::from_config(config) {
            Ok(routes) => (config.clone(), routes),
            Err(e) => {
                tracing::error!(error = %e, "invalid navigation config, using defaults");
                (NutriTrackConfig::default(), RouteTable::default())
            }
        };

        let client = SupabaseAuth::from_env();
        if let Err(e) = &client {
            tracing::warn!(error = %e, "auth provider not configured");
        }

        Self {
            store: Rc::new(SessionStore::new(make_store(), config.session.storage_key)),
            routes: Rc::new(routes),
            client: Rc::new(client),
        }
    }

    /// The auth provider client, or the configuration error that kept it from
    /// being built.
    pub fn client(&self) -> Result<&SupabaseAuth, AuthError> {
        self.client.as_ref().as_ref().map_err(|e| e.clone())
    }
}

/// Get the current authentication state.
/// Returns a signal that updates whenever the session store changes.
pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

/// Get the shared session store, route table and auth client.
pub fn use_session() -> SessionHandle {
    use_context::<SessionHandle>()
}

/// Provider component that owns the session store.
/// Wrap your app with this component to enable authentication.
#[component]
pub fn AuthProvider(#[props(default)] config: NutriTrackConfig, children: Element) -> Element {
    let mut auth_state = use_signal(AuthState::default);
    let handle = use_context_provider(|| SessionHandle::new(&config));
    use_context_provider(|| auth_state);

    // Mirror store changes into the signal, then restore the persisted session once.
    use_hook(|| {
        handle
            .store
            .subscribe(move |state: &AuthState| auth_state.set(state.clone()));

        // Retry removing an entry a failed sign-out left behind.
        let weak = Rc::downgrade(&handle.store);
        handle.store.subscribe(move |state: &AuthState| {
            if !state.has_stale_entry() {
                return;
            }
            let Some(store) = weak.upgrade() else {
                return;
            };
            spawn(async move {
                if let Err(e) = store.purge_stale().await {
                    tracing::warn!(error = %e, "stale session purge failed");
                }
            });
        });

        let store = handle.store.clone();
        spawn(async move {
            if let Err(e) = store.load().await {
                tracing::warn!(error = %e, "could not restore session");
            }
        });
    });

    rsx! {
        {children}
    }
}

/// Top-level gate: renders `children` when `path` may be shown, otherwise
/// redirects.
///
/// Until the first load settles nothing is rendered. A later pending state
/// (sign-in or sign-out in flight) keeps showing the current screen.
#[component]
pub fn AccessGate(path: String, children: Element) -> Element {
    let auth = use_auth();
    let handle = use_session();
    let nav = use_navigator();

    let decision = decide(&auth(), &path, &handle.routes);
    if let Some(target) = handle.routes.redirect_target(decision) {
        tracing::info!(from = %path, to = target, "access gate redirect");
        nav.replace(target.to_string());
        return rsx! {};
    }

    match decision {
        Decision::Pending if !handle.store.is_settled() => rsx! {},
        _ => rsx! {
            {children}
        },
    }
}

/// Per-screen guard for screens the top-level gate lets through on the allow
/// list. Renders nothing while loading and redirects to login without a
/// session.
#[component]
pub fn RouteGuard(children: Element) -> Element {
    let auth = use_auth();
    let handle = use_session();
    let nav = use_navigator();

    match guard_screen(&auth()) {
        ScreenGuard::Blank => rsx! {},
        ScreenGuard::Render => rsx! {
            {children}
        },
        ScreenGuard::RedirectToLogin => {
            nav.replace(handle.routes.login().to_string());
            rsx! {}
        }
    }
}

/// Button to log out the current user.
///
/// The local session is cleared even when sign-out reports an error, so the
/// user always lands on login. A storage failure stays in
/// [`AuthState::last_error`] for the login screen to show.
#[component]
pub fn LogoutButton(
    #[props(default = "Log out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let handle = use_session();
    let nav = use_navigator();
    let busy = handle.store.is_busy();

    let onclick = move |_| {
        let handle = handle.clone();
        async move {
            let result = match handle.client() {
                Ok(client) => sign_out_everywhere(client, &handle.store).await,
                Err(_) => handle.store.sign_out().await,
            };
            match result {
                Ok(()) => {}
                Err(SessionError::Busy) => return,
                Err(SessionError::Provider(e)) => {
                    tracing::warn!(error = %e, "remote sign-out failed");
                }
                Err(e) => tracing::error!(error = %e, "sign-out failed"),
            }
            nav.replace(handle.routes.login().to_string());
        }
    };

    rsx! {
        button {
            class: "{class}",
            disabled: busy,
            onclick: onclick,
            "{label}"
        }
    }
}
