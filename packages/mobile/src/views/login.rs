//! Login page with email/password form.

use dioxus::prelude::*;
use ui::{sign_in_with_password, use_auth, use_session};

use super::describe;
use crate::Route;

/// Login page component. The access gate moves a signed-in user home.
#[component]
pub fn Login() -> Element {
    let auth = use_auth();
    let handle = use_session();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    let handle_login = move |evt: FormEvent| {
        evt.prevent_default();
        let handle = handle.clone();
        spawn(async move {
            error.set(None);

            let e = email().trim().to_string();
            let p = password();
            if e.is_empty() || p.is_empty() {
                error.set(Some("Email and password are required".to_string()));
                return;
            }

            let client = match handle.client() {
                Ok(client) => client,
                Err(err) => {
                    error.set(Some(err.to_string()));
                    return;
                }
            };

            loading.set(true);
            if let Err(err) = sign_in_with_password(client, &handle.store, &e, &p).await {
                error.set(Some(describe(&err)));
            }
            loading.set(false);
        });
    };

    // Left behind by a failed sign-out or an unreadable saved session.
    let notice = auth().last_error.map(|kind| kind.user_message());

    rsx! {
        div {
            class: "flex flex-col items-center justify-center min-h-screen p-8 bg-white",

            h1 {
                class: "mb-2 text-neutral-800 font-bold text-[1.75rem]",
                "Welcome back"
            }

            p {
                class: "mb-8 text-neutral-600 text-[0.9375rem]",
                "Sign in to NutriTrack"
            }

            form {
                onsubmit: handle_login,
                class: "flex flex-col gap-3 w-full max-w-[320px]",

                if let Some(notice) = notice {
                    div {
                        class: "px-2.5 py-2.5 bg-amber-50 border border-amber-200 rounded text-amber-700 text-[0.8125rem]",
                        "{notice}"
                    }
                }

                if let Some(err) = error() {
                    div {
                        class: "px-2.5 py-2.5 bg-red-50 border border-red-200 rounded text-red-600 text-[0.8125rem]",
                        "{err}"
                    }
                }

                input {
                    class: "w-full px-3 py-2 border border-neutral-300 rounded",
                    r#type: "email",
                    placeholder: "Email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }

                input {
                    class: "w-full px-3 py-2 border border-neutral-300 rounded",
                    r#type: "password",
                    placeholder: "Password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }

                button {
                    class: "w-full px-3 py-2 rounded bg-emerald-600 text-white font-semibold disabled:opacity-60",
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Signing in..." } else { "Sign in" }
                }
            }

            p {
                class: "mt-6 text-neutral-600 text-[0.875rem]",
                "No account yet? "
                Link { to: Route::Signup {}, class: "text-emerald-700 underline", "Create one" }
            }
        }
    }
}
