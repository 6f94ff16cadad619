//! Sign-up page with name, email and password confirmation.

use dioxus::prelude::*;
use ui::{sign_up, use_session};

use super::describe;
use crate::Route;

/// Sign-up page component. A created account is sent to login; the provider
/// may still require email confirmation.
#[component]
pub fn Signup() -> Element {
    let handle = use_session();
    let nav = use_navigator();
    let mut name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut confirm_password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    let handle_signup = move |evt: FormEvent| {
        evt.prevent_default();
        let handle = handle.clone();
        spawn(async move {
            error.set(None);

            let client = match handle.client() {
                Ok(client) => client,
                Err(err) => {
                    error.set(Some(err.to_string()));
                    return;
                }
            };

            loading.set(true);
            let result = sign_up(client, &name(), &email(), &password(), &confirm_password()).await;
            loading.set(false);
            match result {
                Ok(_) => {
                    tracing::info!("account created, returning to login");
                    nav.replace(Route::Login {});
                }
                Err(err) => error.set(Some(describe(&err))),
            }
        });
    };

    rsx! {
        div {
            class: "flex flex-col items-center justify-center min-h-screen p-8 bg-white",

            h1 {
                class: "mb-2 text-neutral-800 font-bold text-[1.75rem]",
                "Create Account"
            }

            p {
                class: "mb-8 text-neutral-600 text-[0.9375rem]",
                "Sign up for NutriTrack"
            }

            form {
                onsubmit: handle_signup,
                class: "flex flex-col gap-3 w-full max-w-[320px]",

                if let Some(err) = error() {
                    div {
                        class: "px-2.5 py-2.5 bg-red-50 border border-red-200 rounded text-red-600 text-[0.8125rem]",
                        "{err}"
                    }
                }

                input {
                    class: "w-full px-3 py-2 border border-neutral-300 rounded",
                    r#type: "text",
                    placeholder: "Name",
                    value: name(),
                    oninput: move |evt: FormEvent| name.set(evt.value()),
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

                input {
                    class: "w-full px-3 py-2 border border-neutral-300 rounded",
                    r#type: "password",
                    placeholder: "Confirm password",
                    value: confirm_password(),
                    oninput: move |evt: FormEvent| confirm_password.set(evt.value()),
                }

                button {
                    class: "w-full px-3 py-2 rounded bg-emerald-600 text-white font-semibold disabled:opacity-60",
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Creating account..." } else { "Sign up" }
                }
            }

            p {
                class: "mt-6 text-neutral-600 text-[0.875rem]",
                "Already have an account? "
                Link { to: Route::Login {}, class: "text-emerald-700 underline", "Sign in" }
            }
        }
    }
}
