//! Profile page: who is signed in, and the way out.

use dioxus::prelude::*;
use ui::{use_auth, LogoutButton};

#[component]
pub fn Profile() -> Element {
    let auth = use_auth();
    let Some(session) = auth().session else {
        return rsx! {};
    };
    let name = session.display_name().unwrap_or("Not set").to_string();
    let email = session.email().to_string();

    rsx! {
        div {
            class: "flex flex-col gap-4 p-6",
            h1 { class: "text-neutral-800 font-bold text-[1.5rem]", "Profile" }
            dl {
                class: "grid grid-cols-[auto_1fr] gap-x-4 gap-y-1 text-[0.9375rem]",
                dt { class: "text-neutral-500", "Name" }
                dd { class: "text-neutral-800", "{name}" }
                dt { class: "text-neutral-500", "Email" }
                dd { class: "text-neutral-800", "{email}" }
            }
            LogoutButton {
                class: "self-start px-3 py-2 rounded border border-red-300 text-red-600",
            }
        }
    }
}
