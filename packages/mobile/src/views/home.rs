use dioxus::prelude::*;
use ui::use_auth;

use crate::Route;

#[component]
pub fn Home() -> Element {
    let auth = use_auth();
    let greeting = auth()
        .session
        .map(|s| format!("Hello, {}", s.display_label()))
        .unwrap_or_default();

    rsx! {
        div {
            class: "flex flex-col gap-4 p-6",
            h1 { class: "text-neutral-800 font-bold text-[1.5rem]", "{greeting}" }
            p { class: "text-neutral-600", "Track what you eat today." }
            nav {
                class: "flex gap-4 text-emerald-700 underline",
                Link { to: Route::AddMeal {}, "Add a meal" }
                Link { to: Route::Explore {}, "Explore" }
                Link { to: Route::Profile {}, "Profile" }
            }
        }
    }
}
