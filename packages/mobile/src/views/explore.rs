use dioxus::prelude::*;

use crate::Route;

#[component]
pub fn Explore() -> Element {
    rsx! {
        div {
            class: "flex flex-col gap-4 p-6",
            h1 { class: "text-neutral-800 font-bold text-[1.5rem]", "Explore" }
            p { class: "text-neutral-600", "Recipes and foods will show up here." }
            Link { to: Route::Home {}, class: "text-emerald-700 underline", "Back home" }
        }
    }
}
