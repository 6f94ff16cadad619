use dioxus::prelude::*;

use crate::Route;

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    let path = format!("/{}", segments.join("/"));

    rsx! {
        div {
            class: "flex flex-col gap-4 p-6",
            h1 { class: "text-neutral-800 font-bold text-[1.5rem]", "Page not found" }
            p { class: "text-neutral-600", "Nothing lives at {path}." }
            Link { to: Route::Home {}, class: "text-emerald-700 underline", "Back home" }
        }
    }
}
