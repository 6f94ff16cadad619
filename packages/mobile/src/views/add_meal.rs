//! Add-meal screen. Reachable from both route groups, so it guards itself.

use dioxus::prelude::*;
use ui::RouteGuard;

use crate::Route;

#[component]
pub fn AddMeal() -> Element {
    rsx! {
        RouteGuard {
            MealForm {}
        }
    }
}

#[component]
fn MealForm() -> Element {
    let nav = use_navigator();
    let mut meal = use_signal(String::new);
    let mut calories = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if meal().trim().is_empty() {
            error.set(Some("Meal name is required".to_string()));
            return;
        }
        if calories().trim().parse::<u32>().is_err() {
            error.set(Some("Calories must be a whole number".to_string()));
            return;
        }
        tracing::info!(meal = %meal().trim(), "meal added");
        nav.replace(Route::Home {});
    };

    rsx! {
        form {
            onsubmit: handle_submit,
            class: "flex flex-col gap-3 p-6 max-w-[360px]",
            h1 { class: "text-neutral-800 font-bold text-[1.5rem]", "Add a meal" }

            if let Some(err) = error() {
                div {
                    class: "px-2.5 py-2.5 bg-red-50 border border-red-200 rounded text-red-600 text-[0.8125rem]",
                    "{err}"
                }
            }

            input {
                class: "w-full px-3 py-2 border border-neutral-300 rounded",
                placeholder: "What did you eat?",
                value: meal(),
                oninput: move |evt: FormEvent| meal.set(evt.value()),
            }
            input {
                class: "w-full px-3 py-2 border border-neutral-300 rounded",
                r#type: "number",
                placeholder: "Calories",
                value: calories(),
                oninput: move |evt: FormEvent| calories.set(evt.value()),
            }
            button {
                class: "px-3 py-2 rounded bg-emerald-600 text-white font-semibold",
                r#type: "submit",
                "Save"
            }
        }
    }
}
