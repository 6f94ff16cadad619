use dioxus::prelude::*;
use store::NutriTrackConfig;
use views::{AddMeal, Explore, Home, Login, NotFound, Profile, Signup};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Gate)]
        #[route("/")]
        Home {},
        #[route("/explore")]
        Explore {},
        #[route("/profile")]
        Profile {},
        #[route("/login")]
        Login {},
        #[route("/signup")]
        Signup {},
        #[route("/add-meal")]
        AddMeal {},
        #[route("/:..segments")]
        NotFound { segments: Vec<String> },
}

const CONFIG: &str = include_str!("../nutritrack.toml");

fn main() {
    dioxus::launch(App);
}

fn load_config() -> NutriTrackConfig {
    NutriTrackConfig::from_toml(CONFIG).unwrap_or_else(|e| {
        tracing::error!(error = %e, "bundled {} is invalid, using defaults", NutriTrackConfig::filename());
        NutriTrackConfig::default()
    })
}

#[component]
fn App() -> Element {
    let config = use_hook(load_config);

    rsx! {
        ui::AuthProvider {
            config,
            Router::<Route> {}
        }
    }
}

/// Layout that runs every navigation through the access gate.
#[component]
fn Gate() -> Element {
    let path = use_route::<Route>().to_string();

    rsx! {
        ui::AccessGate {
            path,
            Outlet::<Route> {}
        }
    }
}
