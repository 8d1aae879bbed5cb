use dioxus::prelude::*;

use crate::app::Route;
use crate::domain::AppState;
use crate::util::version::{version_label, APP_NAME};

#[component]
pub fn Shell(children: Element) -> Element {
    let state = use_context::<Signal<AppState>>();
    let current_route = use_route::<Route>();
    let navigator = use_navigator();

    let (loading, missing) = state.with(|st| (st.appraisal.is_loading(), st.stock_counts().missing));
    let stock_label = if missing > 0 {
        format!("Doctrine Stock ({missing} missing)")
    } else {
        "Doctrine Stock".to_string()
    };
    let version = version_label();
    let appraisal_label = if loading { "Appraisal …" } else { "Appraisal" };

    rsx! {
        div {
            header {
                class: "shell-header",
                div {
                    h1 { class: "shell-title", "{APP_NAME}" }
                    p { class: "muted", "v{version}" }
                }
                nav { class: "nav",
                    NavButton { active: matches!(current_route, Route::Appraisal {}), onclick: move |_| { navigator.push(Route::Appraisal {}); }, label: appraisal_label.to_string() }
                    NavButton { active: matches!(current_route, Route::DoctrineStock {}), onclick: move |_| { navigator.push(Route::DoctrineStock {}); }, label: stock_label }
                    NavButton { active: matches!(current_route, Route::Settings {}), onclick: move |_| { navigator.push(Route::Settings {}); }, label: "⚙️".to_string() }
                }
            }
            main { class: "shell-main",
                {children}
            }
        }
    }
}

#[component]
fn NavButton(active: bool, onclick: EventHandler<()>, label: String) -> Element {
    let class = if active { "nav-button active" } else { "nav-button" };

    rsx! {
        button {
            class: "{class}",
            onclick: move |_| onclick.call(()),
            "{label}"
        }
    }
}
