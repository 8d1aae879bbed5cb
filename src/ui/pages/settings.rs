use dioxus::prelude::*;

use crate::{
    app::{persist_user_state, Backend, StockReload},
    domain::{AppState, VisibilityFlags},
    ui::components::toast::{push_toast, ToastKind, ToastMessage},
    util::{
        config::{BASE_URL_VAR, TIMEOUT_VAR},
        persistence::clear_persisted_state,
        version::version_label,
    },
};

#[component]
pub fn SettingsPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let backend = use_context::<Option<Backend>>();
    let reload = use_context::<StockReload>();

    let (base_url, timeout, user_agent) = match &backend {
        Some(backend) => (
            backend.config.base_url.to_string(),
            format!("{}s", backend.config.timeout.as_secs()),
            backend.config.user_agent.clone(),
        ),
        None => ("not configured".to_string(), "–".to_string(), "–".to_string()),
    };

    let version = version_label();

    let on_reload_stock = {
        let toasts = toasts.clone();
        let backend = backend.clone();
        move |_| {
            let Some(backend) = backend.clone() else {
                push_toast(toasts.clone(), ToastKind::Warning, "No buyback backend is configured.");
                return;
            };
            tracing::debug!(base_url = %backend.config.base_url, "doctrine stock reload requested");
            reload.request();
            push_toast(toasts.clone(), ToastKind::Info, "Reloading doctrine stock...");
        }
    };

    let on_reset = {
        let mut state = state.clone();
        let toasts = toasts.clone();
        move |_| {
            state.with_mut(|st| st.visibility = VisibilityFlags::default());
            match clear_persisted_state() {
                Ok(()) => {
                    persist_user_state(&state);
                    push_toast(toasts.clone(), ToastKind::Info, "Restored default preferences.");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to clear persisted state");
                    push_toast(
                        toasts.clone(),
                        ToastKind::Error,
                        format!("Could not reset preferences: {err}"),
                    );
                }
            }
        }
    };

    rsx! {
        section { class: "panel",
            h2 { "Backend" }
            table {
                tbody {
                    tr { td { "Base URL" } td { "{base_url}" } }
                    tr { td { "Timeout" } td { "{timeout}" } }
                    tr { td { "User agent" } td { "{user_agent}" } }
                }
            }
            p { class: "muted", "Set {BASE_URL_VAR} and {TIMEOUT_VAR} before launching to change these." }
            div { class: "actions",
                button { class: "btn", onclick: on_reload_stock, "Reload doctrine stock" }
            }
        }
        section { class: "panel",
            h2 { "Preferences" }
            p { class: "muted", "Filters and your current item list are saved between sessions." }
            div { class: "actions",
                button { class: "btn btn-secondary", onclick: on_reset, "Reset preferences" }
            }
        }
        section { class: "panel",
            h2 { "About" }
            p { "Version {version}" }
        }
    }
}
