use std::time::SystemTime;

use dioxus::prelude::*;

use crate::{
    app::{persist_user_state, StockReload, STOCK_TTL},
    domain::AppState,
    ui::components::{
        kpi_card::KpiCard,
        stock_table::{StockRow, StockTable},
    },
};

#[component]
pub fn DoctrineStockPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let reload = use_context::<StockReload>();

    let flags = state.with(|st| st.visibility);
    let counts = state.with(|st| st.stock_counts());
    let stale = state.with(|st| st.is_stock_stale(STOCK_TTL));
    let fetched_at = state.with(|st| st.stock_fetched_at);
    let rows: Vec<StockRow> = state.with(|st| {
        st.visible_stock()
            .into_iter()
            .enumerate()
            .map(StockRow::from)
            .collect()
    });

    let empty_message = if counts.total() == 0 {
        "No doctrine stock loaded yet.".to_string()
    } else {
        "Nothing matches the current filters.".to_string()
    };

    let toggle_stocked = {
        let mut state = state.clone();
        move |_| {
            state.with_mut(|st| st.visibility.show_stocked = !st.visibility.show_stocked);
            persist_user_state(&state);
        }
    };

    let toggle_missing_only = {
        let mut state = state.clone();
        move |_| {
            state.with_mut(|st| {
                st.visibility.show_missing_only = !st.visibility.show_missing_only
            });
            persist_user_state(&state);
        }
    };

    rsx! {
        section { class: "panel",
            h2 { "Doctrine Stock" }
            div { class: "kpis",
                KpiCard { title: "Missing".to_string(), value: counts.missing.to_string(), description: None }
                KpiCard { title: "Well priced".to_string(), value: counts.well_priced.to_string(), description: None }
                KpiCard { title: "Other".to_string(), value: counts.other.to_string(), description: Some(format!("{} tracked item(s)", counts.total())) }
            }
            div { class: "toggles",
                label {
                    input {
                        r#type: "checkbox",
                        checked: flags.show_stocked,
                        onclick: toggle_stocked,
                    }
                    " Show well-priced items"
                }
                label {
                    input {
                        r#type: "checkbox",
                        checked: flags.show_missing_only,
                        onclick: toggle_missing_only,
                    }
                    " Only missing items"
                }
                button {
                    class: "btn btn-secondary",
                    onclick: move |_| reload.request(),
                    "Reload"
                }
            }
            p { class: "muted", {fetched_label(fetched_at, stale)} }
            StockTable { rows, empty_message }
        }
    }
}

fn fetched_label(fetched_at: Option<SystemTime>, stale: bool) -> String {
    let Some(time) = fetched_at else {
        return "Not loaded yet.".to_string();
    };
    let age = humanize_age(time);
    if stale {
        format!("Loaded {age}; this list may be outdated.")
    } else {
        format!("Loaded {age}.")
    }
}

pub fn humanize_age(time: SystemTime) -> String {
    match time.elapsed() {
        Ok(elapsed) => {
            let secs = elapsed.as_secs();
            if secs < 60 {
                format!("{secs}s ago")
            } else if secs < 3600 {
                format!("{}m ago", secs / 60)
            } else {
                format!("{}h ago", secs / 3600)
            }
        }
        Err(_) => "just now".into(),
    }
}
