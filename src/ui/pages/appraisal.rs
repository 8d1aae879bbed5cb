use dioxus::prelude::*;

use crate::{
    app::{persist_user_state, Backend},
    domain::{dispatch, AppState, CompletionOutcome, SubmissionErrorKind, SubmissionStatus},
    ui::{
        components::{
            appraisal_table::{AppraisalRow, AppraisalTable},
            kpi_card::KpiCard,
            toast::{push_toast, ToastAlerts, ToastKind, ToastMessage},
        },
        format::{format_isk, format_quantity},
    },
};

#[component]
pub fn AppraisalPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let backend = use_context::<Option<Backend>>();

    let session = state.with(|st| st.appraisal.clone());
    let draft = session.draft().clone();
    let raw_text = draft.raw_text().to_string();
    let loading = session.is_loading();
    let can_submit = !loading && draft.input_lines().next().is_some() && backend.is_some();

    let on_input = {
        let mut state = state.clone();
        move |evt: FormEvent| {
            let value = evt.value();
            state.with_mut(|st| st.appraisal.set_raw(value));
        }
    };

    let on_blur = {
        let state = state.clone();
        move |_| persist_user_state(&state)
    };

    let on_submit = {
        let mut state = state.clone();
        let toasts = toasts.clone();
        let backend = backend.clone();
        move |_| {
            let Some(backend) = backend.clone() else {
                push_toast(
                    toasts.clone(),
                    ToastKind::Error,
                    "No buyback backend is configured.",
                );
                return;
            };

            let pending = match state.with_mut(|st| st.appraisal.begin_submit()) {
                Ok(pending) => pending,
                Err(rejected) => {
                    push_toast(toasts.clone(), ToastKind::Warning, rejected.to_string());
                    return;
                }
            };
            persist_user_state(&state);

            let mut state = state.clone();
            let toasts = toasts.clone();
            spawn(async move {
                let completion = dispatch(&backend.client, pending).await;
                let alerts = ToastAlerts(toasts.clone());
                let outcome = state.with_mut(|st| st.appraisal.complete(completion, &alerts));
                if outcome == CompletionOutcome::Replaced {
                    let items = state.with(|st| st.appraisal.draft().item_count());
                    push_toast(
                        toasts.clone(),
                        ToastKind::Success,
                        format!("Appraised {items} item(s)."),
                    );
                }
                persist_user_state(&state);
            });
        }
    };

    let on_clear = {
        let mut state = state.clone();
        let toasts = toasts.clone();
        move |_| {
            state.with_mut(|st| st.appraisal.reset());
            persist_user_state(&state);
            push_toast(toasts.clone(), ToastKind::Info, "Cleared the appraisal.");
        }
    };

    let status_view = match session.status() {
        SubmissionStatus::Idle => rsx! {
            p { class: "muted", "Paste items from your inventory, one per line." }
        },
        SubmissionStatus::Loading(_) => rsx! {
            div { class: "actions",
                span { class: "spinner" }
                span { "Appraising…" }
            }
        },
        SubmissionStatus::Succeeded => rsx! { Fragment {} },
        SubmissionStatus::Failed(err) => {
            let hint = match err.kind() {
                SubmissionErrorKind::Transport => "Check that the buyback backend is reachable.",
                SubmissionErrorKind::MalformedResponse => "The backend sent an answer this client could not read.",
            };
            rsx! {
                div { class: "panel",
                    p { "{err}" }
                    p { class: "muted", "{hint} Your item list was kept; you can retry." }
                }
            }
        }
    };

    let result_view = if session.submit_done() && draft.has_valuation() {
        let rows: Vec<AppraisalRow> = draft.items.iter().map(AppraisalRow::from).collect();
        let total = format_isk(draft.buyback_total());
        let quantity = format_quantity(draft.total_quantity() as i64);
        let jita_buy = draft.jita_buy.map(format_isk).unwrap_or_else(|| "n/a".to_string());
        let link = draft.link.clone();
        rsx! {
            section { class: "panel",
                div { class: "kpis",
                    KpiCard { title: "Buyback".to_string(), value: format!("{total} ISK"), description: None }
                    KpiCard { title: "Jita buy".to_string(), value: jita_buy, description: None }
                    KpiCard { title: "Units".to_string(), value: quantity, description: Some(format!("{} line(s)", draft.item_count())) }
                }
                if let Some(link) = link {
                    p { class: "muted", "Appraisal: " a { href: "{link}", target: "_blank", "{link}" } }
                }
                AppraisalTable { rows }
            }
        }
    } else {
        rsx! { Fragment {} }
    };

    rsx! {
        section { class: "panel",
            h2 { "Appraisal" }
            textarea {
                rows: "12",
                placeholder: "Tritanium 1000\nPyerite 500",
                disabled: loading,
                value: "{raw_text}",
                oninput: on_input,
                onblur: on_blur,
            }
            div { class: "actions",
                button { class: "btn", disabled: !can_submit, onclick: on_submit, "Appraise" }
                button { class: "btn btn-secondary", disabled: loading, onclick: on_clear, "Clear" }
            }
            {status_view}
        }
        {result_view}
    }
}
