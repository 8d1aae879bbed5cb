use std::time::Duration;

use dioxus::{prelude::*, signals::Signal};

use crate::{
    domain::AppState,
    infra::buyback::{BuybackClient, CacheStatus},
    ui::{
        components::toast::{push_toast, Toast, ToastKind, ToastMessage},
        pages::{AppraisalPage, DoctrineStockPage, SettingsPage},
        shell::Shell,
    },
    util::{
        assets,
        config::ClientConfig,
        persistence::{load_persisted_state, save_persisted_state},
    },
};

/// How long a loaded doctrine stock list is shown before it counts as outdated.
pub const STOCK_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    #[route("/appraisal")]
    Appraisal {},
    #[route("/doctrine-stock")]
    DoctrineStock {},
    #[route("/settings")]
    Settings {},
}

/// Resolved backend settings and the client built from them.
#[derive(Clone)]
pub struct Backend {
    pub config: ClientConfig,
    pub client: BuybackClient,
}

/// Bumped to request a doctrine stock load that skips the client cache.
#[derive(Clone, Copy)]
pub struct StockReload(pub Signal<u32>);

impl StockReload {
    pub fn request(mut self) {
        self.0.with_mut(|generation| *generation += 1);
    }
}

fn connect_backend() -> Result<Backend, String> {
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(error = %err, "invalid backend configuration; using defaults");
            ClientConfig::from_lookup(|_| None).map_err(|err| err.to_string())?
        }
    };
    let client = BuybackClient::new(&config).map_err(|err| err.to_string())?;
    tracing::info!(base_url = %config.base_url, "buyback backend configured");
    Ok(Backend { config, client })
}

#[component]
pub fn App() -> Element {
    let state = use_signal(AppState::default);
    use_hook({
        let mut state = state.clone();
        move || {
            if let Some(saved) = load_persisted_state() {
                state.with_mut(|st| st.apply_persisted(saved));
            }
        }
    });
    use_context_provider(|| state.clone());

    let toasts = use_signal(Vec::<ToastMessage>::new);
    use_context_provider(|| toasts.clone());

    let backend = use_hook(|| match connect_backend() {
        Ok(backend) => Some(backend),
        Err(err) => {
            tracing::error!(error = %err, "failed to initialise buyback client");
            push_toast(
                toasts.clone(),
                ToastKind::Error,
                format!("Failed to initialise buyback client: {err}"),
            );
            None
        }
    });
    use_context_provider(|| backend.clone());

    let reload = use_signal(|| 0_u32);
    use_context_provider(|| StockReload(reload));

    let _stock = use_resource({
        let state = state.clone();
        let toasts = toasts.clone();
        let backend = backend.clone();
        move || {
            let backend = backend.clone();
            async move { fetch_doctrine_stock(state.clone(), toasts.clone(), backend, reload).await }
        }
    });

    rsx! {
        document::Style { "{assets::main_css()}" }
        Router::<Route> {}
        Toast {}
    }
}

pub fn persist_user_state(state: &Signal<AppState>) {
    let snapshot = state.with(|st| st.to_persisted());
    if let Err(err) = save_persisted_state(&snapshot) {
        tracing::warn!(error = %err, "failed to persist user state");
    }
}

/// The start-up load may come from the cache; every explicit reload goes to the backend.
fn bypasses_cache(generation: u32) -> bool {
    generation > 0
}

async fn fetch_doctrine_stock(
    mut state: Signal<AppState>,
    toasts: Signal<Vec<ToastMessage>>,
    backend: Option<Backend>,
    reload: Signal<u32>,
) -> Option<CacheStatus> {
    let generation = reload();
    let backend = backend?;
    tracing::debug!(generation, "loading doctrine stock");

    let loaded = if bypasses_cache(generation) {
        backend.client.reload_doctrine_stock().await
    } else {
        backend.client.get_doctrine_stock().await
    };
    match loaded {
        Ok(payload) => {
            let count = payload.data.len();
            state.with_mut(|st| st.replace_stock(payload.data, payload.fetched_at));
            if payload.status == CacheStatus::Stale {
                push_toast(
                    toasts.clone(),
                    ToastKind::Warning,
                    "Showing cached doctrine stock; the backend did not answer.",
                );
            }
            tracing::info!(count, status = ?payload.status, "doctrine stock ready");
            Some(payload.status)
        }
        Err(err) => {
            tracing::warn!(error = %err, "doctrine stock load failed");
            push_toast(
                toasts.clone(),
                ToastKind::Error,
                format!("Failed to load doctrine stock: {err}"),
            );
            None
        }
    }
}

#[component]
pub fn Appraisal() -> Element {
    rsx! { Shell { AppraisalPage {} } }
}

#[component]
pub fn DoctrineStock() -> Element {
    rsx! { Shell { DoctrineStockPage {} } }
}

#[component]
pub fn Settings() -> Element {
    rsx! { Shell { SettingsPage {} } }
}

#[cfg(test)]
mod tests {
    use super::bypasses_cache;

    #[test]
    fn only_explicit_reloads_skip_the_cache() {
        assert!(!bypasses_cache(0));
        assert!(bypasses_cache(1));
        assert!(bypasses_cache(7));
    }
}
