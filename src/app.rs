use std::{sync::Arc, time::SystemTime};

use dioxus::{prelude::*, signals::Signal};
use tracing::{info, warn};

use crate::{
    domain::{
        parse_item_list, resolve_items, unique_names, AllocationError, AppState, CacheResource,
        Item, ResolvedInput, SplitPlan,
    },
    infra::{
        cache::{CacheDir, CatalogCache},
        esi::{CacheStatus, EsiClient, CATALOG_SIZE},
    },
    ui::{
        components::toast::{push_toast, Toast, ToastKind, ToastMessage},
        pages::{SettingsPage, SplitterPage},
        shell::Shell,
    },
    util::{
        assets,
        persistence::{load_preferences, save_preferences, FileStore, MemoryStore, PreferenceStore},
    },
};

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    Splitter {},
    #[route("/settings")]
    Settings {},
}

/// Preference storage shared through context.
#[derive(Clone)]
pub struct Store(pub Arc<dyn PreferenceStore>);

impl Store {
    fn open() -> Self {
        match FileStore::default_location() {
            Some(store) => Store(Arc::new(store)),
            None => {
                warn!("no config directory; preferences will not survive a restart");
                Store(Arc::new(MemoryStore::default()))
            }
        }
    }
}

/// Cargo text queued for resolution and splitting.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitRequest {
    pub input: String,
    /// Discard previously resolved market data for this input.
    pub refresh: bool,
}

#[component]
pub fn App() -> Element {
    let store = use_hook(Store::open);
    let mut state = use_signal(AppState::default);
    use_hook({
        let store = store.clone();
        move || {
            if let Some(saved) = load_preferences(store.0.as_ref()) {
                state.with_mut(|st| st.apply_persisted(saved));
            }
        }
    });
    use_context_provider(|| state);
    use_context_provider(|| store.clone());

    let toasts = use_signal(Vec::<ToastMessage>::new);
    use_context_provider(|| toasts);

    let client = use_hook(|| match EsiClient::new() {
        Ok(client) => Some(client),
        Err(error) => {
            warn!(%error, "failed to build ESI client");
            None
        }
    });
    use_context_provider(|| client.clone());

    let split_request = use_signal(|| None::<SplitRequest>);
    use_context_provider(|| split_request);

    let catalog_reload = use_signal(|| 0u32);
    use_context_provider(|| CatalogReload(catalog_reload));

    let _catalog = use_resource({
        let client = client.clone();
        move || {
            let client = client.clone();
            let _generation = catalog_reload();
            async move { load_catalog(client, state, toasts).await }
        }
    });

    let _split = use_resource({
        let client = client.clone();
        move || {
            let client = client.clone();
            async move { run_split(client, state, toasts, split_request).await }
        }
    });

    rsx! {
        document::Link { rel: "icon", href: assets::favicon_data_uri() }
        document::Style { "{assets::main_css()}" }
        Router::<Route> {}
        Toast {}
    }
}

/// Bumped to force the catalog to be fetched again.
#[derive(Clone, Copy)]
pub struct CatalogReload(pub Signal<u32>);

pub fn persist_user_state(state: &Signal<AppState>, store: &Store) {
    let snapshot = state.with(|st| st.to_persisted());
    if let Err(error) = save_preferences(store.0.as_ref(), &snapshot) {
        warn!(%error, "failed to persist preferences");
    }
}

async fn load_catalog(
    client: Option<EsiClient>,
    mut state: Signal<AppState>,
    toasts: Signal<Vec<ToastMessage>>,
) -> Option<usize> {
    let cache_dir = CacheDir::default_location();
    if let Some(cached) = cache_dir.load_catalog() {
        let count = cached.names.len();
        let fetched_at = SystemTime::now()
            .checked_sub(cached.age())
            .unwrap_or_else(SystemTime::now);
        state.with_mut(|st| {
            st.catalog = cached.names;
            st.cache.record_fetch(CacheResource::Catalog, fetched_at);
        });
        return Some(count);
    }

    let Some(client) = client else {
        push_toast(toasts, ToastKind::Error, "ESI client unavailable; autocomplete disabled.");
        return None;
    };

    match client.get_catalog(CATALOG_SIZE).await {
        Ok(names) => {
            let cached = CatalogCache::new(names.clone());
            if let Err(error) = cache_dir.save_catalog(&cached) {
                warn!(%error, "failed to write catalog cache");
            }
            let count = names.len();
            state.with_mut(|st| {
                st.catalog = names;
                st.cache
                    .record_fetch(CacheResource::Catalog, SystemTime::now());
            });
            Some(count)
        }
        Err(error) => {
            warn!(%error, "catalog fetch failed");
            push_toast(
                toasts,
                ToastKind::Warning,
                format!("Could not load item names for autocomplete: {error}"),
            );
            None
        }
    }
}

async fn run_split(
    client: Option<EsiClient>,
    mut state: Signal<AppState>,
    toasts: Signal<Vec<ToastMessage>>,
    mut split_request: Signal<Option<SplitRequest>>,
) -> Option<usize> {
    let request = split_request()?;
    split_request.set(None);

    let Some(client) = client else {
        push_toast(toasts, ToastKind::Error, "ESI client unavailable.");
        return None;
    };

    let (reuse, preferences) = state.with_peek(|st| {
        let reuse = if request.refresh {
            None
        } else {
            st.resolved_items_for(&request.input)
        };
        (reuse, st.preferences.clone())
    });

    state.with_mut(|st| st.loading = true);
    let items = match reuse {
        Some(items) => Ok(items),
        None => resolve_input(&client, &request.input, state, toasts).await,
    };

    let outcome = items.and_then(|items| {
        SplitPlan::build(items.clone(), preferences.strategy, preferences.limits())
            .map(|plan| (items, plan))
            .map_err(|error| error.to_string())
    });

    match outcome {
        Ok((items, plan)) => {
            let count = plan.shipments.len();
            info!(freighters = count, strategy = plan.strategy.key(), "split complete");
            state.with_mut(|st| {
                st.loading = false;
                st.resolved = Some(ResolvedInput {
                    input: request.input.clone(),
                    items,
                });
                st.plan = Some(plan);
            });
            Some(count)
        }
        Err(message) => {
            state.with_mut(|st| {
                st.loading = false;
                st.plan = None;
            });
            push_toast(toasts, ToastKind::Error, message);
            None
        }
    }
}

async fn resolve_input(
    client: &EsiClient,
    input: &str,
    mut state: Signal<AppState>,
    toasts: Signal<Vec<ToastMessage>>,
) -> Result<Vec<Item>, String> {
    let requests = parse_item_list(input);
    if requests.is_empty() {
        return Err(AllocationError::InputEmpty.to_string());
    }

    let infos = client
        .fetch_items_info(&unique_names(&requests))
        .await
        .map_err(|error| format!("Failed to fetch market data: {error}"))?;

    if let Ok(prices) = client.get_market_prices().await {
        state.with_mut(|st| {
            st.cache
                .record_fetch(CacheResource::MarketPrices, prices.fetched_at)
        });
        if prices.status == CacheStatus::Stale {
            push_toast(
                toasts,
                ToastKind::Warning,
                "ESI unreachable; values use cached market prices.",
            );
        }
    }

    resolve_items(&requests, &infos).map_err(|error| error.to_string())
}

#[component]
pub fn Splitter() -> Element {
    rsx! { Shell { SplitterPage {} } }
}

#[component]
pub fn Settings() -> Element {
    rsx! { Shell { SettingsPage {} } }
}
