use crate::api::MarketApi;
use crate::dashboard::load::{load_dashboard, DashboardParams};
use crate::dashboard::state::{reduce, Action, DashboardState};
use anyhow::Context;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Owns the dashboard state and the request-generation counter.
///
/// Each parameter change bumps the generation and starts a load tagged with it.
/// Loads are never aborted; a completion whose generation is no longer current
/// is dropped by the reducer.
pub struct DashboardController {
    api: Arc<dyn MarketApi>,
    shared: Arc<Shared>,
}

struct Shared {
    inner: Mutex<Inner>,
    tx: watch::Sender<DashboardState>,
}

struct Inner {
    generation: u64,
    state: DashboardState,
}

impl Shared {
    fn next_generation(&self, make: impl FnOnce(u64) -> Action) -> u64 {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.generation += 1;
        let generation = inner.generation;
        Self::apply(&mut inner, &self.tx, make(generation));
        generation
    }

    /// Returns whether the action changed the state.
    fn dispatch(&self, action: Action) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Self::apply(&mut inner, &self.tx, action)
    }

    fn apply(inner: &mut Inner, tx: &watch::Sender<DashboardState>, action: Action) -> bool {
        let prev = std::mem::replace(&mut inner.state, DashboardState::Idle);
        let unchanged = prev.clone();
        inner.state = reduce(prev, action);
        if inner.state == unchanged {
            return false;
        }
        tx.send_replace(inner.state.clone());
        true
    }
}

impl DashboardController {
    pub fn new(api: Arc<dyn MarketApi>) -> Self {
        let (tx, _rx) = watch::channel(DashboardState::Idle);
        Self {
            api,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    generation: 0,
                    state: DashboardState::Idle,
                }),
                tx,
            }),
        }
    }

    pub fn state(&self) -> DashboardState {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
            .clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.shared.tx.subscribe()
    }

    /// Enters `Loading` immediately and starts fetching in the background.
    pub fn set_params(&self, params: DashboardParams) -> JoinHandle<()> {
        let generation = self.shared.next_generation(|generation| Action::ParamsChanged {
            generation,
            params: params.clone(),
        });
        tracing::info!(ticker = %params.ticker, horizon_days = params.horizon_days, window = params.window, generation, "dashboard load started");

        let api = Arc::clone(&self.api);
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let action = match load_dashboard(api.as_ref(), &params).await {
                Ok(data) => Action::Loaded { generation, data },
                Err(message) => Action::Failed {
                    generation,
                    message,
                },
            };

            if shared.dispatch(action) {
                tracing::info!(ticker = %params.ticker, generation, "dashboard load settled");
            } else {
                tracing::debug!(ticker = %params.ticker, generation, "discarded stale dashboard result");
            }
        })
    }

    /// Back to `Idle`; results of loads still in flight are discarded.
    pub fn cancel(&self) {
        let generation = self.shared.next_generation(|_| Action::Reset);
        tracing::debug!(generation, "dashboard loads cancelled");
    }

    /// Waits until the current load settles.
    ///
    /// Does not return while the controller is `Idle`.
    pub async fn wait_settled(&self) -> anyhow::Result<DashboardState> {
        let mut rx = self.subscribe();
        let state = rx
            .wait_for(|s| s.is_settled())
            .await
            .context("dashboard state channel closed")?;
        Ok(state.clone())
    }
}

impl Drop for DashboardController {
    fn drop(&mut self) {
        self.cancel();
    }
}
