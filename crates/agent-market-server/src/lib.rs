use std::sync::Arc;

use agent_market_core::catalog::AgentRecord;
use agent_market_core::config::MarketConfig;
use agent_market_core::identity::{HttpIdentityProvider, IdentityProvider};
use agent_market_core::payment::{PaymentGateway, StripeGateway};
use agent_market_core::seed;
use agent_market_core::store::{AgentRepository, FileStore, MemoryStore};
use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod routes;

/// Shared by every handler. Collaborators left as `None` make their
/// endpoints answer 503.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn AgentRepository>,
    /// What `/api/seed` writes into the store.
    pub seed_data: Arc<Vec<AgentRecord>>,
    pub payments: Option<Arc<dyn PaymentGateway>>,
    pub identity: Option<Arc<dyn IdentityProvider>>,
}

impl AppState {
    pub fn new(repo: Arc<dyn AgentRepository>, seed_data: Vec<AgentRecord>) -> Self {
        Self {
            repo,
            seed_data: Arc::new(seed_data),
            payments: None,
            identity: None,
        }
    }

    pub fn with_payments(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.payments = Some(gateway);
        self
    }

    pub fn with_identity(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(provider);
        self
    }

    /// Wire up the store and collaborators described by `config`.
    pub fn from_config(config: &MarketConfig) -> anyhow::Result<Self> {
        let repo: Arc<dyn AgentRepository> = match &config.data_file {
            Some(path) => Arc::new(
                FileStore::open(path)
                    .with_context(|| format!("opening catalog file {}", path.display()))?,
            ),
            None => Arc::new(MemoryStore::default()),
        };

        let seed_data = match &config.seed_file {
            Some(path) => seed::load_catalog(path)
                .with_context(|| format!("loading seed catalog {}", path.display()))?,
            None => seed::load_bundled_catalog().context("loading bundled catalog")?,
        };
        let mut state = Self::new(repo, seed_data);

        if config.seed_on_start && state.repo.list()?.is_empty() {
            let n = seed::seed_with(state.repo.as_ref(), state.seed_data.to_vec())?;
            info!(count = n, "empty store seeded at startup");
        }

        let pay = &config.payment;
        match &pay.secret_key {
            Some(key) => {
                let gateway = StripeGateway::new(key.clone())
                    .with_api_base(pay.api_base.clone())
                    .with_currency(pay.currency.clone())
                    .with_redirects(pay.success_url.clone(), pay.cancel_url.clone());
                state = state.with_payments(Arc::new(gateway));
            }
            None => warn!("no payment secret key configured; checkout is disabled"),
        }

        if let Some(url) = &config.identity.session_url {
            state = state.with_identity(Arc::new(HttpIdentityProvider::new(url.clone())));
        }

        Ok(state)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/agents", get(routes::list_agents))
        .route("/api/agents/{id}", get(routes::get_agent))
        .route("/api/seed", get(routes::seed))
        .route("/api/checkout_sessions", post(routes::create_checkout))
        .route("/api/me", get(routes::me))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind `config.bind` and serve until ctrl-c.
pub async fn serve(config: MarketConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(addr = %listener.local_addr()?, "agent-market listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
