use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, StoreMode};
use crate::domains::promotions::issuance::IssuanceService;
use crate::domains::promotions::qr_render::QrRenderer;
use crate::domains::promotions::redemption::RedemptionService;
use crate::domains::promotions::token::TokenSigner;
use crate::store::{InMemoryPromotionStore, PromotionStore, RemotePromotionStore};

/// Shared application state: the promotion store selected by configuration
/// and the services wired on top of it.
pub struct AppState {
    pub config: Config,
    pub promotion_store: Arc<dyn PromotionStore>,
    pub issuance_service: IssuanceService,
    pub redemption_service: RedemptionService,
    pub qr_renderer: QrRenderer,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let signer = TokenSigner::new(config.token.secret.clone());

        let promotion_store: Arc<dyn PromotionStore> = match config.store.mode {
            StoreMode::Memory => Arc::new(InMemoryPromotionStore::new()),
            StoreMode::Remote => Arc::new(RemotePromotionStore::new(
                config.store.remote_base_url.clone(),
                config.store.remote_api_key.clone(),
                Duration::from_secs(config.store.request_timeout_seconds),
            )?),
        };

        let issuance_service =
            IssuanceService::new(signer.clone(), config.token.min_lifetime_seconds);
        let redemption_service = RedemptionService::new(signer, promotion_store.clone());

        Ok(Self {
            config,
            promotion_store,
            issuance_service,
            redemption_service,
            qr_renderer: QrRenderer::default(),
        })
    }
}
