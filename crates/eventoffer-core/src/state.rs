use std::sync::Arc;

use eventoffer_auth::TokenVerifier;
use eventoffer_common::GlobalConfig;
use eventoffer_storage::Storage;

use crate::{AssociationService, EventService, OfferService};

/// Everything a request handler needs; shared behind an `Arc`.
pub struct AppState {
    pub global: GlobalConfig,
    pub storage: Arc<dyn Storage>,
    pub events: EventService,
    pub offers: OfferService,
    pub associations: AssociationService,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(
        global: GlobalConfig,
        storage: Arc<dyn Storage>,
        verifier: Arc<TokenVerifier>,
    ) -> Self {
        Self {
            global,
            events: EventService::new(storage.clone()),
            offers: OfferService::new(storage.clone()),
            associations: AssociationService::new(storage.clone()),
            storage,
            verifier,
        }
    }
}
