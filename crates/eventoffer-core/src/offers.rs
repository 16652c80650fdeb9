use std::sync::Arc;

use eventoffer_storage::{NewOffer, Offer, OfferPatch, Page, Storage};
use tracing::info;

use crate::error::{ServiceError, ServiceResult, conflict_as, insert_conflict};

const NOT_FOUND: &str = "Offer not found";
const CODE_TAKEN: &str = "Offer with this code already exists";
const ID_TAKEN: &str = "Offer with this id already exists";

#[derive(Clone)]
pub struct OfferService {
    storage: Arc<dyn Storage>,
}

impl OfferService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn create(&self, offer: NewOffer) -> ServiceResult<Offer> {
        if self.storage.find_offer_by_code(&offer.code).await?.is_some() {
            return Err(ServiceError::Conflict(CODE_TAKEN.to_string()));
        }
        if self.storage.get_offer(&offer.id).await?.is_some() {
            return Err(ServiceError::Conflict(ID_TAKEN.to_string()));
        }

        let created = self
            .storage
            .insert_offer(offer)
            .await
            .map_err(insert_conflict(CODE_TAKEN, ID_TAKEN))?;
        info!(offer_id = %created.id, code = %created.code, "offer created");
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Offer> {
        self.storage
            .get_offer(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn list(&self, offset: Option<u64>, limit: Option<u64>) -> ServiceResult<Vec<Offer>> {
        Ok(self.storage.list_offers(Page::new(offset, limit)).await?)
    }

    pub async fn update(&self, id: &str, patch: OfferPatch) -> ServiceResult<Offer> {
        let current = self.get(id).await?;
        if let Some(code) = patch.code.as_deref()
            && code != current.code
            && let Some(holder) = self.storage.find_offer_by_code(code).await?
            && holder.id != id
        {
            return Err(ServiceError::Conflict(CODE_TAKEN.to_string()));
        }

        self.storage
            .update_offer(id, patch)
            .await
            .map_err(conflict_as(CODE_TAKEN))?
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        if !self.storage.delete_offer(id).await? {
            return Err(ServiceError::NotFound(NOT_FOUND.to_string()));
        }
        info!(offer_id = %id, "offer deleted");
        Ok(())
    }
}
