use std::sync::Arc;

use eventoffer_storage::{EventOffer, EventOfferPatch, NewEventOffer, Storage, StorageError};
use tracing::info;

use crate::error::{ServiceError, ServiceResult};

const NOT_FOUND: &str = "Event-Offer association not found";
const EVENT_NOT_FOUND: &str = "Event not found";
const OFFER_NOT_FOUND: &str = "Offer not found";
const ALREADY_LINKED: &str = "Event-Offer association already exists";

/// Labeled edges between events and offers.
#[derive(Clone)]
pub struct AssociationService {
    storage: Arc<dyn Storage>,
}

impl AssociationService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Links an existing event to an existing offer. The event is checked
    /// first, so a request naming two missing entities reports the event.
    pub async fn create(
        &self,
        event_id: &str,
        offer_id: &str,
        delay_minutes: Option<i32>,
        action_type: Option<String>,
    ) -> ServiceResult<EventOffer> {
        self.require_event(event_id).await?;
        self.require_offer(offer_id).await?;
        if self
            .storage
            .get_event_offer(event_id, offer_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(ALREADY_LINKED.to_string()));
        }

        let mut link = NewEventOffer::new(event_id, offer_id);
        if let Some(delay_minutes) = delay_minutes {
            link.delay_minutes = delay_minutes;
        }
        if let Some(action_type) = action_type {
            link.action_type = action_type;
        }

        let created = match self.storage.insert_event_offer(link).await {
            Ok(created) => created,
            Err(StorageError::Conflict(_)) => {
                return Err(ServiceError::Conflict(ALREADY_LINKED.to_string()));
            }
            // A referenced row vanished between the checks and the insert.
            Err(StorageError::MissingReference(detail)) => {
                self.require_event(event_id).await?;
                self.require_offer(offer_id).await?;
                return Err(ServiceError::NotFound(detail));
            }
            Err(other) => return Err(other.into()),
        };
        info!(
            event_id = %created.event_id,
            offer_id = %created.offer_id,
            delay_minutes = created.delay_minutes,
            action_type = %created.action_type,
            "event offer linked"
        );
        Ok(created)
    }

    pub async fn get(&self, event_id: &str, offer_id: &str) -> ServiceResult<EventOffer> {
        self.storage
            .get_event_offer(event_id, offer_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn update(
        &self,
        event_id: &str,
        offer_id: &str,
        patch: EventOfferPatch,
    ) -> ServiceResult<EventOffer> {
        self.storage
            .update_event_offer(event_id, offer_id, patch)
            .await?
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn delete(&self, event_id: &str, offer_id: &str) -> ServiceResult<()> {
        if !self.storage.delete_event_offer(event_id, offer_id).await? {
            return Err(ServiceError::NotFound(NOT_FOUND.to_string()));
        }
        info!(event_id = %event_id, offer_id = %offer_id, "event offer unlinked");
        Ok(())
    }

    pub async fn list_for_event(&self, event_id: &str) -> ServiceResult<Vec<EventOffer>> {
        self.require_event(event_id).await?;
        Ok(self.storage.list_event_offers_for_event(event_id).await?)
    }

    pub async fn list_for_offer(&self, offer_id: &str) -> ServiceResult<Vec<EventOffer>> {
        self.require_offer(offer_id).await?;
        Ok(self.storage.list_event_offers_for_offer(offer_id).await?)
    }

    async fn require_event(&self, event_id: &str) -> ServiceResult<()> {
        match self.storage.get_event(event_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(EVENT_NOT_FOUND.to_string())),
        }
    }

    async fn require_offer(&self, offer_id: &str) -> ServiceResult<()> {
        match self.storage.get_offer(offer_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(OFFER_NOT_FOUND.to_string())),
        }
    }
}
