//! Writes that lose a race against a concurrent change after the service
//! checks have passed.

use std::sync::Arc;

use eventoffer_core::{AssociationService, EventService, OfferService, ServiceError};
use eventoffer_storage::{
    Event, EventOffer, EventOfferPatch, EventPatch, NewEvent, NewEventOffer, NewOffer, Offer,
    OfferPatch, Page, SeaOrmStorage, Storage, StorageResult,
};

/// Delegates to a live store, but hides existing rows from the uniqueness
/// lookups and can drop the offer right before a link is written.
struct Racing {
    inner: SeaOrmStorage,
    hide_lookups: bool,
    drop_offer_before_link: bool,
}

async fn racing(hide_lookups: bool, drop_offer_before_link: bool) -> Arc<dyn Storage> {
    let inner = SeaOrmStorage::connect("sqlite::memory:").await.unwrap();
    inner.sync().await.unwrap();
    Arc::new(Racing {
        inner,
        hide_lookups,
        drop_offer_before_link,
    })
}

#[async_trait::async_trait]
impl Storage for Racing {
    async fn sync(&self) -> StorageResult<()> {
        self.inner.sync().await
    }
    async fn health(&self) -> StorageResult<()> {
        self.inner.health().await
    }

    async fn insert_event(&self, event: NewEvent) -> StorageResult<Event> {
        self.inner.insert_event(event).await
    }
    async fn get_event(&self, id: &str) -> StorageResult<Option<Event>> {
        if self.hide_lookups {
            return Ok(None);
        }
        self.inner.get_event(id).await
    }
    async fn find_event_by_code(&self, code: &str) -> StorageResult<Option<Event>> {
        if self.hide_lookups {
            return Ok(None);
        }
        self.inner.find_event_by_code(code).await
    }
    async fn list_events(&self, page: Page) -> StorageResult<Vec<Event>> {
        self.inner.list_events(page).await
    }
    async fn update_event(&self, id: &str, patch: EventPatch) -> StorageResult<Option<Event>> {
        self.inner.update_event(id, patch).await
    }
    async fn delete_event(&self, id: &str) -> StorageResult<bool> {
        self.inner.delete_event(id).await
    }

    async fn insert_offer(&self, offer: NewOffer) -> StorageResult<Offer> {
        self.inner.insert_offer(offer).await
    }
    async fn get_offer(&self, id: &str) -> StorageResult<Option<Offer>> {
        if self.hide_lookups {
            return Ok(None);
        }
        self.inner.get_offer(id).await
    }
    async fn find_offer_by_code(&self, code: &str) -> StorageResult<Option<Offer>> {
        if self.hide_lookups {
            return Ok(None);
        }
        self.inner.find_offer_by_code(code).await
    }
    async fn list_offers(&self, page: Page) -> StorageResult<Vec<Offer>> {
        self.inner.list_offers(page).await
    }
    async fn update_offer(&self, id: &str, patch: OfferPatch) -> StorageResult<Option<Offer>> {
        self.inner.update_offer(id, patch).await
    }
    async fn delete_offer(&self, id: &str) -> StorageResult<bool> {
        self.inner.delete_offer(id).await
    }

    async fn insert_event_offer(&self, link: NewEventOffer) -> StorageResult<EventOffer> {
        if self.drop_offer_before_link {
            self.inner.delete_offer(&link.offer_id).await?;
        }
        self.inner.insert_event_offer(link).await
    }
    async fn get_event_offer(
        &self,
        event_id: &str,
        offer_id: &str,
    ) -> StorageResult<Option<EventOffer>> {
        self.inner.get_event_offer(event_id, offer_id).await
    }
    async fn update_event_offer(
        &self,
        event_id: &str,
        offer_id: &str,
        patch: EventOfferPatch,
    ) -> StorageResult<Option<EventOffer>> {
        self.inner.update_event_offer(event_id, offer_id, patch).await
    }
    async fn delete_event_offer(&self, event_id: &str, offer_id: &str) -> StorageResult<bool> {
        self.inner.delete_event_offer(event_id, offer_id).await
    }
    async fn list_event_offers_for_event(&self, event_id: &str) -> StorageResult<Vec<EventOffer>> {
        self.inner.list_event_offers_for_event(event_id).await
    }
    async fn list_event_offers_for_offer(&self, offer_id: &str) -> StorageResult<Vec<EventOffer>> {
        self.inner.list_event_offers_for_offer(offer_id).await
    }
}

#[tokio::test]
async fn offer_deleted_before_link_is_reported_as_offer() {
    let storage = racing(false, true).await;
    let events = EventService::new(storage.clone());
    let offers = OfferService::new(storage.clone());
    let associations = AssociationService::new(storage);
    events
        .create(NewEvent::new("e1", "EVENT001", "Launch"))
        .await
        .unwrap();
    offers
        .create(NewOffer::new("o1", "OFFER001", "10% off"))
        .await
        .unwrap();

    let err = associations
        .create("e1", "o1", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)), "{err:?}");
    assert_eq!(err.to_string(), "Offer not found");
}

#[tokio::test]
async fn racing_duplicate_id_is_reported_as_id() {
    let storage = racing(true, false).await;
    let events = EventService::new(storage.clone());
    let offers = OfferService::new(storage);
    events
        .create(NewEvent::new("e1", "EVENT001", "Launch"))
        .await
        .unwrap();
    offers
        .create(NewOffer::new("o1", "OFFER001", "10% off"))
        .await
        .unwrap();

    let err = events
        .create(NewEvent::new("e1", "EVENT002", "Other"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Event with this id already exists");
    let err = events
        .create(NewEvent::new("e2", "EVENT001", "Other"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Event with this code already exists");

    let err = offers
        .create(NewOffer::new("o1", "OFFER002", "Other"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Offer with this id already exists");
}
