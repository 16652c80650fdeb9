use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};

use crate::records::{
    Event, EventOffer, EventOfferPatch, EventPatch, NewEvent, NewEventOffer, NewOffer, Offer,
    OfferPatch, Page,
};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Unique or primary-key constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Foreign-key constraint rejected the write.
    #[error("missing reference: {0}")]
    MissingReference(String),
    #[error("db error: {0}")]
    Db(DbErr),
}

impl From<DbErr> for StorageError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => StorageError::Conflict(detail),
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                StorageError::MissingReference(detail)
            }
            _ => StorageError::Db(err),
        }
    }
}

/// Entity + association store.
///
/// Every method is one implicit transaction; nothing spans calls.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Entity-first schema sync. Run once at bootstrap.
    async fn sync(&self) -> StorageResult<()>;
    async fn health(&self) -> StorageResult<()>;

    // Events
    async fn insert_event(&self, event: NewEvent) -> StorageResult<Event>;
    async fn get_event(&self, id: &str) -> StorageResult<Option<Event>>;
    async fn find_event_by_code(&self, code: &str) -> StorageResult<Option<Event>>;
    async fn list_events(&self, page: Page) -> StorageResult<Vec<Event>>;
    async fn update_event(&self, id: &str, patch: EventPatch) -> StorageResult<Option<Event>>;
    /// Removes the event and every association that references it.
    async fn delete_event(&self, id: &str) -> StorageResult<bool>;

    // Offers
    async fn insert_offer(&self, offer: NewOffer) -> StorageResult<Offer>;
    async fn get_offer(&self, id: &str) -> StorageResult<Option<Offer>>;
    async fn find_offer_by_code(&self, code: &str) -> StorageResult<Option<Offer>>;
    async fn list_offers(&self, page: Page) -> StorageResult<Vec<Offer>>;
    async fn update_offer(&self, id: &str, patch: OfferPatch) -> StorageResult<Option<Offer>>;
    /// Removes the offer and every association that references it.
    async fn delete_offer(&self, id: &str) -> StorageResult<bool>;

    // Event <-> offer associations
    async fn insert_event_offer(&self, link: NewEventOffer) -> StorageResult<EventOffer>;
    async fn get_event_offer(
        &self,
        event_id: &str,
        offer_id: &str,
    ) -> StorageResult<Option<EventOffer>>;
    async fn update_event_offer(
        &self,
        event_id: &str,
        offer_id: &str,
        patch: EventOfferPatch,
    ) -> StorageResult<Option<EventOffer>>;
    async fn delete_event_offer(&self, event_id: &str, offer_id: &str) -> StorageResult<bool>;
    async fn list_event_offers_for_event(&self, event_id: &str) -> StorageResult<Vec<EventOffer>>;
    async fn list_event_offers_for_offer(&self, offer_id: &str) -> StorageResult<Vec<EventOffer>>;
}
