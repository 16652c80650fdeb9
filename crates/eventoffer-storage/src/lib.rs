pub mod db;
pub mod entities;
pub mod records;
pub mod seaorm;
pub mod storage;

pub use records::{
    DEFAULT_ACTION_TYPE, DEFAULT_PAGE_LIMIT, Event, EventOffer, EventOfferPatch, EventPatch,
    MAX_PAGE_LIMIT, MAX_PAGE_OFFSET, NewEvent, NewEventOffer, NewOffer, Offer, OfferPatch, Page,
};
pub use seaorm::SeaOrmStorage;
pub use storage::{Storage, StorageError, StorageResult};
