pub mod event_offer;
pub mod events;
pub mod offers;

pub use event_offer::Entity as EventOffer;
pub use events::Entity as Events;
pub use offers::Entity as Offers;
