pub mod associations;
pub mod bootstrap;
pub mod error;
pub mod events;
pub mod offers;
pub mod state;

pub use associations::AssociationService;
pub use error::{ServiceError, ServiceResult};
pub use events::EventService;
pub use offers::OfferService;
pub use state::AppState;
