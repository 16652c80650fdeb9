use std::sync::Arc;

use eventoffer_storage::{Event, EventPatch, NewEvent, Page, Storage};
use tracing::info;

use crate::error::{ServiceError, ServiceResult, conflict_as, insert_conflict};

const NOT_FOUND: &str = "Event not found";
const CODE_TAKEN: &str = "Event with this code already exists";
const ID_TAKEN: &str = "Event with this id already exists";

/// Event CRUD with code uniqueness enforced ahead of the store.
#[derive(Clone)]
pub struct EventService {
    storage: Arc<dyn Storage>,
}

impl EventService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn create(&self, event: NewEvent) -> ServiceResult<Event> {
        if self.storage.find_event_by_code(&event.code).await?.is_some() {
            return Err(ServiceError::Conflict(CODE_TAKEN.to_string()));
        }
        if self.storage.get_event(&event.id).await?.is_some() {
            return Err(ServiceError::Conflict(ID_TAKEN.to_string()));
        }

        let created = self
            .storage
            .insert_event(event)
            .await
            .map_err(insert_conflict(CODE_TAKEN, ID_TAKEN))?;
        info!(event_id = %created.id, code = %created.code, "event created");
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Event> {
        self.storage
            .get_event(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn list(&self, offset: Option<u64>, limit: Option<u64>) -> ServiceResult<Vec<Event>> {
        Ok(self.storage.list_events(Page::new(offset, limit)).await?)
    }

    /// Applies the fields present in `patch`. A `code` already held by another
    /// event is a conflict.
    pub async fn update(&self, id: &str, patch: EventPatch) -> ServiceResult<Event> {
        let current = self.get(id).await?;
        if let Some(code) = patch.code.as_deref()
            && code != current.code
            && let Some(holder) = self.storage.find_event_by_code(code).await?
            && holder.id != id
        {
            return Err(ServiceError::Conflict(CODE_TAKEN.to_string()));
        }

        self.storage
            .update_event(id, patch)
            .await
            .map_err(conflict_as(CODE_TAKEN))?
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))
    }

    /// Removes the event together with its associations.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        if !self.storage.delete_event(id).await? {
            return Err(ServiceError::NotFound(NOT_FOUND.to_string()));
        }
        info!(event_id = %id, "event deleted");
        Ok(())
    }
}
