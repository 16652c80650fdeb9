#![allow(clippy::needless_update)]

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseBackend,
    DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Schema,
    TransactionTrait,
};
use time::OffsetDateTime;
use tracing::debug;

use crate::db;
use crate::entities;
use crate::records::{
    Event, EventOffer, EventOfferPatch, EventPatch, NewEvent, NewEventOffer, NewOffer, Offer,
    OfferPatch, Page,
};
use crate::storage::{Storage, StorageResult};

#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
}

impl SeaOrmStorage {
    pub async fn connect(dsn: &str) -> StorageResult<Self> {
        let db = db::connect(dsn).await?;
        // Association rows reference both entity tables.
        if db.get_database_backend() == DatabaseBackend::Sqlite {
            db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
        }
        Ok(Self { db })
    }
}

#[async_trait::async_trait]
impl Storage for SeaOrmStorage {
    async fn sync(&self) -> StorageResult<()> {
        Schema::new(self.db.get_database_backend())
            .builder()
            .register(entities::Events)
            .register(entities::Offers)
            .register(entities::EventOffer)
            .sync(&self.db)
            .await?;
        Ok(())
    }

    async fn health(&self) -> StorageResult<()> {
        self.db.ping().await?;
        Ok(())
    }

    async fn insert_event(&self, event: NewEvent) -> StorageResult<Event> {
        let now = OffsetDateTime::now_utc();
        let id = event.id.clone();
        let active = entities::events::ActiveModel {
            id: ActiveValue::Set(event.id),
            code: ActiveValue::Set(event.code),
            name: ActiveValue::Set(event.name),
            description: ActiveValue::Set(event.description),
            lifetime_hours: ActiveValue::Set(event.lifetime_hours),
            disable_all_campaigns: ActiveValue::Set(event.disable_all_campaigns),
            queue_name: ActiveValue::Set(event.queue_name),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        entities::Events::insert(active)
            .exec_without_returning(&self.db)
            .await?;

        let row = entities::Events::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DbErr::RecordNotInserted)?;
        Ok(row.into())
    }

    async fn get_event(&self, id: &str) -> StorageResult<Option<Event>> {
        let row = entities::Events::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn find_event_by_code(&self, code: &str) -> StorageResult<Option<Event>> {
        use entities::events::Column;
        let row = entities::Events::find()
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list_events(&self, page: Page) -> StorageResult<Vec<Event>> {
        use entities::events::Column;
        let rows = entities::Events::find()
            .order_by_asc(Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_event(&self, id: &str, patch: EventPatch) -> StorageResult<Option<Event>> {
        let txn = self.db.begin().await?;
        let Some(model) = entities::Events::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        let mut active: entities::events::ActiveModel = model.into();
        if let Some(code) = patch.code {
            active.code = ActiveValue::Set(code);
        }
        if let Some(name) = patch.name {
            active.name = ActiveValue::Set(name);
        }
        if let Some(description) = patch.description {
            active.description = ActiveValue::Set(description);
        }
        if let Some(lifetime_hours) = patch.lifetime_hours {
            active.lifetime_hours = ActiveValue::Set(lifetime_hours);
        }
        if let Some(disable_all_campaigns) = patch.disable_all_campaigns {
            active.disable_all_campaigns = ActiveValue::Set(disable_all_campaigns);
        }
        if let Some(queue_name) = patch.queue_name {
            active.queue_name = ActiveValue::Set(queue_name);
        }
        active.updated_at = ActiveValue::Set(OffsetDateTime::now_utc());

        let model = active.update(&txn).await?;
        txn.commit().await?;
        Ok(Some(model.into()))
    }

    async fn delete_event(&self, id: &str) -> StorageResult<bool> {
        use entities::event_offer::Column as LinkColumn;

        let txn = self.db.begin().await?;
        let links = entities::EventOffer::delete_many()
            .filter(LinkColumn::EventId.eq(id))
            .exec(&txn)
            .await?;
        let result = entities::Events::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        if result.rows_affected > 0 {
            debug!(event_id = %id, removed_links = links.rows_affected, "event deleted");
        }
        Ok(result.rows_affected > 0)
    }

    async fn insert_offer(&self, offer: NewOffer) -> StorageResult<Offer> {
        let now = OffsetDateTime::now_utc();
        let id = offer.id.clone();
        let active = entities::offers::ActiveModel {
            id: ActiveValue::Set(offer.id),
            code: ActiveValue::Set(offer.code),
            name: ActiveValue::Set(offer.name),
            description: ActiveValue::Set(offer.description),
            priority: ActiveValue::Set(offer.priority),
            target_system: ActiveValue::Set(offer.target_system),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        entities::Offers::insert(active)
            .exec_without_returning(&self.db)
            .await?;

        let row = entities::Offers::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DbErr::RecordNotInserted)?;
        Ok(row.into())
    }

    async fn get_offer(&self, id: &str) -> StorageResult<Option<Offer>> {
        let row = entities::Offers::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn find_offer_by_code(&self, code: &str) -> StorageResult<Option<Offer>> {
        use entities::offers::Column;
        let row = entities::Offers::find()
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list_offers(&self, page: Page) -> StorageResult<Vec<Offer>> {
        use entities::offers::Column;
        let rows = entities::Offers::find()
            .order_by_asc(Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_offer(&self, id: &str, patch: OfferPatch) -> StorageResult<Option<Offer>> {
        let txn = self.db.begin().await?;
        let Some(model) = entities::Offers::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        let mut active: entities::offers::ActiveModel = model.into();
        if let Some(code) = patch.code {
            active.code = ActiveValue::Set(code);
        }
        if let Some(name) = patch.name {
            active.name = ActiveValue::Set(name);
        }
        if let Some(description) = patch.description {
            active.description = ActiveValue::Set(description);
        }
        if let Some(priority) = patch.priority {
            active.priority = ActiveValue::Set(priority);
        }
        if let Some(target_system) = patch.target_system {
            active.target_system = ActiveValue::Set(target_system);
        }
        active.updated_at = ActiveValue::Set(OffsetDateTime::now_utc());

        let model = active.update(&txn).await?;
        txn.commit().await?;
        Ok(Some(model.into()))
    }

    async fn delete_offer(&self, id: &str) -> StorageResult<bool> {
        use entities::event_offer::Column as LinkColumn;

        let txn = self.db.begin().await?;
        let links = entities::EventOffer::delete_many()
            .filter(LinkColumn::OfferId.eq(id))
            .exec(&txn)
            .await?;
        let result = entities::Offers::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        if result.rows_affected > 0 {
            debug!(offer_id = %id, removed_links = links.rows_affected, "offer deleted");
        }
        Ok(result.rows_affected > 0)
    }

    async fn insert_event_offer(&self, link: NewEventOffer) -> StorageResult<EventOffer> {
        let key = (link.event_id.clone(), link.offer_id.clone());
        let active = entities::event_offer::ActiveModel {
            event_id: ActiveValue::Set(link.event_id),
            offer_id: ActiveValue::Set(link.offer_id),
            delay_minutes: ActiveValue::Set(link.delay_minutes),
            action_type: ActiveValue::Set(link.action_type),
            ..Default::default()
        };
        entities::EventOffer::insert(active)
            .exec_without_returning(&self.db)
            .await?;

        let row = entities::EventOffer::find_by_id(key)
            .one(&self.db)
            .await?
            .ok_or(DbErr::RecordNotInserted)?;
        Ok(row.into())
    }

    async fn get_event_offer(
        &self,
        event_id: &str,
        offer_id: &str,
    ) -> StorageResult<Option<EventOffer>> {
        let row = entities::EventOffer::find_by_id((event_id.to_string(), offer_id.to_string()))
            .one(&self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn update_event_offer(
        &self,
        event_id: &str,
        offer_id: &str,
        patch: EventOfferPatch,
    ) -> StorageResult<Option<EventOffer>> {
        let txn = self.db.begin().await?;
        let Some(model) =
            entities::EventOffer::find_by_id((event_id.to_string(), offer_id.to_string()))
                .one(&txn)
                .await?
        else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(model.into()));
        }

        let mut active: entities::event_offer::ActiveModel = model.into();
        if let Some(delay_minutes) = patch.delay_minutes {
            active.delay_minutes = ActiveValue::Set(delay_minutes);
        }
        if let Some(action_type) = patch.action_type {
            active.action_type = ActiveValue::Set(action_type);
        }

        let model = active.update(&txn).await?;
        txn.commit().await?;
        Ok(Some(model.into()))
    }

    async fn delete_event_offer(&self, event_id: &str, offer_id: &str) -> StorageResult<bool> {
        use entities::event_offer::Column;
        let result = entities::EventOffer::delete_many()
            .filter(Column::EventId.eq(event_id))
            .filter(Column::OfferId.eq(offer_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_event_offers_for_event(&self, event_id: &str) -> StorageResult<Vec<EventOffer>> {
        use entities::event_offer::Column;
        let rows = entities::EventOffer::find()
            .filter(Column::EventId.eq(event_id))
            .order_by_asc(Column::OfferId)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_event_offers_for_offer(&self, offer_id: &str) -> StorageResult<Vec<EventOffer>> {
        use entities::event_offer::Column;
        let rows = entities::EventOffer::find()
            .filter(Column::OfferId.eq(offer_id))
            .order_by_asc(Column::EventId)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
