use sea_orm::entity::prelude::*;

/// Labeled edge between an event and an offer.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "event_offer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub offer_id: String,
    pub delay_minutes: i32,
    /// `enable` or `disable`; stored as given.
    pub action_type: String,
    #[sea_orm(belongs_to, from = "event_id", to = "id", on_delete = "Cascade")]
    pub event: HasOne<super::events::Entity>,
    #[sea_orm(belongs_to, from = "offer_id", to = "id", on_delete = "Cascade")]
    pub offer: HasOne<super::offers::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
