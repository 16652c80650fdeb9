use eventoffer_storage::{
    EventOfferPatch, EventPatch, NewEvent, NewEventOffer, NewOffer, OfferPatch, Page,
    SeaOrmStorage, Storage, StorageError,
};

async fn storage() -> SeaOrmStorage {
    let storage = SeaOrmStorage::connect("sqlite::memory:").await.unwrap();
    storage.sync().await.unwrap();
    storage
}

#[tokio::test]
async fn insert_then_get_event_returns_input_fields() {
    let storage = storage().await;
    let mut input = NewEvent::new("event1", "EVENT001", "Test Event");
    input.description = Some("A test event".to_string());
    input.lifetime_hours = 24;
    input.queue_name = "test_queue".to_string();

    let created = storage.insert_event(input).await.unwrap();
    assert_eq!(created.created_at, created.updated_at);

    let fetched = storage.get_event("event1").await.unwrap().unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.code, "EVENT001");
    assert_eq!(fetched.description.as_deref(), Some("A test event"));
    assert_eq!(fetched.lifetime_hours, 24);
    assert!(!fetched.disable_all_campaigns);
    assert_eq!(fetched.queue_name, "test_queue");
}

#[tokio::test]
async fn duplicate_code_maps_to_conflict() {
    let storage = storage().await;
    storage
        .insert_offer(NewOffer::new("o1", "OFFER001", "10% off"))
        .await
        .unwrap();

    let err = storage
        .insert_offer(NewOffer::new("o2", "OFFER001", "Other"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)), "{err:?}");

    let err = storage
        .insert_offer(NewOffer::new("o1", "OFFER002", "Same id"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)), "{err:?}");

    let stored = storage.get_offer("o1").await.unwrap().unwrap();
    assert_eq!(stored.name, "10% off");
}

#[tokio::test]
async fn list_is_ordered_and_paged() {
    let storage = storage().await;
    for (id, code) in [("c", "C"), ("a", "A"), ("b", "B")] {
        storage
            .insert_event(NewEvent::new(id, code, id))
            .await
            .unwrap();
    }

    let all = storage.list_events(Page::default()).await.unwrap();
    let ids: Vec<_> = all.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);

    let window = storage
        .list_events(Page::new(Some(1), Some(1)))
        .await
        .unwrap();
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].id, "b");
}

#[tokio::test]
async fn offset_past_signed_range_yields_empty_page() {
    let storage = storage().await;
    storage
        .insert_event(NewEvent::new("e1", "EVENT001", "Launch"))
        .await
        .unwrap();
    storage
        .insert_offer(NewOffer::new("o1", "OFFER001", "10% off"))
        .await
        .unwrap();

    for offset in [u64::MAX, i64::MAX as u64 + 1] {
        let page = Page::new(Some(offset), Some(10));
        assert!(storage.list_events(page).await.unwrap().is_empty());
        assert!(storage.list_offers(page).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn partial_update_touches_only_named_fields() {
    let storage = storage().await;
    let mut input = NewOffer::new("o1", "OFFER001", "10% off");
    input.description = Some("weekend".to_string());
    let created = storage.insert_offer(input).await.unwrap();

    let updated = storage
        .update_offer(
            "o1",
            OfferPatch {
                priority: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.priority, 5);
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.target_system, "default_system");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    let cleared = storage
        .update_offer(
            "o1",
            OfferPatch {
                description: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.priority, 5);
}

#[tokio::test]
async fn update_missing_returns_none() {
    let storage = storage().await;
    let updated = storage
        .update_event("nope", EventPatch::default())
        .await
        .unwrap();
    assert!(updated.is_none());
}

#[tokio::test]
async fn association_round_trip() {
    let storage = storage().await;
    storage
        .insert_event(NewEvent::new("e1", "EVENT001", "Launch"))
        .await
        .unwrap();
    storage
        .insert_offer(NewOffer::new("o1", "OFFER001", "10% off"))
        .await
        .unwrap();

    let created = storage
        .insert_event_offer(NewEventOffer::new("e1", "o1"))
        .await
        .unwrap();
    assert_eq!(created.delay_minutes, 0);
    assert_eq!(created.action_type, "enable");

    let updated = storage
        .update_event_offer(
            "e1",
            "o1",
            EventOfferPatch {
                delay_minutes: Some(30),
                action_type: Some("disable".to_string()),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.delay_minutes, 30);
    assert_eq!(updated.action_type, "disable");

    let unchanged = storage
        .update_event_offer("e1", "o1", EventOfferPatch::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged, updated);

    assert!(storage.delete_event_offer("e1", "o1").await.unwrap());
    assert!(!storage.delete_event_offer("e1", "o1").await.unwrap());
    assert!(storage.get_event_offer("e1", "o1").await.unwrap().is_none());
}

#[tokio::test]
async fn association_keys_do_not_match_partially() {
    let storage = storage().await;
    for id in ["e1", "e2"] {
        storage
            .insert_event(NewEvent::new(id, id.to_uppercase(), id))
            .await
            .unwrap();
    }
    for id in ["o1", "o2"] {
        storage
            .insert_offer(NewOffer::new(id, id.to_uppercase(), id))
            .await
            .unwrap();
    }
    storage
        .insert_event_offer(NewEventOffer::new("e1", "o1"))
        .await
        .unwrap();
    storage
        .insert_event_offer(NewEventOffer::new("e1", "o2"))
        .await
        .unwrap();
    storage
        .insert_event_offer(NewEventOffer::new("e2", "o1"))
        .await
        .unwrap();

    assert!(storage.get_event_offer("e2", "o2").await.unwrap().is_none());
    assert!(storage.delete_event_offer("e1", "o2").await.unwrap());
    assert!(storage.get_event_offer("e1", "o1").await.unwrap().is_some());
    assert!(storage.get_event_offer("e2", "o1").await.unwrap().is_some());

    let for_offer = storage.list_event_offers_for_offer("o1").await.unwrap();
    let events: Vec<_> = for_offer.iter().map(|l| l.event_id.as_str()).collect();
    assert_eq!(events, ["e1", "e2"]);
}

#[tokio::test]
async fn duplicate_association_maps_to_conflict() {
    let storage = storage().await;
    storage
        .insert_event(NewEvent::new("e1", "EVENT001", "Launch"))
        .await
        .unwrap();
    storage
        .insert_offer(NewOffer::new("o1", "OFFER001", "10% off"))
        .await
        .unwrap();
    storage
        .insert_event_offer(NewEventOffer::new("e1", "o1"))
        .await
        .unwrap();

    let err = storage
        .insert_event_offer(NewEventOffer::new("e1", "o1"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn association_to_missing_entity_is_rejected_by_foreign_key() {
    let storage = storage().await;
    storage
        .insert_event(NewEvent::new("e1", "EVENT001", "Launch"))
        .await
        .unwrap();

    let err = storage
        .insert_event_offer(NewEventOffer::new("e1", "ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::MissingReference(_)), "{err:?}");
    assert!(
        storage
            .list_event_offers_for_event("e1")
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn deleting_an_entity_removes_its_associations() {
    let storage = storage().await;
    storage
        .insert_event(NewEvent::new("e1", "EVENT001", "Launch"))
        .await
        .unwrap();
    storage
        .insert_offer(NewOffer::new("o1", "OFFER001", "10% off"))
        .await
        .unwrap();
    storage
        .insert_offer(NewOffer::new("o2", "OFFER002", "Free shipping"))
        .await
        .unwrap();
    storage
        .insert_event_offer(NewEventOffer::new("e1", "o1"))
        .await
        .unwrap();
    storage
        .insert_event_offer(NewEventOffer::new("e1", "o2"))
        .await
        .unwrap();

    assert!(storage.delete_offer("o1").await.unwrap());
    let remaining = storage.list_event_offers_for_event("e1").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].offer_id, "o2");

    assert!(storage.delete_event("e1").await.unwrap());
    assert!(storage.get_event("e1").await.unwrap().is_none());
    assert!(
        storage
            .list_event_offers_for_offer("o2")
            .await
            .unwrap()
            .is_empty()
    );
    assert!(!storage.delete_event("e1").await.unwrap());
}

#[tokio::test]
async fn health_answers_on_live_connection() {
    let storage = storage().await;
    storage.health().await.unwrap();
}
