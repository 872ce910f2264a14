//! Engine behavior through the public API, with storage doubles.

mod common;

use std::sync::{Arc, Mutex};

use common::{error_messages, item, record_events, FailingStorage, RecordingStorage};
use panierr::{
    CartError, CartEvent, CartSnapshot, Discount, EventKind, MemoryStorage, Money, Panierr,
    PanierrConfig, StorageProvider,
};

const KEY: &str = "panierrCartItems";

fn catalog_config() -> PanierrConfig {
    PanierrConfig::default().with_discounts(vec![
        Discount::percentage("SAVE10", 10.0),
        Discount::fixed("FIVEOFF", 5.0),
        Discount::fixed("HUGE", 1000.0),
    ])
}

// =============================================================================
// Items
// =============================================================================

#[test]
fn test_ids_stay_unique_and_quantities_sum() {
    let mut cart = Panierr::new(PanierrConfig::default(), MemoryStorage::new());
    for quantity in [1, 4, 2] {
        cart.add_item(item("a", 3, quantity));
    }
    cart.add_item(item("b", 1, 1));

    let items = cart.get_cart_items();
    assert_eq!(items.len(), 2);
    assert_eq!(cart.get_item_quantity("a"), Some(7));
    assert_eq!(cart.calculate_totals().total_items, 8);
}

#[test]
fn test_same_id_added_twice() {
    let mut cart = Panierr::new(PanierrConfig::default(), MemoryStorage::new());
    cart.add_item(item("a", 10, 1));
    cart.add_item(item("a", 10, 2));

    assert_eq!(cart.get_item_quantity("a"), Some(3));
    assert_eq!(cart.calculate_totals().total_price, Money::from_major(30));
}

#[test]
fn test_update_to_non_positive_equals_remove() {
    let mut updated = Panierr::new(PanierrConfig::default(), MemoryStorage::new());
    let mut removed = Panierr::new(PanierrConfig::default(), MemoryStorage::new());
    for cart in [&mut updated, &mut removed] {
        cart.add_item(item("a", 2, 2));
        cart.add_item(item("b", 3, 1));
    }
    let updated_events = record_events(&mut updated);
    let removed_events = record_events(&mut removed);

    updated.update_item_quantity("a", -3);
    removed.remove_item("a");

    assert_eq!(updated.get_cart_items(), removed.get_cart_items());
    assert_eq!(
        *updated_events.lock().unwrap(),
        *removed_events.lock().unwrap()
    );
    assert!(matches!(
        &updated_events.lock().unwrap()[0],
        CartEvent::ItemRemoved { item_id } if item_id == "a"
    ));
}

#[test]
fn test_remove_missing_reports_and_keeps_items() {
    let mut cart = Panierr::new(PanierrConfig::default(), MemoryStorage::new());
    cart.add_item(item("a", 1, 1));
    let before = cart.get_cart_items();
    let events = record_events(&mut cart);

    cart.remove_item("missing");

    assert_eq!(cart.get_cart_items(), before);
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    match &events[0] {
        CartEvent::Error { message, details } => {
            assert_eq!(message, "Item not found in cart");
            assert_eq!(
                details.as_ref().and_then(|d| d.get("itemId")),
                Some(&serde_json::json!("missing"))
            );
        }
        other => panic!("expected error event, got {:?}", other),
    }
}

#[test]
fn test_update_missing_reports_even_for_zero() {
    let mut cart = Panierr::new(PanierrConfig::default(), MemoryStorage::new());
    let events = record_events(&mut cart);

    cart.update_item_quantity("ghost", 0);

    assert_eq!(error_messages(&events), vec!["Item not found in cart"]);
}

#[test]
fn test_huge_quantities_do_not_overflow_totals() {
    let mut cart = Panierr::new(catalog_config(), MemoryStorage::new());
    cart.add_item(item("a", 100_000_000, 1));
    cart.update_item_quantity("a", 1_000_000_000);
    cart.add_item(item("b", 100_000_000, u32::MAX));
    cart.add_item(item("b", 1, u32::MAX));
    cart.apply_discount("SAVE10");

    let totals = cart.calculate_totals();
    assert_eq!(totals.total_price, Money::from_cents(i64::MAX));
    assert_eq!(cart.get_item_quantity("b"), Some(u32::MAX));
    assert!(!totals.final_price.is_negative());
    assert!(totals.final_price < totals.total_price);
    assert!(!cart.format_price(totals.final_price).starts_with('-'));
}

#[test]
fn test_returned_items_are_a_copy() {
    let mut cart = Panierr::new(PanierrConfig::default(), MemoryStorage::new());
    cart.add_item(item("a", 1, 1));

    let mut items = cart.get_cart_items();
    items[0].quantity = 99;
    items.clear();

    assert_eq!(cart.get_item_quantity("a"), Some(1));
}

#[test]
fn test_clear_twice_emits_twice() {
    let mut cart = Panierr::new(catalog_config(), MemoryStorage::new());
    cart.add_item(item("a", 1, 1));
    cart.apply_discount("SAVE10");
    let events = record_events(&mut cart);

    cart.clear_cart();
    cart.clear_cart();

    assert!(cart.is_empty());
    assert!(cart.applied_discounts().is_empty());
    let cleared = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, CartEvent::CartCleared))
        .count();
    assert_eq!(cleared, 2);
}

// =============================================================================
// Discounts
// =============================================================================

#[test]
fn test_percentage_discount() {
    let mut cart = Panierr::new(catalog_config(), MemoryStorage::new());
    cart.add_item(item("a", 10, 10));

    cart.apply_discount("SAVE10");

    let totals = cart.calculate_totals();
    assert_eq!(totals.discount_amount, Money::from_major(10));
    assert_eq!(totals.final_price, Money::from_major(90));
    assert_eq!(cart.discount_amount(), Money::from_major(10));
}

#[test]
fn test_unknown_code_reports_and_keeps_state() {
    let mut cart = Panierr::new(catalog_config(), MemoryStorage::new());
    cart.add_item(item("a", 10, 10));
    let events = record_events(&mut cart);

    cart.apply_discount("BOGUS");

    assert_eq!(error_messages(&events), vec!["Invalid discount code"]);
    assert!(cart.applied_discounts().is_empty());
    assert_eq!(cart.calculate_totals().final_price, Money::from_major(100));
}

#[test]
fn test_unknown_code_keeps_active_discount() {
    let mut cart = Panierr::new(catalog_config(), MemoryStorage::new());
    cart.add_item(item("a", 10, 10));
    cart.apply_discount("FIVEOFF");

    cart.apply_discount("save10");

    assert_eq!(cart.applied_discounts().len(), 1);
    assert_eq!(cart.applied_discounts()[0].code, "FIVEOFF");
}

#[test]
fn test_applying_replaces_previous_discount() {
    let mut cart = Panierr::new(catalog_config(), MemoryStorage::new());
    cart.add_item(item("a", 10, 10));

    cart.apply_discount("SAVE10");
    cart.apply_discount("FIVEOFF");

    assert_eq!(cart.applied_discounts().len(), 1);
    assert_eq!(cart.calculate_totals().final_price, Money::from_major(95));

    cart.remove_discount();
    assert_eq!(cart.calculate_totals().final_price, Money::from_major(100));
}

#[test]
fn test_final_price_never_negative() {
    let mut cart = Panierr::new(catalog_config(), MemoryStorage::new());
    cart.add_item(item("a", 3, 1));

    cart.apply_discount("HUGE");

    let totals = cart.calculate_totals();
    assert_eq!(totals.final_price, Money::zero());
    assert!(!totals.discount_amount.is_negative());

    cart.clear_cart();
    cart.apply_discount("HUGE");
    assert_eq!(cart.calculate_totals().final_price, Money::zero());
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_round_trip_into_fresh_engine() {
    let storage = MemoryStorage::new();
    let mut first = Panierr::new(catalog_config(), storage.clone());
    first.add_item(item("a", 10, 2).with_extra("color", "red"));
    first.add_item(item("b", 4, 1).with_image("https://cdn.test/b.png"));
    first.apply_discount("SAVE10");

    let second = Panierr::new(catalog_config(), storage);

    assert_eq!(second.get_cart_items(), first.get_cart_items());
    assert_eq!(second.applied_discounts(), first.applied_discounts());
    assert_eq!(second.calculate_totals(), first.calculate_totals());
}

#[test]
fn test_persisted_before_event() {
    let storage = MemoryStorage::new();
    let mut cart = Panierr::new(PanierrConfig::default(), storage.clone());
    let stored_at_event = Arc::new(Mutex::new(None));

    let sink = Arc::clone(&stored_at_event);
    let probe = storage.clone();
    cart.on(EventKind::ItemAdded, move |_, _| {
        *sink.lock().unwrap() = probe.get(KEY).unwrap();
    });

    cart.add_item(item("a", 1, 1));

    let blob = stored_at_event
        .lock()
        .unwrap()
        .clone()
        .expect("blob written before itemAdded");
    let snapshot = CartSnapshot::from_json(&blob).unwrap();
    assert_eq!(snapshot.cart_items.len(), 1);
}

#[test]
fn test_save_failure_reported_before_change_event() {
    let mut cart = Panierr::new(PanierrConfig::default(), FailingStorage);
    let events = record_events(&mut cart);
    let callback_errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&callback_errors);
    cart.set_error_callback(move |e| sink.lock().unwrap().push(e.clone()));

    cart.add_item(item("a", 1, 1));

    assert_eq!(cart.get_item_quantity("a"), Some(1));
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], CartEvent::Error { message, .. } if message == "Failed to save cart"));
    assert!(matches!(&events[1], CartEvent::ItemAdded { .. }));

    let callback_errors = callback_errors.lock().unwrap();
    assert!(matches!(&callback_errors[..], [CartError::SaveFailed { .. }]));
}

#[test]
fn test_auto_save_off_writes_nothing_until_save() {
    let storage = RecordingStorage::new();
    let config = PanierrConfig::default().with_auto_save(false);
    let mut cart = Panierr::new(config, storage.clone());

    cart.add_item(item("a", 1, 1));
    cart.update_item_quantity("a", 5);
    cart.clear_cart();
    cart.add_item(item("b", 2, 1));
    assert!(storage.writes().is_empty());

    cart.save();
    let writes = storage.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, KEY);
    let snapshot = CartSnapshot::from_json(&writes[0].1).unwrap();
    assert_eq!(snapshot.cart_items[0].id, "b");
}

#[test]
fn test_every_change_writes_once() {
    let storage = RecordingStorage::new();
    let mut cart = Panierr::new(catalog_config(), storage.clone());

    cart.add_item(item("a", 1, 1));
    cart.apply_discount("SAVE10");
    cart.remove_discount();
    cart.remove_item("missing");

    assert_eq!(storage.writes().len(), 3);
}

#[test]
fn test_custom_storage_key() {
    let storage = RecordingStorage::new();
    let config = PanierrConfig::default().with_storage_key("shop-42");
    let mut cart = Panierr::new(config, storage.clone());

    cart.add_item(item("a", 1, 1));

    assert_eq!(storage.writes()[0].0, "shop-42");
    assert_eq!(storage.get(KEY).unwrap(), None);
}

#[test]
fn test_auto_load_off_starts_empty() {
    let storage = MemoryStorage::new();
    Panierr::new(PanierrConfig::default(), storage.clone()).add_item(item("a", 1, 1));

    let mut cart = Panierr::new(PanierrConfig::default().with_auto_load(false), storage);
    assert!(cart.is_empty());

    cart.reload();
    assert_eq!(cart.get_item_quantity("a"), Some(1));
}

#[test]
fn test_missing_or_blank_blob_loads_empty_without_error() {
    for stored in [None, Some(""), Some("   ")] {
        let storage = MemoryStorage::new();
        if let Some(blob) = stored {
            storage.set(KEY, blob).unwrap();
        }
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);

        let cart = Panierr::builder(PanierrConfig::default())
            .storage(storage)
            .on_error(move |e| sink.lock().unwrap().push(e.clone()))
            .build();

        assert!(cart.is_empty());
        assert!(errors.lock().unwrap().is_empty(), "stored {:?}", stored);
    }
}

#[test]
fn test_bad_blobs_load_empty_with_error() {
    let blobs = [
        "not json",
        r#"{"cartItems": "nope"}"#,
        r#"{"cartItems": [{"id": "a", "name": "A", "price": -1, "quantity": 1}]}"#,
        r#"{"cartItems": [{"id": "a", "name": "A", "price": 1, "quantity": 0}]}"#,
        r#"{"cartItems": [
            {"id": "a", "name": "A", "price": 1, "quantity": 1},
            {"id": "a", "name": "A", "price": 1, "quantity": 2}
        ]}"#,
        r#"{"cartItems": [{"id": "a", "name": "A", "price": 10, "quantity": 1}],
            "discountsApplied": [{"code": "X", "type": "fixed", "amount": -50}]}"#,
        r#"{"cartItems": [{"id": "a", "name": "A", "price": 10, "quantity": 1}],
            "discountsApplied": [{"code": "X", "type": "percentage", "amount": 120}]}"#,
        r#"{"discountsApplied": [
            {"code": "A", "type": "fixed", "amount": 1},
            {"code": "B", "type": "fixed", "amount": 2}
        ]}"#,
    ];

    for blob in blobs {
        let storage = MemoryStorage::new();
        storage.set(KEY, blob).unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        let cart = Panierr::builder(PanierrConfig::default())
            .storage(storage)
            .on(EventKind::Error, move |event, _| {
                sink.lock().unwrap().push(event.clone())
            })
            .build();

        assert!(cart.is_empty(), "blob {}", blob);
        assert_eq!(error_messages(&events), vec!["Failed to load cart"], "blob {}", blob);
    }
}

#[test]
fn test_unreadable_storage_loads_empty_with_error() {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);

    let cart = Panierr::builder(PanierrConfig::default())
        .storage(FailingStorage)
        .on_error(move |e| sink.lock().unwrap().push(e.to_string()))
        .build();

    assert!(cart.is_empty());
    assert_eq!(*errors.lock().unwrap(), vec!["Failed to load cart".to_string()]);
}

#[test]
fn test_missing_arrays_read_as_empty() {
    let storage = MemoryStorage::new();
    storage
        .set(KEY, r#"{"cartItems": [{"id": "a", "name": "A", "price": 2.5}]}"#)
        .unwrap();

    let cart = Panierr::new(PanierrConfig::default(), storage);

    assert_eq!(cart.get_item_quantity("a"), Some(1));
    assert!(cart.applied_discounts().is_empty());
    assert_eq!(cart.calculate_totals().total_price, Money::from_cents(250));
}

// =============================================================================
// Listeners
// =============================================================================

#[test]
fn test_off_by_handle() {
    let mut cart = Panierr::new(PanierrConfig::default(), MemoryStorage::new());
    let count = Arc::new(Mutex::new(0));

    let sink = Arc::clone(&count);
    let id = cart.on(EventKind::ItemAdded, move |_, _| *sink.lock().unwrap() += 1);
    let other = Arc::clone(&count);
    cart.on(EventKind::ItemAdded, move |_, _| *other.lock().unwrap() += 10);

    cart.add_item(item("a", 1, 1));
    cart.off(EventKind::ItemAdded, id);
    cart.off(EventKind::ItemAdded, id);
    cart.add_item(item("b", 1, 1));

    assert_eq!(*count.lock().unwrap(), 21);
    assert_eq!(cart.listener_count(EventKind::ItemAdded), 1);
}

#[test]
fn test_listeners_run_in_registration_order() {
    let mut cart = Panierr::new(PanierrConfig::default(), MemoryStorage::new());
    let order = Arc::new(Mutex::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let sink = Arc::clone(&order);
        cart.on(EventKind::CartCleared, move |_, _| sink.lock().unwrap().push(tag));
    }

    cart.clear_cart();

    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
}

#[test]
fn test_listener_only_hears_its_kind() {
    let mut cart = Panierr::new(catalog_config(), MemoryStorage::new());
    let heard = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&heard);
    cart.on(EventKind::DiscountApplied, move |event, view| {
        sink.lock().unwrap().push((event.kind(), view.discount_amount()));
    });

    cart.add_item(item("a", 20, 1));
    cart.apply_discount("SAVE10");
    cart.remove_discount();

    assert_eq!(
        *heard.lock().unwrap(),
        vec![(EventKind::DiscountApplied, Money::from_major(2))]
    );
}

#[test]
fn test_shared_storage_between_engines() {
    let storage: Arc<dyn StorageProvider> = Arc::new(MemoryStorage::new());
    let mut writer = Panierr::builder(PanierrConfig::default())
        .shared_storage(Arc::clone(&storage))
        .build();
    writer.add_item(item("a", 1, 2));

    let reader = Panierr::builder(PanierrConfig::default())
        .shared_storage(storage)
        .build();

    assert_eq!(reader.get_item_quantity("a"), Some(2));
}
