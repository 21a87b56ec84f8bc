//! Integration-level smoke tests over `TicketingEngine`: user/train
//! lifecycle, ticket purchase and refund, and the pending-queue promotion
//! scenario from S6.

use ticket_engine::domain::{Order, OrderStatus, Train, User};
use ticket_engine::types::{DateTime, FixedString};
use ticket_engine::TicketingEngine;

fn temp_dir() -> std::path::PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "ticket-engine-test-{}-{:?}",
        std::process::id(),
        std::thread::current().id()
    ));
    dir
}

fn sample_train(id: &str, seat_count: u16) -> Train {
    Train::new(
        FixedString::new(id).unwrap(),
        vec![
            FixedString::new("Beijing").unwrap(),
            FixedString::new("Jinan").unwrap(),
            FixedString::new("Shanghai").unwrap(),
        ],
        vec![0, 100, 300],
        vec![0, 200, 600],
        vec![i32::MAX, 210, 610],
        seat_count,
        DateTime::from_parts(6, 1, 0, 0).unwrap(),
        DateTime::from_parts(6, 30, 0, 0).unwrap(),
        b'G',
    )
}

fn sample_user(name: &str) -> User {
    User {
        username: FixedString::new(name).unwrap(),
        password: FixedString::new("hunter2").unwrap(),
        name: FixedString::new("Rider").unwrap(),
        mail: FixedString::new("rider@example.com").unwrap(),
        privilege: 1,
    }
}

#[test]
fn user_and_train_lifecycle_round_trips() {
    let dir = temp_dir();
    let mut engine = TicketingEngine::create(&dir).unwrap();

    engine.add_user(sample_user("alice")).unwrap();
    assert!(engine.login("alice", "hunter2").is_ok());
    assert!(engine.is_logged_in("alice"));
    assert!(engine.login("alice", "wrong").is_err());

    let profile = engine.query_profile("alice").unwrap();
    assert_eq!(profile.name.as_str(), "Rider");

    let updated = engine
        .modify_profile("alice", None, Some("Alice W."), None, None)
        .unwrap();
    assert_eq!(updated.name.as_str(), "Alice W.");

    engine.add_train(sample_train("G1234", 50)).unwrap();
    assert_eq!(engine.query_train("G1234").unwrap().id.as_str(), "G1234");
    assert!(engine.add_train(sample_train("G1234", 50)).is_err());

    engine.release_train("G1234").unwrap();
    assert!(engine.release_train("G1234").is_err());

    engine.logout("alice").unwrap();
    assert!(!engine.is_logged_in("alice"));
    assert!(engine.logout("alice").is_err());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn buy_ticket_consumes_seats_and_refund_restores_them() {
    let dir = temp_dir();
    let mut engine = TicketingEngine::create(&dir).unwrap();
    engine.add_user(sample_user("bob")).unwrap();
    engine.login("bob", "hunter2").unwrap();
    engine.add_train(sample_train("G2000", 2)).unwrap();
    engine.release_train("G2000").unwrap();

    let date = DateTime::from_parts(6, 5, 8, 0).unwrap();
    let first = engine
        .buy_ticket("bob", "G2000", date, "Beijing", "Shanghai", 2, false)
        .unwrap();
    assert_eq!(first.status, OrderStatus::Success);

    // no seats left: without allow_queue this must fail outright.
    assert!(engine
        .buy_ticket("bob", "G2000", date, "Beijing", "Shanghai", 1, false)
        .is_err());

    // with allow_queue it is accepted as Pending instead.
    let queued = engine
        .buy_ticket("bob", "G2000", date, "Beijing", "Shanghai", 1, true)
        .unwrap();
    assert_eq!(queued.status, OrderStatus::Pending);

    let orders = engine.query_ticket("bob").unwrap();
    assert_eq!(orders.len(), 2);
    // most-recent first.
    assert_eq!(orders[0].status, OrderStatus::Pending);

    // refunding the successful order (2nd-most-recent) frees 2 seats and
    // should promote the pending order to Success.
    engine.refund_ticket("bob", 2).unwrap();
    let orders = engine.query_ticket("bob").unwrap();
    let refunded: Vec<Order> = orders.into_iter().filter(|o| o.status == OrderStatus::Refunded).collect();
    assert_eq!(refunded.len(), 1);

    let orders = engine.query_ticket("bob").unwrap();
    assert!(orders.iter().any(|o| o.status == OrderStatus::Success && o.seat_count == 1));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn pending_queue_serials_keep_increasing_across_a_reopen() {
    let dir = temp_dir();
    let date = DateTime::from_parts(6, 10, 8, 0).unwrap();
    {
        let mut engine = TicketingEngine::create(&dir).unwrap();
        engine.add_user(sample_user("dave")).unwrap();
        engine.login("dave", "hunter2").unwrap();
        engine.add_train(sample_train("G4000", 1)).unwrap();
        engine.release_train("G4000").unwrap();

        let first = engine
            .buy_ticket("dave", "G4000", date, "Beijing", "Shanghai", 1, false)
            .unwrap();
        assert_eq!(first.status, OrderStatus::Success);
        assert_eq!(first.order_serial, 0);

        let queued = engine
            .buy_ticket("dave", "G4000", date, "Beijing", "Shanghai", 1, true)
            .unwrap();
        assert_eq!(queued.status, OrderStatus::Pending);
        assert_eq!(queued.order_serial, 1);

        engine.flush().unwrap();
    }

    let mut engine = TicketingEngine::open(&dir).unwrap();
    engine.login("dave", "hunter2").unwrap();

    // A fresh pending purchase must not reuse the still-pending order's
    // serial, or it would collide with it as a `train_unit_map` key.
    let queued_after_reopen = engine
        .buy_ticket("dave", "G4000", date, "Beijing", "Shanghai", 1, true)
        .unwrap();
    assert_eq!(queued_after_reopen.status, OrderStatus::Pending);
    assert_eq!(queued_after_reopen.order_serial, 2);

    // Refunding the original Success order frees the train's only seat;
    // FIFO promotion must pick the older (serial 1) pending order over the
    // one issued after reopening, even though serial 1 was assigned in a
    // previous process.
    let orders = engine.query_ticket("dave").unwrap();
    assert_eq!(orders.len(), 3);
    engine.refund_ticket("dave", 3).unwrap();

    let orders = engine.query_ticket("dave").unwrap();
    let by_serial = |serial: u32| orders.iter().find(|o| o.order_serial == serial).unwrap();
    assert_eq!(by_serial(1).status, OrderStatus::Success);
    assert_eq!(by_serial(2).status, OrderStatus::Pending);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn reopening_the_engine_preserves_state() {
    let dir = temp_dir();
    {
        let mut engine = TicketingEngine::create(&dir).unwrap();
        engine.add_user(sample_user("carol")).unwrap();
        engine.add_train(sample_train("G3000", 10)).unwrap();
        engine.flush().unwrap();
    }
    {
        let engine = TicketingEngine::open(&dir).unwrap();
        assert_eq!(engine.query_profile("carol").unwrap().username.as_str(), "carol");
        assert_eq!(engine.query_train("G3000").unwrap().seat_count, 10);
    }
    std::fs::remove_dir_all(&dir).ok();
}
