use chrono::Utc;
use lokapasar_engine::{
    db_types::{OrderStatus, PaymentStatus},
    gateway::{PaymentRail, WebhookEvent},
    pricing::CartLine,
    test_utils::prepare_env::{prepare_test_env, random_db_path, seed_product},
    traits::OrderStore,
    CartSpec,
    OrderFlowApi,
    OrderFlowError,
    Reconciliation,
    ReconciliationAnomaly,
    ReconcilerApi,
    SqliteDatabase,
};
use lp_common::Rupiah;
use tokio::runtime::Runtime;

fn cart_spec() -> CartSpec {
    CartSpec {
        store_id: 1,
        address_id: 1,
        voucher_id: None,
        items: vec![CartLine { product_id: 1, variant_id: None, quantity: 2 }],
        courier: "jne".into(),
        courier_service: "REG".into(),
        shipping_cost: Rupiah::from(15_000),
        payment_method: None,
        notes: None,
    }
}

async fn setup() -> (SqliteDatabase, OrderFlowApi<SqliteDatabase>, ReconcilerApi<SqliteDatabase>) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    // 100_000 less 10% = 90_000 per unit
    seed_product(&db, 1, "Batik shirt", 100_000, 10, &[]).await;
    (db.clone(), OrderFlowApi::new(db.clone()), ReconcilerApi::new(db))
}

fn event(rail: PaymentRail, reference: &str, status: &str, paid_amount: Option<i64>) -> WebhookEvent {
    WebhookEvent {
        rail,
        reference: reference.to_string().into(),
        status: status.into(),
        paid_amount: paid_amount.map(Rupiah::from),
        paid_at: Some(Utc::now()),
    }
}

#[test]
fn paid_webhook_settles_the_order_once() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async {
        let (db, orders, reconciler) = setup().await;
        let order = orders.create_order(42, cart_spec()).await.unwrap();
        assert_eq!(order.total_amount, Rupiah::from(195_000));
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(order.status, OrderStatus::PendingPayment);

        let ev = event(PaymentRail::VirtualAccount, order.order_number.as_str(), "COMPLETED", Some(195_000));
        let result = reconciler.apply_event(ev.clone()).await.unwrap();
        let settled = match result {
            Reconciliation::Applied(o) => o,
            other => panic!("expected Applied, got {other:?}"),
        };
        assert_eq!(settled.payment_status, PaymentStatus::Paid);
        assert_eq!(settled.status, OrderStatus::Paid);
        assert!(settled.paid_at.is_some());

        // Redelivery of the same event is a no-op, not a second transition.
        match reconciler.apply_event(ev).await.unwrap() {
            Reconciliation::AlreadySettled(o) => {
                assert_eq!(o.payment_status, PaymentStatus::Paid);
                assert_eq!(o.paid_at, settled.paid_at);
            },
            other => panic!("expected AlreadySettled, got {other:?}"),
        }
        let stored = db.fetch_order_by_number(&settled.order_number).await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
    });
}

#[test]
fn late_paid_after_expiry_is_a_conflict_not_a_correction() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async {
        let (db, orders, reconciler) = setup().await;
        let order = orders.create_order(42, cart_spec()).await.unwrap();
        let number = order.order_number.as_str().to_string();

        let expired = reconciler.apply_event(event(PaymentRail::Qris, &number, "EXPIRED", None)).await.unwrap();
        assert!(matches!(expired, Reconciliation::Applied(ref o) if o.payment_status == PaymentStatus::Expired));

        let late_paid = reconciler.apply_event(event(PaymentRail::Qris, &number, "COMPLETED", Some(195_000))).await;
        match late_paid.unwrap() {
            Reconciliation::Anomaly(ReconciliationAnomaly::TerminalConflict { current, incoming, .. }) => {
                assert_eq!(current, PaymentStatus::Expired);
                assert_eq!(incoming, PaymentStatus::Paid);
            },
            other => panic!("expected TerminalConflict, got {other:?}"),
        }
        // The recorded state is untouched.
        let stored = db.fetch_order_by_number(&order.order_number).await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Expired);
        assert!(stored.paid_at.is_none());
    });
}

#[test]
fn amount_mismatch_never_marks_the_order_paid() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async {
        let (db, orders, reconciler) = setup().await;
        let order = orders.create_order(42, cart_spec()).await.unwrap();
        let number = order.order_number.as_str().to_string();

        let short_paid = reconciler.apply_event(event(PaymentRail::Ewallet, &number, "SUCCEEDED", Some(100))).await;
        match short_paid.unwrap() {
            Reconciliation::Anomaly(ReconciliationAnomaly::AmountMismatch { expected, reported, .. }) => {
                assert_eq!(expected, Rupiah::from(195_000));
                assert_eq!(reported, Rupiah::from(100));
            },
            other => panic!("expected AmountMismatch, got {other:?}"),
        }
        let stored = db.fetch_order_by_number(&order.order_number).await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Unpaid);
    });
}

#[test]
fn interim_and_unknown_statuses_are_ignored() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async {
        let (db, orders, reconciler) = setup().await;
        let order = orders.create_order(42, cart_spec()).await.unwrap();
        let number = order.order_number.as_str().to_string();

        let r = reconciler.apply_event(event(PaymentRail::Ewallet, &number, "PENDING", None)).await.unwrap();
        assert!(matches!(r, Reconciliation::Ignored));
        // a status from a different rail's table does not apply either
        let r = reconciler.apply_event(event(PaymentRail::VirtualAccount, &number, "PAID", None)).await.unwrap();
        assert!(matches!(r, Reconciliation::Ignored));

        let stored = db.fetch_order_by_number(&order.order_number).await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Unpaid);
    });
}

#[test]
fn unknown_reference_is_an_error_without_side_effects() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async {
        let (_, _, reconciler) = setup().await;
        let result = reconciler
            .apply_event(event(PaymentRail::Invoice, "INV/20250101/NOSUCH", "PAID", Some(195_000)))
            .await;
        assert!(matches!(result, Err(OrderFlowError::UnknownReference(_))));
    });
}

// Two conflicting deliveries race at the database. Exactly one wins the conditional update; the loser observes the
// terminal state and reports either a duplicate or a conflict, never a second transition.
#[test]
fn concurrent_paid_and_expired_events_settle_exactly_once() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async {
        let (db, orders, reconciler) = setup().await;
        let order = orders.create_order(42, cart_spec()).await.unwrap();
        let number = order.order_number.as_str().to_string();

        let paid = event(PaymentRail::Invoice, &number, "PAID", Some(195_000));
        let expired = event(PaymentRail::Invoice, &number, "EXPIRED", None);
        let r1 = tokio::spawn({
            let api = reconciler.clone();
            async move { api.apply_event(paid).await.unwrap() }
        });
        let r2 = tokio::spawn({
            let api = reconciler.clone();
            async move { api.apply_event(expired).await.unwrap() }
        });
        let (r1, r2) = (r1.await.unwrap(), r2.await.unwrap());

        let applied = usize::from(matches!(r1, Reconciliation::Applied(_))) +
            usize::from(matches!(r2, Reconciliation::Applied(_)));
        assert_eq!(applied, 1, "exactly one event must win, got {r1:?} / {r2:?}");
        let loser = if matches!(r1, Reconciliation::Applied(_)) { r2 } else { r1 };
        assert!(
            matches!(loser, Reconciliation::AlreadySettled(_) | Reconciliation::Anomaly(_)),
            "the losing event must not transition anything, got {loser:?}"
        );
        let stored = db.fetch_order_by_number(&order.order_number).await.unwrap().unwrap();
        assert!(stored.payment_status.is_terminal());
    });
}

#[test]
fn failed_then_succeeded_does_not_resurrect_the_charge() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async {
        let (db, orders, reconciler) = setup().await;
        let order = orders.create_order(42, cart_spec()).await.unwrap();
        let number = order.order_number.as_str().to_string();

        let r = reconciler.apply_event(event(PaymentRail::Ewallet, &number, "FAILED", None)).await.unwrap();
        assert!(matches!(r, Reconciliation::Applied(ref o) if o.payment_status == PaymentStatus::Failed));

        let r = reconciler.apply_event(event(PaymentRail::Ewallet, &number, "SUCCEEDED", Some(195_000))).await.unwrap();
        assert!(matches!(r, Reconciliation::Anomaly(ReconciliationAnomaly::TerminalConflict { .. })));

        let stored = db.fetch_order_by_number(&order.order_number).await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Failed);
        assert_eq!(stored.status, OrderStatus::PendingPayment);
    });
}
