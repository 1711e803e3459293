use super::*;
use crate::printing::test_support::RecordingPrinter;
use crate::printing::{KitchenTicketRenderer, select_printable};
use shared::{ChangeKind, DiningTableCreate, LineItem};

struct Fixture {
    service: OrderService,
    tables: TableService,
    feed: ChangeFeed,
    printer: Arc<RecordingPrinter>,
}

async fn fixture() -> Fixture {
    let db = DbService::in_memory().await.unwrap();
    let feed = ChangeFeed::new(16);
    let tables = TableService::new(db.clone(), feed.clone());
    let printer = Arc::new(RecordingPrinter::default());
    let executor = Arc::new(PrintExecutor::new(
        KitchenTicketRenderer::default(),
        printer.clone(),
    ));
    Fixture {
        service: OrderService::new(db, feed.clone(), tables.clone(), executor),
        tables,
        feed,
        printer,
    }
}

fn new_order(table_id: Option<i64>) -> NewOrder {
    NewOrder {
        table_id,
        items: vec![LineItem::new(2, "Pollo a la Brasa")],
        notes: Some("sin papas".into()),
        payment_method: None,
        total: 64.0,
    }
}

#[tokio::test]
async fn test_open_occupies_table_and_publishes_printable_insert() {
    let f = fixture().await;
    let mut rx = f.feed.subscribe();
    let table = f.tables.create(DiningTableCreate { number: 5 }).await.unwrap();

    let order = f.service.open(new_order(Some(table.id))).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(f.tables.get(table.id).await.unwrap().state, TableState::Occupied);
    assert_eq!(f.service.get(&order.id).await.unwrap(), order);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.kind, ChangeKind::Insert);
    let printable = select_printable(&event).unwrap().unwrap();
    assert_eq!(printable, order);
}

#[tokio::test]
async fn test_open_on_already_occupied_table() {
    let f = fixture().await;
    let table = f.tables.create(DiningTableCreate { number: 5 }).await.unwrap();
    f.service.open(new_order(Some(table.id))).await.unwrap();
    // second order at the same table is fine
    f.service.open(new_order(Some(table.id))).await.unwrap();
}

async fn reject_inserts(f: &Fixture) {
    sqlx::query(
        "CREATE TRIGGER reject_ventas BEFORE INSERT ON ventas \
         BEGIN SELECT RAISE(ABORT, 'ventas locked'); END",
    )
    .execute(&f.service.db.pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_failed_insert_releases_table_it_occupied() {
    let f = fixture().await;
    let mut rx = f.feed.subscribe();
    let table = f.tables.create(DiningTableCreate { number: 5 }).await.unwrap();
    reject_inserts(&f).await;

    let err = f.service.open(new_order(Some(table.id))).await.unwrap_err();
    assert!(matches!(err, OrderError::Database(_)), "got {err}");
    assert_eq!(f.tables.get(table.id).await.unwrap().state, TableState::Free);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_failed_insert_keeps_table_of_earlier_order() {
    let f = fixture().await;
    let table = f.tables.create(DiningTableCreate { number: 5 }).await.unwrap();
    let first = f.service.open(new_order(Some(table.id))).await.unwrap();
    reject_inserts(&f).await;

    assert!(f.service.open(new_order(Some(table.id))).await.is_err());
    assert_eq!(f.tables.get(table.id).await.unwrap().state, TableState::Occupied);
    assert_eq!(f.service.get(&first.id).await.unwrap().table_id, Some(table.id));
}

#[tokio::test]
async fn test_open_rejects_bad_input() {
    let f = fixture().await;
    let mut empty = new_order(None);
    empty.items.clear();
    assert!(matches!(
        f.service.open(empty).await,
        Err(OrderError::Validation(_))
    ));
    assert!(matches!(
        f.service.open(new_order(Some(77))).await,
        Err(OrderError::Table(TableError::NotFound(77)))
    ));
}

#[tokio::test]
async fn test_updates_publish_update_events() {
    let f = fixture().await;
    let order = f.service.open(new_order(None)).await.unwrap();
    let mut rx = f.feed.subscribe();

    let updated = f
        .service
        .update_status(&order.id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Completed);

    let paid = f
        .service
        .update_payment(
            &order.id,
            PaymentUpdate {
                status: PaymentStatus::Paid,
                method: Some("yape".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert_eq!(paid.payment_method.as_deref(), Some("yape"));

    for _ in 0..2 {
        let event = rx.try_recv().unwrap();
        assert_eq!(event.kind, ChangeKind::Update);
        assert!(event.old_record.is_some());
        assert!(select_printable(&event).unwrap().is_none());
    }
}

#[tokio::test]
async fn test_unknown_order() {
    let f = fixture().await;
    assert!(matches!(
        f.service.update_status("nope", OrderStatus::Completed).await,
        Err(OrderError::NotFound(_))
    ));
    assert!(matches!(f.service.reprint("nope").await, Err(OrderError::NotFound(_))));
}

#[tokio::test]
async fn test_reprint_sends_ticket_with_table_number() {
    let f = fixture().await;
    let table = f.tables.create(DiningTableCreate { number: 12 }).await.unwrap();
    let order = f.service.open(new_order(Some(table.id))).await.unwrap();

    let bytes = f.service.reprint(&order.id).await.unwrap();
    let jobs = f.printer.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].len(), bytes);
    assert!(jobs[0].windows(7).any(|w| w == b"MESA 12"));
}
