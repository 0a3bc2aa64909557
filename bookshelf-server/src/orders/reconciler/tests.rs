use super::*;
use crate::orders::memory::{FailPoint, MemoryStore};
use shared::models::{Cart, DEFAULT_AVAILABLE_COUNT};

const ALICE: &str = "alice@example.com";
const BOB: &str = "bob@example.com";

fn book(product_id: i64, title: &str, price: f64, available_count: i32) -> Product {
    Product {
        product_id,
        title: title.to_string(),
        author: "Author".to_string(),
        genre: "Fiction".to_string(),
        category: "Novel".to_string(),
        price,
        published_year: 1965,
        language: "English".to_string(),
        image_link: String::new(),
        pdf_link: String::new(),
        description: String::new(),
        avg_star_rating: 0.0,
        num_of_ratings: 0,
        is_available: available_count > 0,
        available_count,
    }
}

fn cart(customer: &str, lines: &[(i64, i32)]) -> Cart {
    Cart {
        customer_id: customer.to_string(),
        items: lines
            .iter()
            .map(|(product_id, quantity)| CartItem {
                product_id: *product_id,
                quantity: *quantity,
                added_at: 1,
            })
            .collect(),
        updated_at: 1,
    }
}

fn address() -> ShippingAddress {
    ShippingAddress {
        address: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        postal_code: "560001".to_string(),
        country: "India".to_string(),
    }
}

fn request(customer: &str) -> PlaceOrder {
    PlaceOrder {
        customer_id: customer.to_string(),
        shipping_address: address(),
        payment_mode: PaymentMode::CashOnDelivery,
        payment_status: false,
        order_id: None,
    }
}

fn reconciler(store: &Arc<MemoryStore>) -> OrderReconciler {
    OrderReconciler::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(OrderLocks::new()),
        3,
    )
}

async fn seeded() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert_product(book(1, "Dune", 10.99, 2)).await;
    store.insert_product(book(2, "Emma", 5.5, 5)).await;
    store
}

#[tokio::test]
async fn last_copies_sell_out() {
    let store = seeded().await;
    store.put_cart(cart(ALICE, &[(1, 2)])).await;

    let confirmation = reconciler(&store).place_order(request(ALICE)).await.unwrap();

    let product = store.product(1).await.unwrap();
    assert_eq!(product.available_count, 0);
    assert!(!product.is_available);
    assert!(store.cart(ALICE).await.unwrap().is_empty());

    assert_eq!(confirmation.items.len(), 1);
    assert_eq!(confirmation.items[0].quantity, 2);
    assert_eq!(confirmation.total_amount, 21.98);
    assert!(!confirmation.replayed);

    let order = store.order(ALICE).await.unwrap();
    assert_eq!(order.items, confirmation.items);
}

#[tokio::test]
async fn one_copy_too_many_changes_nothing() {
    let store = seeded().await;
    store.put_cart(cart(ALICE, &[(1, 3)])).await;

    let err = reconciler(&store)
        .place_order(request(ALICE))
        .await
        .unwrap_err();

    match err {
        PlaceOrderError::InsufficientStock {
            product_id,
            title,
            requested,
            available,
        } => {
            assert_eq!(product_id, 1);
            assert_eq!(title, "Dune");
            assert_eq!(requested, 3);
            assert_eq!(available, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let product = store.product(1).await.unwrap();
    assert_eq!(product.available_count, 2);
    assert!(product.is_available);
    assert_eq!(store.cart(ALICE).await.unwrap().items.len(), 1);
    assert!(store.order(ALICE).await.is_none());
    assert_eq!(store.write_count().await, 0);
}

#[tokio::test]
async fn multi_item_order_decrements_each_product() {
    let store = seeded().await;
    store.put_cart(cart(ALICE, &[(1, 1), (2, 3)])).await;

    let confirmation = reconciler(&store).place_order(request(ALICE)).await.unwrap();

    assert_eq!(store.product(1).await.unwrap().available_count, 1);
    assert_eq!(store.product(2).await.unwrap().available_count, 2);
    assert_eq!(confirmation.items.len(), 2);
    assert_eq!(confirmation.total_amount, 27.49);
    assert!(
        confirmation
            .items
            .iter()
            .all(|item| item.date == confirmation.items[0].date
                && item.shipping_address == address()
                && item.payment_mode == PaymentMode::CashOnDelivery)
    );
}

#[tokio::test]
async fn any_short_item_blocks_the_whole_cart() {
    let store = seeded().await;
    store.put_cart(cart(ALICE, &[(2, 1), (1, 5)])).await;

    let err = reconciler(&store)
        .place_order(request(ALICE))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlaceOrderError::InsufficientStock { product_id: 1, .. }
    ));

    assert_eq!(store.product(2).await.unwrap().available_count, 5);
    assert_eq!(store.cart(ALICE).await.unwrap().items.len(), 2);
    assert_eq!(store.write_count().await, 0);
}

#[tokio::test]
async fn unknown_product_writes_nothing() {
    let store = seeded().await;
    store.put_cart(cart(ALICE, &[(2, 1), (99, 1)])).await;

    let err = reconciler(&store)
        .place_order(request(ALICE))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlaceOrderError::ProductNotFound { product_id: 99 }
    ));
    assert_eq!(err.to_string(), "Book with ID 99 not found.");
    assert_eq!(store.product(2).await.unwrap().available_count, 5);
    assert_eq!(store.write_count().await, 0);
}

#[tokio::test]
async fn missing_product_reported_before_short_stock() {
    let store = seeded().await;
    store.put_cart(cart(ALICE, &[(1, 9), (42, 1)])).await;

    let err = reconciler(&store)
        .place_order(request(ALICE))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlaceOrderError::ProductNotFound { product_id: 42 }
    ));
}

#[tokio::test]
async fn empty_or_absent_cart_is_rejected() {
    let store = seeded().await;
    let engine = reconciler(&store);

    let err = engine.place_order(request(ALICE)).await.unwrap_err();
    assert!(matches!(err, PlaceOrderError::EmptyCart));
    assert_eq!(err.to_string(), "Cart is empty!");

    store.put_cart(Cart::new(ALICE)).await;
    let err = engine.place_order(request(ALICE)).await.unwrap_err();
    assert!(matches!(err, PlaceOrderError::EmptyCart));

    assert_eq!(store.write_count().await, 0);
    assert!(store.order(ALICE).await.is_none());
}

#[tokio::test]
async fn non_positive_quantity_is_rejected() {
    let store = seeded().await;
    store.put_cart(cart(ALICE, &[(1, 1), (2, 0)])).await;

    let err = reconciler(&store)
        .place_order(request(ALICE))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlaceOrderError::InvalidQuantity {
            product_id: 2,
            quantity: 0
        }
    ));
    assert_eq!(store.write_count().await, 0);
}

#[tokio::test]
async fn overflowing_duplicate_lines_are_rejected() {
    let store = seeded().await;
    store
        .put_cart(cart(ALICE, &[(2, i32::MAX - 1), (2, 2)]))
        .await;

    let err = reconciler(&store)
        .place_order(request(ALICE))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlaceOrderError::InvalidQuantity {
            product_id: 2,
            quantity: 2
        }
    ));
    assert_eq!(store.write_count().await, 0);
    assert_eq!(store.product(2).await.unwrap().available_count, 5);
}

#[tokio::test]
async fn second_order_appends_to_the_same_document() {
    let store = seeded().await;
    let engine = reconciler(&store);

    store.put_cart(cart(ALICE, &[(1, 1)])).await;
    let first = engine.place_order(request(ALICE)).await.unwrap();

    store.put_cart(cart(ALICE, &[(2, 2)])).await;
    let second = engine.place_order(request(ALICE)).await.unwrap();

    let orders = engine.get_orders(ALICE).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].line_id, first.items[0].line_id);
    assert_eq!(orders[1].line_id, second.items[0].line_id);
}

#[tokio::test]
async fn get_orders_without_history_is_empty() {
    let store = seeded().await;
    assert!(reconciler(&store).get_orders(BOB).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn race_for_the_last_copy_has_one_winner() {
    let store = Arc::new(MemoryStore::new());
    store.insert_product(book(7, "Ulysses", 12.0, 1)).await;
    store.put_cart(cart(ALICE, &[(7, 1)])).await;
    store.put_cart(cart(BOB, &[(7, 1)])).await;

    let engine = Arc::new(reconciler(&store));
    let a = tokio::spawn({
        let engine = engine.clone();
        async move { engine.place_order(request(ALICE)).await }
    });
    let b = tokio::spawn({
        let engine = engine.clone();
        async move { engine.place_order(request(BOB)).await }
    });

    let results = [a.await.unwrap(), b.await.unwrap()];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(PlaceOrderError::InsufficientStock {
            product_id: 7,
            available: 0,
            ..
        })
    )));

    let product = store.product(7).await.unwrap();
    assert_eq!(product.available_count, 0);
    assert!(!product.is_available);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_buyers_never_oversell() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_product(book(3, "Middlemarch", 8.0, DEFAULT_AVAILABLE_COUNT))
        .await;

    let customers: Vec<String> = (0..10).map(|i| format!("buyer{i}@example.com")).collect();
    for customer in &customers {
        store.put_cart(cart(customer, &[(3, 1)])).await;
    }

    let engine = Arc::new(reconciler(&store));
    let handles: Vec<_> = customers
        .iter()
        .map(|customer| {
            let engine = engine.clone();
            let req = request(customer);
            tokio::spawn(async move { engine.place_order(req).await })
        })
        .collect();

    let mut wins = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            wins += 1;
        }
    }

    assert_eq!(wins, DEFAULT_AVAILABLE_COUNT);
    assert_eq!(store.product(3).await.unwrap().available_count, 0);
}

#[tokio::test]
async fn conflicting_write_is_retried() {
    let store = seeded().await;
    store.put_cart(cart(ALICE, &[(1, 1), (2, 1)])).await;
    store.force_conflicts(2, 2).await;

    reconciler(&store).place_order(request(ALICE)).await.unwrap();

    // product 1 was applied and reverted twice before the third round landed
    assert_eq!(store.product(1).await.unwrap().available_count, 1);
    assert_eq!(store.product(2).await.unwrap().available_count, 4);
}

#[tokio::test]
async fn persistent_conflicts_give_up_with_contention() {
    let store = seeded().await;
    store.put_cart(cart(ALICE, &[(1, 1), (2, 1)])).await;
    store.force_conflicts(2, 10).await;

    let err = reconciler(&store)
        .place_order(request(ALICE))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlaceOrderError::StockContention { product_id: 2 }
    ));

    assert_eq!(store.product(1).await.unwrap().available_count, 2);
    assert_eq!(store.product(2).await.unwrap().available_count, 5);
    assert_eq!(store.cart(ALICE).await.unwrap().items.len(), 2);
    assert!(store.order(ALICE).await.is_none());
}

#[tokio::test]
async fn outside_sale_is_revalidated_on_retry() {
    let store = seeded().await;
    store.put_cart(cart(ALICE, &[(1, 2)])).await;
    store.inject_external_sale(1, 1).await;

    let err = reconciler(&store)
        .place_order(request(ALICE))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlaceOrderError::InsufficientStock {
            product_id: 1,
            available: 1,
            ..
        }
    ));
    assert_eq!(store.product(1).await.unwrap().available_count, 1);
}

#[tokio::test]
async fn ledger_failure_restores_stock() {
    let store = seeded().await;
    store.put_cart(cart(ALICE, &[(1, 2), (2, 1)])).await;
    store.fail_on(FailPoint::LedgerCreate).await;

    let err = reconciler(&store)
        .place_order(request(ALICE))
        .await
        .unwrap_err();
    assert!(matches!(err, PlaceOrderError::Persistence(_)));

    let product = store.product(1).await.unwrap();
    assert_eq!(product.available_count, 2);
    assert!(product.is_available);
    assert_eq!(store.product(2).await.unwrap().available_count, 5);
    assert_eq!(store.cart(ALICE).await.unwrap().items.len(), 2);
    assert!(store.order(ALICE).await.is_none());
}

#[tokio::test]
async fn cart_clear_failure_retracts_lines_and_restores_stock() {
    let store = seeded().await;
    let engine = reconciler(&store);

    store.put_cart(cart(ALICE, &[(2, 1)])).await;
    let first = engine.place_order(request(ALICE)).await.unwrap();

    store.put_cart(cart(ALICE, &[(1, 1)])).await;
    store.fail_on(FailPoint::CartClear).await;
    let err = engine.place_order(request(ALICE)).await.unwrap_err();
    assert!(matches!(err, PlaceOrderError::Persistence(_)));

    // earlier order untouched, new line retracted
    let order = store.order(ALICE).await.unwrap();
    assert_eq!(order.items, first.items);
    assert_eq!(store.product(1).await.unwrap().available_count, 2);
    assert_eq!(store.cart(ALICE).await.unwrap().items.len(), 1);
}

#[tokio::test]
async fn cart_clear_failure_removes_a_document_created_by_the_placement() {
    let store = seeded().await;
    store.put_cart(cart(ALICE, &[(1, 1)])).await;
    store.fail_on(FailPoint::CartClear).await;

    reconciler(&store)
        .place_order(request(ALICE))
        .await
        .unwrap_err();

    assert!(store.order(ALICE).await.is_none());
    assert_eq!(store.product(1).await.unwrap().available_count, 2);
}

#[tokio::test]
async fn failed_compensation_surfaces_as_persistence() {
    let store = seeded().await;
    store.put_cart(cart(ALICE, &[(1, 1)])).await;
    store.fail_on(FailPoint::LedgerCreate).await;
    store.fail_on(FailPoint::StockRevert).await;

    let err = reconciler(&store)
        .place_order(request(ALICE))
        .await
        .unwrap_err();
    assert!(matches!(err, PlaceOrderError::Persistence(_)));
    assert!(err.to_string().contains("StockRevert"));
}

#[tokio::test]
async fn failed_stock_batch_leaves_counts_alone() {
    let store = seeded().await;
    store.put_cart(cart(ALICE, &[(1, 1)])).await;
    store.fail_on(FailPoint::StockWrite).await;

    let err = reconciler(&store)
        .place_order(request(ALICE))
        .await
        .unwrap_err();
    assert!(matches!(err, PlaceOrderError::Persistence(_)));
    assert_eq!(store.product(1).await.unwrap().available_count, 2);

    store.clear_failures().await;
    reconciler(&store).place_order(request(ALICE)).await.unwrap();
    assert_eq!(store.product(1).await.unwrap().available_count, 1);
}

#[tokio::test]
async fn known_order_id_is_replayed_without_writes() {
    let store = seeded().await;
    let engine = reconciler(&store);
    let mut req = request(ALICE);
    req.payment_mode = PaymentMode::UpiOrCard;
    req.order_id = Some("ORDER_1700000000000".to_string());

    store.put_cart(cart(ALICE, &[(1, 1)])).await;
    let first = engine.place_order(req.clone()).await.unwrap();
    let writes = store.write_count().await;

    // Even with a new cart the retry must not purchase again
    store.put_cart(cart(ALICE, &[(2, 1)])).await;
    let again = engine.place_order(req).await.unwrap();

    assert!(again.replayed);
    assert_eq!(again.items, first.items);
    assert_eq!(again.total_amount, first.total_amount);
    assert_eq!(store.write_count().await, writes);
    assert_eq!(store.product(2).await.unwrap().available_count, 5);
}

#[tokio::test]
async fn replayed_total_uses_the_prices_paid() {
    let store = seeded().await;
    let engine = reconciler(&store);
    let mut req = request(ALICE);
    req.payment_mode = PaymentMode::UpiOrCard;
    req.order_id = Some("ORDER_1700000000001".to_string());

    store.put_cart(cart(ALICE, &[(1, 2)])).await;
    let first = engine.place_order(req.clone()).await.unwrap();
    assert_eq!(first.items[0].unit_price, Some(10.99));

    let mut repriced = store.product(1).await.unwrap();
    repriced.price = 99.0;
    store.insert_product(repriced).await;

    let again = engine.place_order(req).await.unwrap();
    assert!(again.replayed);
    assert_eq!(again.total_amount, 21.98);
}

#[tokio::test]
async fn lines_changed_after_validation_survive_clear() {
    let store = seeded().await;
    let validated = cart(ALICE, &[(1, 1), (2, 1)]).items;

    // quantity of product 1 raised and product 1 re-added after the read
    store.put_cart(cart(ALICE, &[(1, 3), (2, 1)])).await;
    store.remove_lines(ALICE, &validated).await.unwrap();

    let remaining = store.cart(ALICE).await.unwrap();
    assert_eq!(remaining.items.len(), 1);
    assert_eq!(remaining.items[0].product_id, 1);
    assert_eq!(remaining.items[0].quantity, 3);
}
