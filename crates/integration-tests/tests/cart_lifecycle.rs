//! End-to-end cart lifecycle through the file-backed store.

use go_marketplace_cart::storage::KeyValueStore;
use go_marketplace_cart::{CartConfig, CartProvider, DEFAULT_STORAGE_KEY, LogFormat};
use go_marketplace_core::{CartItem, Price, ProductId, Quantity};
use go_marketplace_integration_tests::{LEGACY_BLOB, TestDir, product};

#[tokio::test]
async fn test_add_increment_decrement_scenario() {
    let dir = TestDir::new();
    let provider = CartProvider::restore(dir.file_store(), DEFAULT_STORAGE_KEY)
        .await
        .expect("restore empty cart");
    let cart = provider.handle();
    let id = ProductId::new("a");

    let input = CartItem::new("a", "T", "u", 10).with_quantity(Quantity::new(99).expect("99"));
    cart.add_to_cart(input).await.expect("add");

    let products = cart.products();
    assert_eq!(products.len(), 1);
    assert_eq!(products.first().map(|p| p.quantity.get()), Some(1));

    cart.increment(&id).await.expect("increment");
    assert_eq!(cart.products().first().map(|p| p.quantity.get()), Some(2));

    cart.decrement(&id).await.expect("decrement");
    cart.decrement(&id).await.expect("decrement");
    assert_eq!(cart.products().first().map(|p| p.quantity.get()), Some(1));

    provider.close().await;
}

#[tokio::test]
async fn test_persisted_cart_survives_restart() {
    let dir = TestDir::new();

    let first = CartProvider::restore(dir.file_store(), DEFAULT_STORAGE_KEY)
        .await
        .expect("first restore");
    let cart = first.handle();
    cart.add_to_cart(product("a")).await.expect("add a");
    cart.add_to_cart(product("b")).await.expect("add b");
    cart.add_to_cart(product("a")).await.expect("add a again");
    cart.increment(&ProductId::new("b")).await.expect("increment b");
    let before = cart.products();
    first.close().await;

    let second = CartProvider::restore(dir.file_store(), DEFAULT_STORAGE_KEY)
        .await
        .expect("second restore");
    assert_eq!(second.handle().products(), before);

    let ids: Vec<String> = before.iter().map(|p| p.id.to_string()).collect();
    assert_eq!(ids, ["a", "b", "a"]);
}

#[tokio::test]
async fn test_reload_reproduces_every_price() {
    let prices = [
        Price::from(10),
        Price::from_cents(1999),
        Price::new(0.1 + 0.2),
        "0.1234567890123456789".parse::<Price>().expect("price"),
        "3.141592653589793238462643".parse::<Price>().expect("price"),
        Price::new(1e30),
        Price::new(1e-7),
    ];

    let dir = TestDir::new();
    let first = CartProvider::restore(dir.file_store(), DEFAULT_STORAGE_KEY)
        .await
        .expect("first restore");
    let cart = first.handle();

    for (n, price) in prices.iter().enumerate() {
        let id = format!("sku-{n}");
        cart.add_to_cart(CartItem::new(id.as_str(), format!("Item {n}"), "u", *price))
            .await
            .expect("add");
        // Vary quantities across lines.
        for _ in 0..n {
            cart.increment(&ProductId::new(id.as_str())).await.expect("increment");
        }
        assert_eq!(cart.products().len(), n + 1);
    }
    let before = cart.products();
    first.close().await;

    let second = CartProvider::restore(dir.file_store(), DEFAULT_STORAGE_KEY)
        .await
        .expect("second restore");
    assert_eq!(second.handle().products(), before);
}

#[tokio::test]
async fn test_legacy_blob_restores_exactly() {
    let dir = TestDir::new();
    let store = dir.file_store();
    store
        .set(DEFAULT_STORAGE_KEY, LEGACY_BLOB.to_string())
        .await
        .expect("seed blob");

    let provider = CartProvider::restore(dir.file_store(), DEFAULT_STORAGE_KEY)
        .await
        .expect("restore");
    let products = provider.handle().products();

    let expected = vec![
        CartItem::new("x", "T", "u", Price::from(5)).with_quantity(Quantity::new(3).expect("3")),
    ];
    assert_eq!(*products, expected);
}

#[tokio::test]
async fn test_written_blob_uses_legacy_field_names() {
    let dir = TestDir::new();
    let provider = CartProvider::restore(dir.file_store(), DEFAULT_STORAGE_KEY)
        .await
        .expect("restore");
    provider
        .handle()
        .add_to_cart(CartItem::new("x", "T", "u", 5))
        .await
        .expect("add");

    let blob = dir
        .file_store()
        .get(DEFAULT_STORAGE_KEY)
        .await
        .expect("read")
        .expect("blob present");
    let written: serde_json::Value = serde_json::from_str(&blob).expect("valid json");
    let legacy: serde_json::Value =
        serde_json::from_str(r#"[{"id":"x","title":"T","image_url":"u","price":5.0,"quantity":1}]"#)
            .expect("valid json");
    assert_eq!(written, legacy);
}

#[tokio::test]
async fn test_from_config_uses_configured_location() {
    let dir = TestDir::new();
    let config = CartConfig {
        storage_key: "@Test:cart".to_string(),
        storage_dir: dir.path().to_path_buf(),
        log_format: LogFormat::Pretty,
    };

    let provider = CartProvider::from_config(&config).await.expect("restore");
    provider
        .handle()
        .add_to_cart(product("a"))
        .await
        .expect("add");

    assert!(dir.file_store().path_for("@Test:cart").exists());
    assert!(!dir.file_store().path_for(DEFAULT_STORAGE_KEY).exists());
}
