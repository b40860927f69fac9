//! Cart commands.
//!
//! Each command opens the file-backed cart described by the configuration,
//! applies one operation, and exits. The store is restored before any
//! mutation so existing lines are kept.

use std::fmt::Write;

use go_marketplace_cart::storage::{FileStore, KeyValueStore};
use go_marketplace_cart::{CartConfig, CartProvider};
use go_marketplace_core::{CartItem, Price, ProductId};
use tracing::info;

use super::CommandError;

/// Print the cart.
pub async fn show(config: &CartConfig, json: bool) -> Result<(), CommandError> {
    let provider = CartProvider::from_config(config).await?;
    let products = provider.handle().products();

    let output = if json {
        serde_json::to_string_pretty(&*products)?
    } else {
        render_table(&products)
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}

/// Add a product as a new line.
pub async fn add(
    config: &CartConfig,
    id: &str,
    title: String,
    image_url: String,
    price: &str,
) -> Result<(), CommandError> {
    let id = ProductId::parse(id)?;
    let price = Price::parse(price)?;

    let provider = CartProvider::from_config(config).await?;
    let cart = provider.handle();
    cart.add_to_cart(CartItem::new(id.clone(), title, image_url, price))
        .await?;

    info!(%id, items = cart.products().len(), "Added to cart");
    provider.close().await;
    Ok(())
}

/// Add one unit to every line for `id`.
pub async fn increment(config: &CartConfig, id: &str) -> Result<(), CommandError> {
    let id = ProductId::parse(id)?;
    let provider = CartProvider::from_config(config).await?;
    provider.handle().increment(&id).await?;

    log_quantity(&provider, &id);
    provider.close().await;
    Ok(())
}

/// Remove one unit from every line for `id`.
pub async fn decrement(config: &CartConfig, id: &str) -> Result<(), CommandError> {
    let id = ProductId::parse(id)?;
    let provider = CartProvider::from_config(config).await?;
    provider.handle().decrement(&id).await?;

    log_quantity(&provider, &id);
    provider.close().await;
    Ok(())
}

/// Delete the persisted cart.
pub async fn clear(config: &CartConfig) -> Result<(), CommandError> {
    let store = FileStore::new(config.storage_dir.clone());
    store.remove(&config.storage_key).await?;
    info!(key = %config.storage_key, "Cart cleared");
    Ok(())
}

fn log_quantity(provider: &CartProvider, id: &ProductId) {
    let products = provider.handle().products();
    let mut matching = products.iter().filter(|item| item.is(id)).peekable();
    if matching.peek().is_none() {
        tracing::warn!(%id, "No cart line for product");
    }
    for item in matching {
        info!(%id, quantity = item.quantity.get(), "Updated quantity");
    }
}

/// Render cart lines as a fixed-width table.
fn render_table(products: &[CartItem]) -> String {
    if products.is_empty() {
        return "Cart is empty".to_string();
    }

    let id_width = products
        .iter()
        .map(|item| item.id.as_str().len())
        .max()
        .unwrap_or(0)
        .max("ID".len());
    let title_width = products
        .iter()
        .map(|item| item.title.len())
        .max()
        .unwrap_or(0)
        .max("TITLE".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<id_width$}  {:<title_width$}  {:>10}  QTY", "ID", "TITLE", "PRICE");
    for item in products {
        let _ = writeln!(
            out,
            "{:<id_width$}  {:<title_width$}  {:>10}  {}",
            item.id.as_str(),
            item.title,
            item.price.to_string(),
            item.quantity
        );
    }
    let _ = write!(out, "{} line(s)", products.len());
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use go_marketplace_core::Quantity;

    use super::*;

    #[test]
    fn test_render_empty() {
        assert_eq!(render_table(&[]), "Cart is empty");
    }

    #[test]
    fn test_render_table() {
        let products = vec![
            CartItem::new("a", "Coffee", "u", Price::from_cents(1050)),
            CartItem::new("bb", "Tea", "u", 3).with_quantity(Quantity::new(2).unwrap()),
        ];

        let table = render_table(&products);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID  TITLE "));
        assert!(lines[1].starts_with("a   Coffee"));
        assert!(lines[1].contains("$10.50"));
        assert!(lines[2].ends_with("  2"));
        assert_eq!(lines[3], "2 line(s)");
    }
}
