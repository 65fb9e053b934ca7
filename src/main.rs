use std::sync::Arc;

use anyhow::Context;
use rust_decimal::Decimal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ordering_pipeline::config::PipelineConfig;
use ordering_pipeline::domain::discount::{Coupon, CouponRepository, InMemoryCouponRepository};
use ordering_pipeline::domain::order::{
    register_order_handlers, CheckoutOrder, DeleteOrder, GetOrdersList, UpdateOrder,
};
use ordering_pipeline::health::HealthCheckable;
use ordering_pipeline::mediator::{Dispatcher, RequestKind};
use ordering_pipeline::metrics::{self, Metrics};
use ordering_pipeline::notification::{BestEffortNotifier, LoggingEmailService};
use ordering_pipeline::repository::{InMemoryOrderRepository, OrderRepository};

fn checkout(user_name: &str, email_address: &str, total_price: Decimal) -> CheckoutOrder {
    CheckoutOrder {
        user_name: user_name.to_string(),
        total_price,
        first_name: "Mehmet".to_string(),
        last_name: "Ozkaya".to_string(),
        email_address: email_address.to_string(),
        address_line: "Bahcelievler".to_string(),
        country: "Turkey".to_string(),
        state: "Istanbul".to_string(),
        zip_code: "34000".to_string(),
        card_name: "Mehmet Ozkaya".to_string(),
        card_number: "5555444433332222".to_string(),
        expiration: "12/28".to_string(),
        cvv: "123".to_string(),
        payment_method: 1,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PipelineConfig::from_env().context("invalid ORDERING_* configuration")?;

    // Structured logging; RUST_LOG wins over ORDERING_LOG
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!("🚀 Starting ordering pipeline demo");
    tracing::debug!(?config, "Loaded configuration");

    // === 1. Initialize Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 2. Wire repository, mail transport and notifier ===
    let repository = Arc::new(InMemoryOrderRepository::new());
    let notifier = BestEffortNotifier::new(
        Arc::new(LoggingEmailService),
        config.notification.clone(),
    )
    .with_metrics(metrics.clone());

    // Metrics + health HTTP server on its own actix system
    if let Some(port) = config.metrics_port {
        let registry = Arc::new(metrics.registry().clone());
        let health_sources: metrics::HealthSources =
            Arc::new(vec![Arc::new(notifier.clone()) as Arc<dyn HealthCheckable>]);
        std::thread::spawn(move || {
            let system = actix_web::rt::System::new();
            if let Err(e) = system.block_on(metrics::start_metrics_server(registry, health_sources, port)) {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    }

    // === 3. Build the dispatcher ===
    let dispatcher = Arc::new(
        register_order_handlers(
            Dispatcher::builder().with_metrics(metrics.clone()),
            repository.clone(),
            notifier.clone(),
        )
        .build(),
    );
    for kind in [
        RequestKind::CheckoutOrder,
        RequestKind::UpdateOrder,
        RequestKind::DeleteOrder,
        RequestKind::GetOrdersList,
    ] {
        if !dispatcher.is_registered(kind) {
            anyhow::bail!("no handler registered for {}", kind);
        }
    }

    // === 4. Checkout ===
    tracing::info!("📝 Checking out an order");
    let order_id = dispatcher
        .send(checkout("swn", "ezozkme@gmail.com", Decimal::new(35000, 2)))
        .await?;
    tracing::info!("✅ Order created: {}", order_id);

    match dispatcher.send(checkout("", "", Decimal::ZERO)).await {
        Ok(id) => tracing::warn!(order_id = id, "Invalid checkout was accepted"),
        Err(e) => tracing::info!(reason = e.kind(), "❌ Invalid checkout rejected: {}", e),
    }

    // === 5. Concurrent checkouts ===
    let tasks: Vec<_> = (1..=5)
        .map(|i| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher
                    .send(checkout("swn", "ezozkme@gmail.com", Decimal::new(1000 * i, 2)))
                    .await
            })
        })
        .collect();
    for joined in futures_util::future::join_all(tasks).await {
        match joined? {
            Ok(id) => tracing::info!("✅ Concurrent order created: {}", id),
            Err(e) => tracing::error!("Concurrent checkout failed: {}", e),
        }
    }

    // === 6. List ===
    let orders = dispatcher.send(GetOrdersList::new("swn")).await?;
    tracing::info!("📋 {} orders for swn", orders.len());
    for order in &orders {
        tracing::info!(order_id = order.id, total_price = %order.total_price, "Order");
    }

    // === 7. Update ===
    dispatcher
        .send(
            UpdateOrder::new(order_id)
                .with_total_price(Decimal::new(42000, 2))
                .with_address_line("Kadikoy"),
        )
        .await?;
    if let Some(updated) = repository.get_by_id(order_id).await? {
        tracing::info!(
            order_id,
            total_price = %updated.total_price,
            address_line = %updated.address_line,
            "✅ Order updated"
        );
    }

    if let Err(e) = dispatcher.send(UpdateOrder::new(9_999).with_user_name("ghost")).await {
        tracing::info!(reason = e.kind(), "❌ Update rejected: {}", e);
    }

    // === 8. Delete ===
    dispatcher.send(DeleteOrder { id: order_id }).await?;
    tracing::info!("✅ Order deleted: {}", order_id);

    if let Err(e) = dispatcher.send(DeleteOrder { id: order_id }).await {
        tracing::info!(reason = e.kind(), "❌ Second delete rejected: {}", e);
    }

    // === 9. Coupon lookup ===
    let coupons = InMemoryCouponRepository::new();
    coupons
        .create_discount(Coupon::new("IPhone X", "IPhone Discount", 150))
        .await?;
    for product in ["IPhone X", "Huawei Plus"] {
        let coupon = coupons.get_discount(product).await?;
        tracing::info!(
            product,
            coupon = %coupon.product_name,
            amount = coupon.amount,
            "🏷️ Discount lookup"
        );
    }

    for failed in notifier.dead_letters().recent(10).await {
        tracing::warn!(
            dead_letter_id = %failed.id,
            order_id = failed.order_id,
            error_kind = failed.error_kind,
            "📭 Undelivered notification"
        );
    }

    let stats = notifier.dead_letters().stats().await;
    tracing::info!(
        dead_letters = stats.total_recorded,
        circuit = notifier.circuit_state().as_str(),
        "🎉 Demo complete!"
    );

    Ok(())
}
