use std::sync::Arc;

use async_trait::async_trait;

use crate::mediator::{CancellationSignal, DispatcherBuilder, RequestHandler};
use crate::models::{Order, OrderId, OrdersVm};
use crate::notification::BestEffortNotifier;
use crate::repository::OrderRepository;

use super::commands::{CheckoutOrder, DeleteOrder, UpdateOrder};
use super::errors::OrderingError;
use super::mapper::merge_update;
use super::queries::GetOrdersList;
use super::validation::Validate;

// ============================================================================
// Order Handlers
// ============================================================================
//
// Orchestrates: Command → Validate → Map → Repository (→ Notify)
//
// Handlers hold only shared, immutable collaborators. Every failure that
// can be decided locally (validation, not found, cancellation) is returned
// before the first write.
//
// ============================================================================

const ORDER_ENTITY: &str = "Order";

/// Register every order handler on `builder`.
pub fn register_order_handlers(
    builder: DispatcherBuilder,
    repository: Arc<dyn OrderRepository>,
    notifier: BestEffortNotifier,
) -> DispatcherBuilder {
    builder
        .register::<CheckoutOrder, _>(CheckoutOrderHandler::new(repository.clone(), notifier))
        .register::<UpdateOrder, _>(UpdateOrderHandler::new(repository.clone()))
        .register::<DeleteOrder, _>(DeleteOrderHandler::new(repository.clone()))
        .register::<GetOrdersList, _>(GetOrdersListHandler::new(repository))
}

async fn find_order(
    repository: &dyn OrderRepository,
    id: OrderId,
    cancel: &CancellationSignal,
) -> Result<Order, OrderingError> {
    let found = cancel
        .run(async { repository.get_by_id(id).await.map_err(OrderingError::from) })
        .await?;

    found.ok_or_else(|| {
        tracing::warn!(order_id = id, "Order does not exist in storage");
        OrderingError::not_found(ORDER_ENTITY, id)
    })
}

// ----------------------------------------------------------------------------
// Checkout
// ----------------------------------------------------------------------------

pub struct CheckoutOrderHandler {
    repository: Arc<dyn OrderRepository>,
    notifier: BestEffortNotifier,
}

impl CheckoutOrderHandler {
    pub fn new(repository: Arc<dyn OrderRepository>, notifier: BestEffortNotifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }
}

#[async_trait]
impl RequestHandler<CheckoutOrder> for CheckoutOrderHandler {
    async fn handle(
        &self,
        command: CheckoutOrder,
        cancel: &CancellationSignal,
    ) -> Result<OrderId, OrderingError> {
        command.validate().into_result()?;

        let order = Order::from(command);
        cancel.ensure_active()?;
        let created = self.repository.add(order).await?;

        tracing::info!(order_id = created.id, user_name = %created.user_name, "Order is successfully created");

        // Persistence decided the outcome; the notifier cannot change it
        let email = self.notifier.order_created_email(&created);
        self.notifier.send_best_effort(created.id, email).await;

        Ok(created.id)
    }
}

// ----------------------------------------------------------------------------
// Update
// ----------------------------------------------------------------------------

pub struct UpdateOrderHandler {
    repository: Arc<dyn OrderRepository>,
}

impl UpdateOrderHandler {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl RequestHandler<UpdateOrder> for UpdateOrderHandler {
    async fn handle(&self, command: UpdateOrder, cancel: &CancellationSignal) -> Result<(), OrderingError> {
        command.validate().into_result()?;

        let mut order = find_order(self.repository.as_ref(), command.id, cancel).await?;
        merge_update(&mut order, command);

        cancel.ensure_active()?;
        let id = order.id;
        self.repository.update(order).await?;

        tracing::info!(order_id = id, "Order is successfully updated");
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Delete
// ----------------------------------------------------------------------------

pub struct DeleteOrderHandler {
    repository: Arc<dyn OrderRepository>,
}

impl DeleteOrderHandler {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl RequestHandler<DeleteOrder> for DeleteOrderHandler {
    async fn handle(&self, command: DeleteOrder, cancel: &CancellationSignal) -> Result<(), OrderingError> {
        let order = find_order(self.repository.as_ref(), command.id, cancel).await?;

        cancel.ensure_active()?;
        self.repository.delete(order).await?;

        tracing::info!(order_id = command.id, "Order is successfully deleted");
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// List
// ----------------------------------------------------------------------------

pub struct GetOrdersListHandler {
    repository: Arc<dyn OrderRepository>,
}

impl GetOrdersListHandler {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl RequestHandler<GetOrdersList> for GetOrdersListHandler {
    async fn handle(
        &self,
        query: GetOrdersList,
        cancel: &CancellationSignal,
    ) -> Result<Vec<OrdersVm>, OrderingError> {
        let orders = cancel
            .run(async {
                self.repository
                    .list_by_user_name(&query.user_name)
                    .await
                    .map_err(OrderingError::from)
            })
            .await?;

        tracing::debug!(user_name = %query.user_name, count = orders.len(), "Orders listed");
        Ok(orders.iter().map(OrdersVm::from).collect())
    }
}
