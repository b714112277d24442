use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::actor_framework::ResourceClient;
use crate::app_system::Collaborators;
use crate::capacity::CapacityManager;
use crate::clients::{MenuClient, SlotClient, UserClient};
use crate::config::AppConfig;
use crate::domain::{
    Order, OrderCreate, OrderEta, OrderHistory, OrderId, OrderItemRequest, OrderLine,
    OrderPlaced, OrderStatus, Role, SlotId, User, UserId,
};
use crate::idempotency::IdempotencyStore;
use crate::insight;
use crate::notifications::{self, Notification};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError, Party};
use crate::policy;
use crate::rewards;

/// Minutes past the estimate before an order counts as delayed.
const DELAY_GRACE_MINUTES: i64 = 10;
const REORDER_WINDOW_DAYS: i64 = 7;
/// A reorder goes to the first open slot starting within this many hours.
const REORDER_LOOKAHEAD_HOURS: i64 = 2;

#[derive(Debug, Clone, Copy)]
enum Placement {
    Order,
    Reorder,
}

impl Placement {
    fn notice(self, order_id: OrderId, eta_minutes: u32) -> (&'static str, String) {
        let (title, noun) = match self {
            Placement::Order => ("Order Placed", "order"),
            Placement::Reorder => ("Reorder Placed", "reorder"),
        };
        let message =
            format!("Your {noun} #{order_id} has been placed successfully. ETA: {eta_minutes} minutes.");
        (title, message)
    }
}

/// Client for the order actor.
///
/// Runs the cross-actor order workflows on the caller's task and fires the
/// side effects that follow each status change.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    users: UserClient,
    menu: MenuClient,
    slots: SlotClient,
    capacity: CapacityManager,
    idempotency: IdempotencyStore,
    /// Per-user placement locks, taken while the daily limit is enforced.
    placing: Arc<DashMap<UserId, Arc<Mutex<()>>>>,
    collaborators: Collaborators,
    points_per_rupee: f64,
    release_slot_on_cancel: bool,
}

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        users: UserClient,
        menu: MenuClient,
        slots: SlotClient,
        collaborators: Collaborators,
        config: &AppConfig,
    ) -> Self {
        Self {
            inner,
            users,
            menu,
            capacity: slots.capacity().clone(),
            slots,
            idempotency: IdempotencyStore::new(config.idempotency_ttl),
            placing: Arc::new(DashMap::new()),
            collaborators,
            points_per_rupee: config.points_per_rupee,
            release_slot_on_cancel: config.release_slot_on_cancel,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.collaborators.clock.now()
    }

    /// Places an order against `slot_id`, taking one place in the slot.
    ///
    /// Line prices are read from the menu now and frozen on the order. A
    /// request that fails after claiming `idempotency_key` gives the key back.
    #[instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        slot_id: SlotId,
        items: Vec<OrderItemRequest>,
        idempotency_key: Option<&str>,
    ) -> Result<OrderPlaced, OrderError> {
        info!("Processing place_order request");
        self.place(user_id, slot_id, items, idempotency_key, Placement::Order).await
    }

    async fn place(
        &self,
        user_id: UserId,
        slot_id: SlotId,
        items: Vec<OrderItemRequest>,
        idempotency_key: Option<&str>,
        kind: Placement,
    ) -> Result<OrderPlaced, OrderError> {
        let policies = &self.collaborators.policy;
        policy::ensure_open(policies)?;

        let user = self.users.require_user(user_id).await?;
        let slot = self
            .slots
            .get_slot(slot_id)
            .await?
            .ok_or(OrderError::SlotNotFound(slot_id))?;

        let university = policies.university();
        // Held until the order exists, so the same user's placements count
        // each other.
        let _placing = if university.enabled {
            Some(self.placement_lock(user_id).await)
        } else {
            None
        };
        if university.enabled {
            policy::check_break_window(&university, slot.start_hour())?;
            let placed_today = self.count_orders_today(user_id).await?;
            policy::check_daily_limit(&university, placed_today)?;
        }
        policy::check_faculty_priority(&policies.faculty_priority(), slot.start_hour(), user.role)?;

        let scope = format!("order:{user_id}");
        if let Some(key) = idempotency_key {
            if !self.idempotency.claim(&scope, key) {
                warn!(user_id, key, "Duplicate order request");
                return Err(OrderError::DuplicateRequest);
            }
        }

        let placed = self.book_and_create(&user, slot.vendor_id, slot_id, &items, kind).await;
        if let (Err(e), Some(key)) = (&placed, idempotency_key) {
            info!(user_id, key, error = %e, "Order not placed, request key released");
            self.idempotency.forget(&scope, key);
        }
        placed
    }

    async fn placement_lock(&self, user_id: UserId) -> OwnedMutexGuard<()> {
        let lock = self.placing.entry(user_id).or_default().clone();
        lock.lock_owned().await
    }

    async fn book_and_create(
        &self,
        user: &User,
        vendor_id: UserId,
        slot_id: SlotId,
        items: &[OrderItemRequest],
        kind: Placement,
    ) -> Result<OrderPlaced, OrderError> {
        let lines = self.price_items(vendor_id, items).await?;
        let booked = self.capacity.book(slot_id).await?;
        let eta_minutes =
            insight::eta_minutes(booked.current_orders.into(), booked.max_orders.into());

        let params = OrderCreate {
            user_id: user.id,
            vendor_id: booked.vendor_id,
            slot_id,
            items: lines,
            eta_minutes,
            created_at: self.now(),
        };
        let order_id = match self.inner.create(params).await {
            Ok(order_id) => order_id,
            Err(e) => {
                error!(error = %e, "Order creation failed, giving the slot place back");
                if let Err(release_err) = self.capacity.release(slot_id).await {
                    warn!(error = %release_err, "Slot place could not be returned");
                }
                return Err(e.into());
            }
        };
        let order = self
            .get_order(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;
        info!(order_id, total_amount = order.total_amount, eta_minutes, "Order placed");

        let (title, message) = kind.notice(order_id, eta_minutes);
        self.notify(user, title, message);

        Ok(OrderPlaced {
            order_id,
            status: order.status,
            total_amount: order.total_amount,
            eta_minutes,
            pickup_load_label: booked.load_label(),
            express_pickup_eligible: booked.express_pickup_eligible(),
        })
    }

    /// Places a copy of one of `user_id`'s recent completed orders in the
    /// vendor's next open slot.
    #[instrument(skip(self))]
    pub async fn reorder(&self, user_id: UserId, order_id: OrderId) -> Result<OrderPlaced, OrderError> {
        let original = match self.get_order(order_id).await? {
            Some(order) if order.user_id == user_id && order.status == OrderStatus::Completed => order,
            _ => return Err(OrderError::NotEligibleForReorder(order_id)),
        };
        let now = self.now();
        if original.created_at < now - Duration::days(REORDER_WINDOW_DAYS) {
            return Err(OrderError::ReorderTooOld(order_id));
        }
        if original.items.is_empty() {
            return Err(OrderError::EmptyReorder(order_id));
        }

        let horizon = now + Duration::hours(REORDER_LOOKAHEAD_HOURS);
        let slot = self
            .slots
            .list_slots()
            .await?
            .into_iter()
            .filter(|s| s.vendor_id == original.vendor_id)
            .filter(|s| s.start_time > now && s.start_time < horizon)
            .filter(|s| s.current_orders < s.max_orders)
            .min_by_key(|s| (s.start_time, s.id))
            .ok_or(OrderError::NoSlotForReorder)?;
        info!(order_id, slot_id = slot.id, "Reordering into slot");

        let items = original
            .items
            .iter()
            .map(|line| OrderItemRequest::new(line.menu_item_id, line.quantity))
            .collect();
        self.place(user_id, slot.id, items, None, Placement::Reorder).await
    }

    async fn price_items(
        &self,
        vendor_id: UserId,
        items: &[OrderItemRequest],
    ) -> Result<Vec<OrderLine>, OrderError> {
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let menu_item = self
                .menu
                .get_menu_item(item.menu_item_id)
                .await?
                .ok_or(OrderError::MenuItemNotFound(item.menu_item_id))?;
            if !menu_item.is_available {
                return Err(OrderError::MenuItemUnavailable(menu_item.id));
            }
            if menu_item.vendor_id != vendor_id {
                return Err(OrderError::ForeignMenuItem(menu_item.id));
            }
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity(menu_item.id));
            }
            lines.push(OrderLine {
                menu_item_id: menu_item.id,
                quantity: item.quantity,
                unit_price: menu_item.price,
            });
        }
        Ok(lines)
    }

    /// Non-cancelled orders `user_id` created on the current UTC day.
    async fn count_orders_today(&self, user_id: UserId) -> Result<usize, OrderError> {
        let today = self.now().date_naive();
        let orders = self.list_orders().await?;
        Ok(orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .filter(|o| o.status != OrderStatus::Cancelled)
            .filter(|o| o.created_at.date_naive() == today)
            .count())
    }

    #[instrument(skip(self))]
    pub async fn confirm_order(&self, vendor_id: UserId, order_id: OrderId) -> Result<&'static str, OrderError> {
        self.transition(vendor_id, order_id, OrderStatus::Confirmed).await?;
        Ok("Order confirmed")
    }

    #[instrument(skip(self))]
    pub async fn mark_ready(&self, vendor_id: UserId, order_id: OrderId) -> Result<&'static str, OrderError> {
        self.transition(vendor_id, order_id, OrderStatus::ReadyForPickup).await?;
        Ok("Order marked ready for pickup")
    }

    #[instrument(skip(self))]
    pub async fn complete_order(&self, vendor_id: UserId, order_id: OrderId) -> Result<&'static str, OrderError> {
        self.transition(vendor_id, order_id, OrderStatus::Completed).await?;
        Ok("Order completed")
    }

    #[instrument(skip(self))]
    pub async fn cancel_order(&self, user_id: UserId, order_id: OrderId) -> Result<&'static str, OrderError> {
        self.transition(user_id, order_id, OrderStatus::Cancelled).await?;
        Ok("Order cancelled")
    }

    async fn transition(
        &self,
        actor_id: UserId,
        order_id: OrderId,
        target: OrderStatus,
    ) -> Result<Order, OrderError> {
        policy::ensure_open(&self.collaborators.policy)?;
        let actor = self.users.require_user(actor_id).await?;
        let order = self.get_order(order_id).await?.ok_or(OrderError::NotFound(order_id))?;
        let party = party_for(&actor, &order)?;

        let action = OrderAction::Transition { party, target, at: self.now() };
        let updated = match self.inner.perform_action(order_id, action).await? {
            OrderActionResult::Updated(order) => order,
            other => {
                return Err(OrderError::ActorCommunicationError(format!("Unexpected result: {other:?}")))
            }
        };
        info!(order_id, from = %order.status, to = %updated.status, %party, "Order status changed");

        self.after_transition(&updated).await;
        Ok(updated)
    }

    /// Side effects of a committed status change. None of these can fail
    /// the transition.
    async fn after_transition(&self, order: &Order) {
        match order.status {
            OrderStatus::Completed => {
                let entries = rewards::completion_rewards(
                    order,
                    self.points_per_rupee,
                    &self.collaborators.policy.offpeak_rewards(),
                    self.now(),
                );
                rewards::accrue(self.collaborators.ledger.as_ref(), entries);
            }
            OrderStatus::Cancelled if self.release_slot_on_cancel => {
                if let Err(e) = self.capacity.release(order.slot_id).await {
                    warn!(order_id = order.id, slot_id = order.slot_id, error = %e, "Slot place not released");
                }
            }
            _ => {}
        }

        let Some((title, message)) = status_message(order) else {
            return;
        };
        match self.users.get_user(order.user_id).await {
            Ok(Some(customer)) => self.notify(&customer, title, message),
            Ok(None) => warn!(user_id = order.user_id, "Customer missing, notification skipped"),
            Err(e) => warn!(user_id = order.user_id, error = %e, "Customer lookup failed, notification skipped"),
        }
    }

    fn notify(&self, user: &User, title: &str, message: String) {
        notifications::dispatch(
            self.collaborators.notifier.clone(),
            Notification {
                user_id: user.id,
                phone: user.phone.clone(),
                title: title.to_string(),
                message,
            },
        );
    }

    /// Returns the order's pickup code, issuing one on first request.
    #[instrument(skip(self))]
    pub async fn generate_pickup_qr(&self, user_id: UserId, order_id: OrderId) -> Result<String, OrderError> {
        policy::ensure_open(&self.collaborators.policy)?;
        self.owned_order(user_id, order_id).await?;

        let action = OrderAction::IssueQr { code: Uuid::new_v4().to_string() };
        match self.inner.perform_action(order_id, action).await? {
            OrderActionResult::QrCode(code) => Ok(code),
            other => Err(OrderError::ActorCommunicationError(format!("Unexpected result: {other:?}"))),
        }
    }

    /// Completes the order carrying `qr_code` once its vendor scans it.
    #[instrument(skip(self, qr_code))]
    pub async fn confirm_pickup(&self, vendor_id: UserId, qr_code: &str) -> Result<Order, OrderError> {
        policy::ensure_open(&self.collaborators.policy)?;
        let order = self
            .list_orders()
            .await?
            .into_iter()
            .find(|o| o.qr_code.as_deref() == Some(qr_code))
            .ok_or(OrderError::InvalidQrCode)?;
        if order.vendor_id != vendor_id {
            warn!(order_id = order.id, vendor_id, "Pickup scanned by another vendor");
            return Err(OrderError::InvalidQrCode);
        }

        let action = OrderAction::ConfirmPickup { vendor_id, at: self.now() };
        let completed = match self.inner.perform_action(order.id, action).await {
            Ok(OrderActionResult::Updated(order)) => order,
            Ok(other) => {
                return Err(OrderError::ActorCommunicationError(format!("Unexpected result: {other:?}")))
            }
            Err(e) => {
                return Err(match OrderError::from(e) {
                    OrderError::NotReadyForPickup(_) | OrderError::InvalidTransition(_) => {
                        OrderError::InvalidQrCode
                    }
                    other => other,
                })
            }
        };
        info!(order_id = completed.id, vendor_id, "Pickup confirmed");

        self.after_transition(&completed).await;
        Ok(completed)
    }

    /// Status history of one of `user_id`'s orders, oldest first.
    #[instrument(skip(self))]
    pub async fn order_timeline(&self, user_id: UserId, order_id: OrderId) -> Result<Vec<OrderHistory>, OrderError> {
        let order = self.owned_order(user_id, order_id).await?;
        Ok(order.history)
    }

    #[instrument(skip(self))]
    pub async fn order_eta(&self, user_id: UserId, order_id: OrderId) -> Result<OrderEta, OrderError> {
        let order = self.owned_order(user_id, order_id).await?;
        if order.status == OrderStatus::Cancelled {
            return Err(OrderError::Cancelled(order_id));
        }

        let estimated_ready_at = order.created_at + Duration::minutes(i64::from(order.eta_minutes));
        let now = self.now();
        let is_delayed = now > estimated_ready_at + Duration::minutes(DELAY_GRACE_MINUTES);
        let delay_minutes = if is_delayed { (now - estimated_ready_at).num_minutes() } else { 0 };

        let (pickup_load_label, express_pickup_eligible) = match self.slots.get_slot(order.slot_id).await? {
            Some(slot) => (slot.load_label(), slot.express_pickup_eligible()),
            None => (insight::LoadLabel::Low, false),
        };

        Ok(OrderEta {
            order_id,
            status: order.status,
            estimated_ready_at,
            is_delayed,
            delay_minutes,
            pickup_load_label,
            express_pickup_eligible,
        })
    }

    /// `user_id`'s orders, newest first.
    pub async fn user_orders(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        self.orders_where(|o| o.user_id == user_id).await
    }

    /// Orders against `vendor_id`'s slots, newest first.
    pub async fn vendor_orders(&self, vendor_id: UserId) -> Result<Vec<Order>, OrderError> {
        self.orders_where(|o| o.vendor_id == vendor_id).await
    }

    async fn orders_where(&self, keep: impl Fn(&Order) -> bool) -> Result<Vec<Order>, OrderError> {
        let mut orders: Vec<_> = self.list_orders().await?.into_iter().filter(|o| keep(o)).collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    /// Someone else's order reads as missing.
    async fn owned_order(&self, user_id: UserId, order_id: OrderId) -> Result<Order, OrderError> {
        match self.get_order(order_id).await? {
            Some(order) if order.user_id == user_id => Ok(order),
            _ => Err(OrderError::NotFound(order_id)),
        }
    }
}

impl_client_methods!(OrderClient, Order, OrderError, order);

/// Vendors act on orders against their own slots; everyone else only on
/// orders they placed.
fn party_for(actor: &User, order: &Order) -> Result<Party, OrderError> {
    if actor.role == Role::Vendor {
        if order.vendor_id != actor.id {
            return Err(OrderError::Forbidden("Order belongs to another vendor".to_string()));
        }
        return Ok(Party::Vendor);
    }
    if order.user_id != actor.id {
        return Err(OrderError::NotFound(order.id));
    }
    Ok(Party::Customer)
}

fn status_message(order: &Order) -> Option<(&'static str, String)> {
    let id = order.id;
    match order.status {
        OrderStatus::Pending => None,
        OrderStatus::Confirmed => Some(("Order Confirmed", format!("Your order #{id} has been confirmed."))),
        OrderStatus::ReadyForPickup => Some(("Order Ready", format!("Your order #{id} is ready for pickup."))),
        OrderStatus::Completed => Some(("Order Completed", format!("Your order #{id} has been completed."))),
        OrderStatus::Cancelled => Some(("Order Cancelled", format!("Your order #{id} has been cancelled."))),
    }
}
