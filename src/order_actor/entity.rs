use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderId, OrderLine, OrderStatus};
use super::actions::{OrderAction, OrderActionResult};
use super::transitions;
use super::OrderError;

impl Entity for Order {
    type Id = OrderId;
    type CreateParams = OrderCreate;
    type Patch = ();
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Error = OrderError;

    const KIND: &'static str = "order";

    fn id(&self) -> &OrderId {
        &self.id
    }

    /// Creates a PENDING order; the total is fixed from the captured line prices.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        Ok(Self {
            id,
            user_id: params.user_id,
            vendor_id: params.vendor_id,
            slot_id: params.slot_id,
            status: OrderStatus::Pending,
            total_amount: OrderLine::total(&params.items),
            items: params.items,
            eta_minutes: params.eta_minutes,
            created_at: params.created_at,
            qr_code: None,
            pickup_confirmed_at: None,
            pickup_confirmed_by: None,
            history: Vec::new(),
        })
    }

    /// Orders only change through actions.
    fn on_update(&mut self, _patch: ()) -> Result<(), OrderError> {
        Ok(())
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::Transition { party, target, at } => {
                transitions::check(party, self.status, target)?;
                self.record(target, at);
                Ok(OrderActionResult::Updated(self.clone()))
            }
            OrderAction::IssueQr { code } => {
                if self.status != OrderStatus::ReadyForPickup {
                    return Err(OrderError::NotReadyForPickup(self.id));
                }
                let code = self.qr_code.get_or_insert(code).clone();
                Ok(OrderActionResult::QrCode(code))
            }
            OrderAction::ConfirmPickup { vendor_id, at } => {
                transitions::check_pickup(self.id, self.status)?;
                self.record(OrderStatus::Completed, at);
                self.pickup_confirmed_at = Some(at);
                self.pickup_confirmed_by = Some(vendor_id);
                Ok(OrderActionResult::Updated(self.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_actor::Party;
    use chrono::{TimeZone, Utc};

    fn pending_order() -> Order {
        let created_at = Utc.with_ymd_and_hms(2026, 3, 2, 12, 5, 0).unwrap();
        Order::from_create_params(
            1,
            OrderCreate {
                user_id: 10,
                vendor_id: 20,
                slot_id: 30,
                items: vec![OrderLine { menu_item_id: 1, quantity: 2, unit_price: 5_000 }],
                eta_minutes: 15,
                created_at,
            },
        )
        .unwrap()
    }

    fn transition(order: &mut Order, party: Party, target: OrderStatus) -> Result<OrderActionResult, OrderError> {
        order.handle_action(OrderAction::Transition { party, target, at: Utc::now() })
    }

    #[test]
    fn test_each_transition_appends_one_history_row() {
        let mut order = pending_order();
        assert_eq!(order.total_amount, 10_000);
        assert!(order.history.is_empty());

        transition(&mut order, Party::Vendor, OrderStatus::Confirmed).unwrap();
        transition(&mut order, Party::Vendor, OrderStatus::Completed).unwrap();
        let statuses: Vec<_> = order.history.iter().map(|h| h.status).collect();
        assert_eq!(statuses, vec![OrderStatus::Confirmed, OrderStatus::Completed]);

        // Rejected transitions leave no trace.
        assert!(transition(&mut order, Party::Customer, OrderStatus::Cancelled).is_err());
        assert_eq!(order.history.len(), 2);
        assert_eq!(order.status, OrderStatus::Completed);
    }

    #[test]
    fn test_qr_is_issued_once() {
        let mut order = pending_order();
        assert!(matches!(
            order.handle_action(OrderAction::IssueQr { code: "a".into() }),
            Err(OrderError::NotReadyForPickup(1))
        ));

        transition(&mut order, Party::Vendor, OrderStatus::Confirmed).unwrap();
        transition(&mut order, Party::Vendor, OrderStatus::ReadyForPickup).unwrap();
        let first = order.handle_action(OrderAction::IssueQr { code: "a".into() }).unwrap();
        let second = order.handle_action(OrderAction::IssueQr { code: "b".into() }).unwrap();
        assert!(matches!((first, second), (OrderActionResult::QrCode(a), OrderActionResult::QrCode(b)) if a == "a" && b == "a"));
    }

    #[test]
    fn test_pickup_confirmation_completes() {
        let mut order = pending_order();
        transition(&mut order, Party::Vendor, OrderStatus::Confirmed).unwrap();
        assert!(order
            .handle_action(OrderAction::ConfirmPickup { vendor_id: 20, at: Utc::now() })
            .is_err());

        transition(&mut order, Party::Vendor, OrderStatus::ReadyForPickup).unwrap();
        assert!(matches!(
            transition(&mut order, Party::Vendor, OrderStatus::Completed),
            Err(OrderError::InvalidTransition("Order must be confirmed before completion"))
        ));
        order
            .handle_action(OrderAction::ConfirmPickup { vendor_id: 20, at: Utc::now() })
            .unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.pickup_confirmed_by, Some(20));
        assert_eq!(order.history.len(), 3);
    }
}
