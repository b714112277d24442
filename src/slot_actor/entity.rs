use crate::actor_framework::Entity;
use crate::domain::{Slot, SlotCreate, SlotId, SlotPatch, SlotStatus};
use super::SlotError;

impl Entity for Slot {
    type Id = SlotId;
    type CreateParams = SlotCreate;
    type Patch = SlotPatch;
    type Action = ();
    type ActionResult = ();
    type Error = SlotError;

    const KIND: &'static str = "slot";

    fn id(&self) -> &SlotId {
        &self.id
    }

    /// Creates an empty slot. A zero-capacity slot starts out FULL.
    fn from_create_params(id: SlotId, params: SlotCreate) -> Result<Self, SlotError> {
        if params.end_time <= params.start_time {
            return Err(SlotError::InvalidTiming);
        }
        Ok(Self {
            id,
            vendor_id: params.vendor_id,
            start_time: params.start_time,
            end_time: params.end_time,
            max_orders: params.max_orders,
            current_orders: 0,
            status: SlotStatus::derive(0, params.max_orders),
        })
    }

    /// Writes occupancy and re-derives the status from it.
    fn on_update(&mut self, patch: SlotPatch) -> Result<(), SlotError> {
        if patch.current_orders > self.max_orders {
            return Err(SlotError::OverCapacity {
                current: patch.current_orders,
                max: self.max_orders,
            });
        }
        self.current_orders = patch.current_orders;
        self.status = SlotStatus::derive(self.current_orders, self.max_orders);
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), SlotError> {
        Ok(())
    }
}
