use tracing::{info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::capacity::CapacityManager;
use crate::domain::{BookingReceipt, Role, Slot, SlotCreate, SlotId, UserId};
use crate::policy::{self, PolicyStore};
use crate::slot_actor::SlotError;
use crate::clients::UserClient;

/// Client for slot publication and booking.
#[derive(Clone)]
pub struct SlotClient {
    inner: ResourceClient<Slot>,
    users: UserClient,
    capacity: CapacityManager,
    policy: PolicyStore,
}

impl SlotClient {
    pub fn new(
        inner: ResourceClient<Slot>,
        users: UserClient,
        capacity: CapacityManager,
        policy: PolicyStore,
    ) -> Self {
        Self {
            inner,
            users,
            capacity,
            policy,
        }
    }

    /// Publishes a slot on behalf of `params.vendor_id`.
    #[instrument(skip(self))]
    pub async fn create_slot(&self, params: SlotCreate) -> Result<SlotId, SlotError> {
        policy::ensure_open(&self.policy)?;
        let vendor = self.users.require_user(params.vendor_id).await?;
        if vendor.role != Role::Vendor {
            warn!(user_id = vendor.id, role = %vendor.role, "Non-vendor tried to create a slot");
            return Err(SlotError::Forbidden("Only vendors can create slots".to_string()));
        }
        if !vendor.approved {
            warn!(vendor_id = vendor.id, "Unapproved vendor tried to create a slot");
            return Err(SlotError::Forbidden("Vendor not approved".to_string()));
        }
        if params.end_time <= params.start_time {
            return Err(SlotError::InvalidTiming);
        }
        policy::check_slot_duration(&self.policy.university(), params.start_time, params.end_time)?;

        let max_orders = params.max_orders;
        let slot_id = self.inner.create(params).await?;
        info!(slot_id, vendor_id = vendor.id, max_orders, "Slot created");
        Ok(slot_id)
    }

    /// Reserves one place in `slot_id` for `user_id`.
    #[instrument(skip(self))]
    pub async fn book_slot(&self, user_id: UserId, slot_id: SlotId) -> Result<BookingReceipt, SlotError> {
        policy::ensure_open(&self.policy)?;
        let user = self.users.require_user(user_id).await?;
        let slot = self.get_slot(slot_id).await?.ok_or(SlotError::NotFound(slot_id))?;
        policy::check_faculty_priority(&self.policy.faculty_priority(), slot.start_hour(), user.role)
            .inspect_err(|_| warn!(user_id, slot_id, role = %user.role, "Faculty priority window denied booking"))?;

        let booked = self.capacity.book(slot_id).await?;
        Ok(BookingReceipt::from(&booked))
    }

    pub fn capacity(&self) -> &CapacityManager {
        &self.capacity
    }
}

impl_client_methods!(SlotClient, Slot, SlotError, slot);
