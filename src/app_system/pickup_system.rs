use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::Collaborators;
use crate::actor_framework::ResourceActor;
use crate::capacity::CapacityManager;
use crate::clients::{MenuClient, OrderClient, SlotClient, UserClient};
use crate::config::AppConfig;
use crate::domain::{MenuItem, Order, Slot, User};
use crate::lock::SlotLocks;
use crate::policy::PolicyStore;

/// The main application system that orchestrates all actors.
///
/// Starts one resource actor per entity kind, wires the clients to each other
/// and to the shared collaborators, and stops everything on shutdown.
pub struct PickupSystem {
    pub user_client: UserClient,
    pub menu_client: MenuClient,
    pub slot_client: SlotClient,
    pub order_client: OrderClient,
    pub policy: PolicyStore,
    handles: Vec<JoinHandle<()>>,
}

fn sequential_ids() -> impl Fn() -> u64 + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || counter.fetch_add(1, Ordering::SeqCst)
}

impl PickupSystem {
    pub fn new(config: AppConfig) -> Self {
        Self::with_collaborators(config, Collaborators::in_memory())
    }

    pub fn with_collaborators(config: AppConfig, collaborators: Collaborators) -> Self {
        let buffer = config.actor_buffer_size;

        let (user_actor, user_resource_client) = ResourceActor::<User>::new(buffer, sequential_ids());
        let user_client = UserClient::new(user_resource_client);
        let user_handle = tokio::spawn(user_actor.run());

        let (menu_actor, menu_resource_client) = ResourceActor::<MenuItem>::new(buffer, sequential_ids());
        let menu_client = MenuClient::new(menu_resource_client);
        let menu_handle = tokio::spawn(menu_actor.run());

        let (slot_actor, slot_resource_client) = ResourceActor::<Slot>::new(buffer, sequential_ids());
        let capacity = CapacityManager::new(
            slot_resource_client.clone(),
            SlotLocks::new(),
            config.slot_lock_ttl,
        );
        let slot_client = SlotClient::new(
            slot_resource_client,
            user_client.clone(),
            capacity,
            collaborators.policy.clone(),
        );
        let slot_handle = tokio::spawn(slot_actor.run());

        let (order_actor, order_resource_client) = ResourceActor::<Order>::new(buffer, sequential_ids());
        let order_client = OrderClient::new(
            order_resource_client,
            user_client.clone(),
            menu_client.clone(),
            slot_client.clone(),
            collaborators.clone(),
            &config,
        );
        let order_handle = tokio::spawn(order_actor.run());

        info!(actor_buffer_size = buffer, "Pickup system started");

        Self {
            user_client,
            menu_client,
            slot_client,
            order_client,
            policy: collaborators.policy,
            handles: vec![user_handle, menu_handle, slot_handle, order_handle],
        }
    }

    /// Stops the actors in dependency order (orders first) and waits for them.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        let stops = [
            self.order_client.shutdown().await.map_err(|e| e.to_string()),
            self.slot_client.shutdown().await.map_err(|e| e.to_string()),
            self.menu_client.shutdown().await.map_err(|e| e.to_string()),
            self.user_client.shutdown().await.map_err(|e| e.to_string()),
        ];
        for stop in stops {
            if let Err(e) = stop {
                error!(error = %e, "Actor already stopped");
            }
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
