use chrono::{Duration, Timelike, Utc};
use tracing::{error, info, Instrument};

use pickup_slots::domain::{MenuItemCreate, OrderItemRequest, Role, SlotCreate, UserCreate};
use pickup_slots::{setup_tracing, AppConfig, PickupSystem};

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = AppConfig::from_env();
    setup_tracing(&config);

    info!("Starting pickup slot demo");
    let system = PickupSystem::new(config);

    let (vendor_id, student_id) = async {
        let vendor = system
            .user_client
            .create_user(UserCreate::new("Canteen", "+910000000001", Role::Vendor))
            .await?;
        system.user_client.approve_vendor(vendor).await?;
        let student = system
            .user_client
            .create_user(UserCreate::new("Asha", "+910000000002", Role::Student))
            .await?;
        Ok::<_, pickup_slots::user_actor::UserError>((vendor, student))
    }
    .instrument(tracing::info_span!("registration"))
    .await
    .map_err(|e| e.to_string())?;

    let dosa = system
        .menu_client
        .create_menu_item(MenuItemCreate::new(vendor_id, "Masala dosa", 6_000))
        .await
        .map_err(|e| e.to_string())?;

    let start = Utc::now()
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .unwrap_or_else(Utc::now)
        + Duration::hours(1);
    let slot_id = system
        .slot_client
        .create_slot(SlotCreate {
            vendor_id,
            start_time: start,
            end_time: start + Duration::minutes(30),
            max_orders: 10,
        })
        .await
        .map_err(|e| e.to_string())?;
    info!(slot_id, "Slot published");

    let span = tracing::info_span!("order_processing");
    let placed = async {
        let placed = system
            .order_client
            .place_order(student_id, slot_id, vec![OrderItemRequest::new(dosa, 2)], Some("demo-1"))
            .await?;
        system.order_client.confirm_order(vendor_id, placed.order_id).await?;
        system.order_client.mark_ready(vendor_id, placed.order_id).await?;
        let qr = system.order_client.generate_pickup_qr(student_id, placed.order_id).await?;
        system.order_client.confirm_pickup(vendor_id, &qr).await?;
        Ok::<_, pickup_slots::order_actor::OrderError>(placed)
    }
    .instrument(span)
    .await;

    match placed {
        Ok(placed) => info!(
            order_id = placed.order_id,
            total_amount = placed.total_amount,
            load = %placed.pickup_load_label,
            "Order picked up"
        ),
        Err(e) => error!(error = %e, status = e.status_code(), "Order processing failed"),
    }

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
