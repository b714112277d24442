use crate::actor_framework::Entity;
use crate::domain::{MenuItem, MenuItemCreate, MenuItemId, MenuItemPatch};
use super::MenuError;

impl Entity for MenuItem {
    type Id = MenuItemId;
    type CreateParams = MenuItemCreate;
    type Patch = MenuItemPatch;
    type Action = ();
    type ActionResult = ();
    type Error = MenuError;

    const KIND: &'static str = "menu_item";

    fn id(&self) -> &MenuItemId {
        &self.id
    }

    /// New items start available.
    fn from_create_params(id: MenuItemId, params: MenuItemCreate) -> Result<Self, MenuError> {
        if params.price < 0 {
            return Err(MenuError::InvalidPrice(params.price));
        }
        Ok(Self {
            id,
            vendor_id: params.vendor_id,
            name: params.name,
            price: params.price,
            is_available: true,
        })
    }

    /// Price changes only affect orders placed afterwards.
    fn on_update(&mut self, patch: MenuItemPatch) -> Result<(), MenuError> {
        if let Some(price) = patch.price {
            if price < 0 {
                return Err(MenuError::InvalidPrice(price));
            }
            self.price = price;
        }
        if let Some(is_available) = patch.is_available {
            self.is_available = is_available;
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), MenuError> {
        Ok(())
    }
}
