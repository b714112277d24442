use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{MenuItem, MenuItemCreate, MenuItemId, MenuItemPatch};
use crate::menu_actor::MenuError;

/// Client for interacting with the menu actor.
#[derive(Clone)]
pub struct MenuClient {
    inner: ResourceClient<MenuItem>,
}

impl_basic_client!(MenuClient, MenuItem, MenuError, menu_item);

impl MenuClient {
    #[instrument(skip(self))]
    pub async fn create_menu_item(&self, params: MenuItemCreate) -> Result<MenuItemId, MenuError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(MenuError::from)
    }

    /// New prices apply to orders placed afterwards only.
    #[instrument(skip(self))]
    pub async fn update_menu_item(
        &self,
        id: MenuItemId,
        patch: MenuItemPatch,
    ) -> Result<MenuItem, MenuError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(MenuError::from)
    }
}
