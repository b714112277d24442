use serde::Serialize;

use super::UserId;

pub type MenuItemId = u64;

/// A vendor's menu entry. `price` is in paise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub vendor_id: UserId,
    pub name: String,
    pub price: i64,
    pub is_available: bool,
}

#[derive(Debug, Clone)]
pub struct MenuItemCreate {
    pub vendor_id: UserId,
    pub name: String,
    pub price: i64,
}

#[derive(Debug, Clone, Default)]
pub struct MenuItemPatch {
    pub price: Option<i64>,
    pub is_available: Option<bool>,
}

impl MenuItemCreate {
    pub fn new(vendor_id: UserId, name: impl Into<String>, price: i64) -> Self {
        Self {
            vendor_id,
            name: name.into(),
            price,
        }
    }
}
