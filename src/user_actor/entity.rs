use crate::actor_framework::Entity;
use crate::domain::{User, UserCreate, UserId, UserPatch};
use super::UserError;

fn validate_phone(phone: &str) -> Result<(), UserError> {
    if phone.trim().is_empty() {
        return Err(UserError::ValidationError("Phone number required".to_string()));
    }
    Ok(())
}

impl Entity for User {
    type Id = UserId;
    type CreateParams = UserCreate;
    type Patch = UserPatch;
    type Action = ();
    type ActionResult = ();
    type Error = UserError;

    const KIND: &'static str = "user";

    fn id(&self) -> &UserId {
        &self.id
    }

    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, UserError> {
        validate_phone(&params.phone)?;
        Ok(Self {
            id,
            name: params.name,
            phone: params.phone,
            role: params.role,
            approved: params.approved,
        })
    }

    /// Updates name, phone or approval. Roles are fixed at registration.
    fn on_update(&mut self, patch: UserPatch) -> Result<(), UserError> {
        if let Some(approved) = patch.approved {
            self.approved = approved;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(phone) = patch.phone {
            validate_phone(&phone)?;
            self.phone = phone;
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), UserError> {
        Ok(())
    }
}
