use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Role, User, UserCreate, UserId, UserPatch};
use crate::user_actor::UserError;

/// Client for interacting with the User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl_basic_client!(UserClient, User, UserError, user);

impl UserClient {
    #[instrument(skip(self))]
    pub async fn create_user(&self, params: UserCreate) -> Result<UserId, UserError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(UserError::from)
    }

    #[instrument(skip(self))]
    pub async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(UserError::from)
    }

    /// Lets a vendor publish slots. Anyone who is not a vendor reads as
    /// missing.
    #[instrument(skip(self))]
    pub async fn approve_vendor(&self, id: UserId) -> Result<User, UserError> {
        let user = self.require_user(id).await?;
        if user.role != Role::Vendor {
            return Err(UserError::NotFound(id));
        }
        let patch = UserPatch { approved: Some(true), ..Default::default() };
        let approved = self.update_user(id, patch).await?;
        info!(vendor_id = id, "Vendor approved");
        Ok(approved)
    }

    /// Like `get_user`, but a missing account is an error.
    pub async fn require_user(&self, id: UserId) -> Result<User, UserError> {
        self.get_user(id).await?.ok_or(UserError::NotFound(id))
    }
}
