//! Access control: admin membership, first-user bootstrap, and /add_admin.

use bcast_core::{CommandError, Result};
use tracing::{info, warn};

use crate::state::Engine;

impl Engine {
    /// String-normalizes the id and checks membership in the admin list.
    pub async fn is_admin(&self, user_id: i64) -> bool {
        let id = user_id.to_string();
        self.state.lock().await.admins.iter().any(|a| a == &id)
    }

    /// Gate for admin-only operations; every gated handler calls this first.
    pub(crate) async fn require_admin(&self, user_id: i64) -> Result<()> {
        if self.is_admin(user_id).await {
            Ok(())
        } else {
            warn!(user_id, "Unauthorized command attempt");
            Err(CommandError::PermissionDenied.into())
        }
    }

    pub(crate) async fn cmd_add_admin(
        &self,
        requester_id: i64,
        arg: Option<&str>,
    ) -> Result<Option<String>> {
        self.require_admin(requester_id).await?;
        let new_id = arg.ok_or_else(|| {
            CommandError::InvalidArgument("Usage: /add_admin <user_id>".to_string())
        })?;

        let mut state = self.state.lock().await;
        if state.admins.iter().any(|a| a == new_id) {
            return Ok(Some("That user is already an admin.".to_string()));
        }
        state.admins.push(new_id.to_string());
        self.persist_admins(&state.admins);
        info!(new_admin = %new_id, added_by = requester_id, "Added admin");
        Ok(Some(format!("User {} added as an admin.", new_id)))
    }
}
