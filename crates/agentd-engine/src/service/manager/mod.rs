//! State-transition managers.
//!
//! Each manager owns one workflow and takes its collaborators (AMI client,
//! stores, queue log, publisher) as explicit fields; there is no ambient
//! state. Workflows share a fixed step order: validate preconditions before
//! any side effect, command the telephony server, persist, record to the
//! queue log, publish. A failed step aborts the steps after it.

pub mod add_member;
pub mod login;
pub mod logoff;
pub mod pause;
pub mod relog;
pub mod remove_member;

pub use add_member::AddMemberManager;
pub use login::LoginManager;
pub use logoff::LogoffManager;
pub use pause::PauseManager;
pub use relog::RelogManager;
pub use remove_member::RemoveMemberManager;

use crate::ami::{AmiAction, AmiClient};
use crate::error::{AgentServerError, Result};

/// Send an action and turn a non-success response into an error.
pub(crate) async fn send_checked(ami: &dyn AmiClient, action: AmiAction) -> Result<()> {
    let response = ami.send(action).await?;
    if response.is_success() {
        Ok(())
    } else {
        Err(AgentServerError::AmiCommandFailed(
            response.message().to_string(),
        ))
    }
}
