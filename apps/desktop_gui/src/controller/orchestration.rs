//! Command orchestration helpers from UI actions to the backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues a command for the fetch worker. Returns whether the command was
/// actually queued; on failure the status line explains why, and callers
/// must not leave the UI waiting for a result that will never arrive.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = match &cmd {
        BackendCommand::LoadUsers => "load_users",
        BackendCommand::LoadPostFeed { .. } => "load_post_feed",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Fetch worker disconnected (possible startup failure); restart the app"
                .to_string();
            false
        }
    }
}
