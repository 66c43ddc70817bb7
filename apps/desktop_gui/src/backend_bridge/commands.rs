//! Backend commands queued from UI to the fetch worker.

use shared::domain::UserId;

#[derive(Debug)]
pub enum BackendCommand {
    LoadUsers,
    LoadPostFeed {
        user_id: UserId,
        /// Refresh cycle this request belongs to. The UI discards results
        /// carrying a generation older than its current one.
        generation: u64,
    },
}
