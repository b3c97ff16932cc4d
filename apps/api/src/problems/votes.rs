use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Remembers which signed-in users already upvoted which problems.
/// In-memory only: a restart forgets every vote.
#[derive(Clone, Default)]
pub struct VoteLedger {
    cast: Arc<Mutex<HashSet<(String, String)>>>,
}

impl VoteLedger {
    /// Records the vote. Returns false if this voter already voted on this problem.
    pub async fn record(&self, voter_id: &str, problem_id: &str) -> bool {
        self.cast
            .lock()
            .await
            .insert((voter_id.to_string(), problem_id.to_string()))
    }

    #[cfg(test)]
    pub async fn has_voted(&self, voter_id: &str, problem_id: &str) -> bool {
        self.cast
            .lock()
            .await
            .contains(&(voter_id.to_string(), problem_id.to_string()))
    }
}
