use serde::Serialize;
use tracing::{debug, info};

use crate::database::manager::DatabaseError;
use crate::database::repository::Repositories;
use crate::services::policy::Principal;
use crate::services::problem_service::PROBLEM_NOT_FOUND;
use crate::services::ServiceError;

/// Current state of a (user, problem) pair plus the problem's total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteState {
    pub upvoted: bool,
    pub upvote_count: i64,
}

/// Result of a toggle; `created` is true only when this call inserted the row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub state: UpvoteState,
    pub created: bool,
}

#[derive(Clone)]
pub struct UpvoteService {
    repos: Repositories,
}

impl UpvoteService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn require_problem(&self, problem_id: i64) -> Result<(), ServiceError> {
        match self.repos.problems.find_by_id(problem_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(PROBLEM_NOT_FOUND.to_string())),
        }
    }

    /// NotUpvoted -> Upvoted inserts, Upvoted -> NotUpvoted deletes. A racing
    /// insert that loses on the unique pair reports Upvoted without creating.
    pub async fn toggle(&self, principal: &Principal, problem_id: i64) -> Result<ToggleOutcome, ServiceError> {
        self.require_problem(problem_id).await?;

        let existing = self.repos.upvotes.find(principal.id, problem_id).await?;
        let (upvoted, created) = match existing {
            Some(_) => {
                self.repos.upvotes.delete(principal.id, problem_id).await?;
                info!("User {} removed upvote on problem {}", principal.id, problem_id);
                (false, false)
            }
            None => match self.repos.upvotes.create(principal.id, problem_id).await {
                Ok(_) => {
                    info!("User {} upvoted problem {}", principal.id, problem_id);
                    (true, true)
                }
                Err(DatabaseError::UniqueViolation { .. }) => {
                    debug!("Concurrent upvote by user {} on problem {}", principal.id, problem_id);
                    (true, false)
                }
                Err(e) => return Err(e.into()),
            },
        };

        let upvote_count = self.repos.upvotes.count_for_problem(problem_id).await?;
        Ok(ToggleOutcome {
            state: UpvoteState { upvoted, upvote_count },
            created,
        })
    }

    pub async fn status(&self, principal: &Principal, problem_id: i64) -> Result<UpvoteState, ServiceError> {
        self.require_problem(problem_id).await?;

        let upvoted = self.repos.upvotes.find(principal.id, problem_id).await?.is_some();
        let upvote_count = self.repos.upvotes.count_for_problem(problem_id).await?;
        Ok(UpvoteState { upvoted, upvote_count })
    }
}
