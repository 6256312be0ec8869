use tracing::info;

use crate::database::models::{CommentWithAuthor, NewComment};
use crate::database::repository::Repositories;
use crate::services::policy::{ensure_owner_or_admin, Principal};
use crate::services::problem_service::PROBLEM_NOT_FOUND;
use crate::services::validation::Validator;
use crate::services::ServiceError;

#[derive(Clone)]
pub struct CommentService {
    repos: Repositories,
}

impl CommentService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn require_problem(&self, problem_id: i64) -> Result<(), ServiceError> {
        match self.repos.problems.find_by_id(problem_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(PROBLEM_NOT_FOUND.to_string())),
        }
    }

    pub async fn add(&self, principal: &Principal, problem_id: i64, text: &str) -> Result<CommentWithAuthor, ServiceError> {
        self.require_problem(problem_id).await?;

        let mut v = Validator::new();
        v.length_with(
            "text",
            text,
            1,
            1000,
            "Comment text is required",
            "Comment must be between 1 and 1000 characters",
        );
        v.finish()?;

        let comment = self
            .repos
            .comments
            .create(NewComment {
                text: text.trim().to_string(),
                user_id: principal.id,
                problem_id,
            })
            .await?;
        info!("User {} commented on problem {}", principal.id, problem_id);

        self.repos
            .comments
            .find_with_author(comment.id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Comment not found.".to_string()))
    }

    pub async fn list(&self, problem_id: i64) -> Result<Vec<CommentWithAuthor>, ServiceError> {
        self.require_problem(problem_id).await?;
        Ok(self.repos.comments.list_for_problem(problem_id).await?)
    }

    pub async fn delete(&self, principal: &Principal, id: i64) -> Result<(), ServiceError> {
        let comment = self
            .repos
            .comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Comment not found.".to_string()))?;
        ensure_owner_or_admin(principal, comment.user_id, "You are not authorized to delete this comment.")?;

        self.repos.comments.delete(id).await?;
        info!("Comment {} deleted by user {}", id, principal.id);
        Ok(())
    }
}
