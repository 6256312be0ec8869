use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::memory::MemoryStore;
use crate::database::models::{
    Comment, CommentWithAuthor, NewComment, NewProblem, NewUser, Problem, ProblemQuery, ProblemStatus,
    ProblemWithStats, Role, Upvote, User,
};
use crate::database::postgres::PgStore;

/// Constraint names shared by the schema and the in-memory store
pub const USERS_EMAIL_UNIQUE: &str = "users_email_unique";
pub const UPVOTES_USER_PROBLEM_UNIQUE: &str = "upvotes_user_problem_unique";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `UniqueViolation` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;

    /// Lookup is exact; callers normalise the email first.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// All users, newest first.
    async fn list(&self) -> Result<Vec<User>, DatabaseError>;

    async fn set_blocked(&self, id: i64, blocked: bool) -> Result<Option<User>, DatabaseError>;

    async fn set_role(&self, id: i64, role: Role) -> Result<Option<User>, DatabaseError>;

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<Option<User>, DatabaseError>;

    /// Removes the user and, by cascade, their problems, comments and upvotes.
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait ProblemRepository: Send + Sync {
    /// Fails with `ForeignKeyViolation` when the owner does not exist.
    async fn create(&self, problem: NewProblem) -> Result<Problem, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Problem>, DatabaseError>;

    async fn find_with_stats(&self, id: i64) -> Result<Option<ProblemWithStats>, DatabaseError>;

    async fn list(&self, query: &ProblemQuery) -> Result<Vec<ProblemWithStats>, DatabaseError>;

    async fn update_status(&self, id: i64, status: ProblemStatus) -> Result<Option<Problem>, DatabaseError>;

    /// Removes the problem and, by cascade, its comments and upvotes.
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;

    /// Image filenames referenced by a user's problems.
    async fn images_for_user(&self, user_id: i64) -> Result<Vec<String>, DatabaseError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> Result<Comment, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, DatabaseError>;

    async fn find_with_author(&self, id: i64) -> Result<Option<CommentWithAuthor>, DatabaseError>;

    /// Newest first, id descending on equal timestamps.
    async fn list_for_problem(&self, problem_id: i64) -> Result<Vec<CommentWithAuthor>, DatabaseError>;

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait UpvoteRepository: Send + Sync {
    async fn find(&self, user_id: i64, problem_id: i64) -> Result<Option<Upvote>, DatabaseError>;

    /// Fails with `UniqueViolation` when the pair already exists.
    async fn create(&self, user_id: i64, problem_id: i64) -> Result<Upvote, DatabaseError>;

    /// Returns false when there was nothing to remove.
    async fn delete(&self, user_id: i64, problem_id: i64) -> Result<bool, DatabaseError>;

    async fn count_for_problem(&self, problem_id: i64) -> Result<i64, DatabaseError>;

    async fn list_for_problem(&self, problem_id: i64) -> Result<Vec<Upvote>, DatabaseError>;
}

/// Store-level operations outside any single entity
#[async_trait]
pub trait StoreMaintenance: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// Deletes every row. Used by the seeder.
    async fn reset(&self) -> Result<(), DatabaseError>;
}

/// Per-entity repositories handed to services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub problems: Arc<dyn ProblemRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub upvotes: Arc<dyn UpvoteRepository>,
    pub maintenance: Arc<dyn StoreMaintenance>,
}

impl Repositories {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + ProblemRepository + CommentRepository + UpvoteRepository + StoreMaintenance + 'static,
    {
        Self {
            users: store.clone(),
            problems: store.clone(),
            comments: store.clone(),
            upvotes: store.clone(),
            maintenance: store,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::from_store(Arc::new(PgStore::new(pool)))
    }

    pub fn memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }
}
