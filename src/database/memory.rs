use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Comment, CommentWithAuthor, NewComment, NewProblem, NewUser, Problem, ProblemQuery, ProblemStatus,
    ProblemWithStats, Role, SortField, SortOrder, Upvote, User,
};
use crate::database::repository::{
    CommentRepository, ProblemRepository, StoreMaintenance, UpvoteRepository, UserRepository,
    UPVOTES_USER_PROBLEM_UNIQUE, USERS_EMAIL_UNIQUE,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    problems: BTreeMap<i64, Problem>,
    comments: BTreeMap<i64, Comment>,
    upvotes: BTreeMap<i64, Upvote>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn problem_with_stats(&self, problem: &Problem) -> Option<ProblemWithStats> {
        let owner = self.users.get(&problem.user_id)?;
        Some(ProblemWithStats {
            problem: problem.clone(),
            owner_name: owner.name.clone(),
            owner_email: owner.email.clone(),
            upvote_count: self.upvotes.values().filter(|v| v.problem_id == problem.id).count() as i64,
            comment_count: self.comments.values().filter(|c| c.problem_id == problem.id).count() as i64,
        })
    }

    fn comment_with_author(&self, comment: &Comment) -> Option<CommentWithAuthor> {
        let author = self.users.get(&comment.user_id)?;
        Some(CommentWithAuthor {
            comment: comment.clone(),
            author_name: author.name.clone(),
            author_email: author.email.clone(),
        })
    }

    fn delete_problem_cascade(&mut self, id: i64) -> bool {
        if self.problems.remove(&id).is_none() {
            return false;
        }
        self.comments.retain(|_, c| c.problem_id != id);
        self.upvotes.retain(|_, v| v.problem_id != id);
        true
    }

    fn delete_user_cascade(&mut self, id: i64) -> bool {
        if self.users.remove(&id).is_none() {
            return false;
        }
        let owned: Vec<i64> = self
            .problems
            .values()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        for problem_id in owned {
            self.delete_problem_cascade(problem_id);
        }
        self.comments.retain(|_, c| c.user_id != id);
        self.upvotes.retain(|_, v| v.user_id != id);
        true
    }

    fn require_user(&self, id: i64, constraint: &str) -> Result<(), DatabaseError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(DatabaseError::ForeignKeyViolation { constraint: constraint.to_string() })
        }
    }

    fn require_problem(&self, id: i64, constraint: &str) -> Result<(), DatabaseError> {
        if self.problems.contains_key(&id) {
            Ok(())
        } else {
            Err(DatabaseError::ForeignKeyViolation { constraint: constraint.to_string() })
        }
    }
}

/// In-process store with the same invariants as the Postgres schema:
/// unique emails, one upvote per (user, problem), foreign keys and cascades.
/// All mutations run under a single write lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_problems(a: &Problem, b: &Problem, sort: SortField) -> Ordering {
    let primary = match sort {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Status => a.status.cmp(&b.status),
        SortField::Location => a.location.cmp(&b.location),
    };
    primary.then(a.id.cmp(&b.id))
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::UniqueViolation { constraint: USERS_EMAIL_UNIQUE.to_string() });
        }
        let now = Utc::now();
        let row = User {
            id: tables.next_id(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            is_blocked: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn set_blocked(&self, id: i64, blocked: bool) -> Result<Option<User>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.is_blocked = blocked;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn set_role(&self, id: i64, role: Role) -> Result<Option<User>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.role = role;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<Option<User>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.delete_user_cascade(id))
    }
}

#[async_trait]
impl ProblemRepository for MemoryStore {
    async fn create(&self, problem: NewProblem) -> Result<Problem, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.require_user(problem.user_id, "problems_user_id_fkey")?;
        let now = Utc::now();
        let row = Problem {
            id: tables.next_id(),
            title: problem.title,
            description: problem.description,
            location: problem.location,
            image: problem.image,
            status: ProblemStatus::default(),
            user_id: problem.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.problems.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Problem>, DatabaseError> {
        Ok(self.tables.read().await.problems.get(&id).cloned())
    }

    async fn find_with_stats(&self, id: i64) -> Result<Option<ProblemWithStats>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.problems.get(&id).and_then(|p| tables.problem_with_stats(p)))
    }

    async fn list(&self, query: &ProblemQuery) -> Result<Vec<ProblemWithStats>, DatabaseError> {
        let tables = self.tables.read().await;
        let needle = query.location.as_ref().map(|l| l.to_lowercase());

        let mut problems: Vec<&Problem> = tables
            .problems
            .values()
            .filter(|p| query.status.map_or(true, |status| p.status == status))
            .filter(|p| {
                needle
                    .as_ref()
                    .map_or(true, |needle| p.location.to_lowercase().contains(needle.as_str()))
            })
            .collect();

        problems.sort_by(|a, b| {
            let ordering = compare_problems(a, b, query.sort);
            match query.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        Ok(problems
            .into_iter()
            .filter_map(|p| tables.problem_with_stats(p))
            .collect())
    }

    async fn update_status(&self, id: i64, status: ProblemStatus) -> Result<Option<Problem>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.problems.get_mut(&id).map(|problem| {
            problem.status = status;
            problem.updated_at = Utc::now();
            problem.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.delete_problem_cascade(id))
    }

    async fn images_for_user(&self, user_id: i64) -> Result<Vec<String>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .problems
            .values()
            .filter(|p| p.user_id == user_id)
            .filter_map(|p| p.image.clone())
            .collect())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: NewComment) -> Result<Comment, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.require_user(comment.user_id, "comments_user_id_fkey")?;
        tables.require_problem(comment.problem_id, "comments_problem_id_fkey")?;
        let now = Utc::now();
        let row = Comment {
            id: tables.next_id(),
            text: comment.text,
            user_id: comment.user_id,
            problem_id: comment.problem_id,
            created_at: now,
            updated_at: now,
        };
        tables.comments.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, DatabaseError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn find_with_author(&self, id: i64) -> Result<Option<CommentWithAuthor>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.get(&id).and_then(|c| tables.comment_with_author(c)))
    }

    async fn list_for_problem(&self, problem_id: i64) -> Result<Vec<CommentWithAuthor>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.problem_id == problem_id)
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(comments
            .into_iter()
            .filter_map(|c| tables.comment_with_author(c))
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.comments.remove(&id).is_some())
    }
}

#[async_trait]
impl UpvoteRepository for MemoryStore {
    async fn find(&self, user_id: i64, problem_id: i64) -> Result<Option<Upvote>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .upvotes
            .values()
            .find(|v| v.user_id == user_id && v.problem_id == problem_id)
            .cloned())
    }

    async fn create(&self, user_id: i64, problem_id: i64) -> Result<Upvote, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.require_user(user_id, "upvotes_user_id_fkey")?;
        tables.require_problem(problem_id, "upvotes_problem_id_fkey")?;
        if tables
            .upvotes
            .values()
            .any(|v| v.user_id == user_id && v.problem_id == problem_id)
        {
            return Err(DatabaseError::UniqueViolation {
                constraint: UPVOTES_USER_PROBLEM_UNIQUE.to_string(),
            });
        }
        let now = Utc::now();
        let row = Upvote {
            id: tables.next_id(),
            user_id,
            problem_id,
            created_at: now,
            updated_at: now,
        };
        tables.upvotes.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete(&self, user_id: i64, problem_id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.upvotes.len();
        tables
            .upvotes
            .retain(|_, v| !(v.user_id == user_id && v.problem_id == problem_id));
        Ok(tables.upvotes.len() < before)
    }

    async fn count_for_problem(&self, problem_id: i64) -> Result<i64, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.upvotes.values().filter(|v| v.problem_id == problem_id).count() as i64)
    }

    async fn list_for_problem(&self, problem_id: i64) -> Result<Vec<Upvote>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .upvotes
            .values()
            .filter(|v| v.problem_id == problem_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StoreMaintenance for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn reset(&self) -> Result<(), DatabaseError> {
        *self.tables.write().await = Tables::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::database::repository::Repositories;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        }
    }

    fn new_problem(user_id: i64, title: &str, location: &str) -> NewProblem {
        NewProblem {
            title: title.to_string(),
            description: "A description long enough".to_string(),
            location: location.to_string(),
            image: None,
            user_id,
        }
    }

    #[tokio::test]
    async fn email_is_unique() {
        let repos = Repositories::memory();
        repos.users.create(new_user("a@example.com")).await.unwrap();
        let err = repos.users.create(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation { ref constraint } if constraint == USERS_EMAIL_UNIQUE));
    }

    #[tokio::test]
    async fn problem_requires_existing_owner() {
        let repos = Repositories::memory();
        let err = repos.problems.create(new_problem(42, "Orphan problem", "Nowhere")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn concurrent_upvotes_persist_one_row() {
        let repos = Repositories::memory();
        let user = repos.users.create(new_user("voter@example.com")).await.unwrap();
        let problem = repos.problems.create(new_problem(user.id, "Pothole here", "Main St")).await.unwrap();

        let (user_id, problem_id) = (user.id, problem.id);
        let mut handles = Vec::new();
        for _ in 0..16 {
            let upvotes = Arc::clone(&repos.upvotes);
            handles.push(tokio::spawn(async move { upvotes.create(user_id, problem_id).await }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(DatabaseError::UniqueViolation { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(repos.upvotes.count_for_problem(problem.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deleting_problem_cascades() {
        let repos = Repositories::memory();
        let owner = repos.users.create(new_user("owner@example.com")).await.unwrap();
        let other = repos.users.create(new_user("other@example.com")).await.unwrap();
        let problem = repos.problems.create(new_problem(owner.id, "Broken bench", "Park")).await.unwrap();

        let comment = repos
            .comments
            .create(NewComment { text: "Seen it".to_string(), user_id: other.id, problem_id: problem.id })
            .await
            .unwrap();
        repos.upvotes.create(other.id, problem.id).await.unwrap();

        assert!(repos.problems.delete(problem.id).await.unwrap());
        assert!(repos.comments.find_by_id(comment.id).await.unwrap().is_none());
        assert_eq!(repos.upvotes.count_for_problem(problem.id).await.unwrap(), 0);
        assert!(!repos.problems.delete(problem.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_user_cascades_transitively() {
        let repos = Repositories::memory();
        let owner = repos.users.create(new_user("owner@example.com")).await.unwrap();
        let other = repos.users.create(new_user("other@example.com")).await.unwrap();
        let owned = repos.problems.create(new_problem(owner.id, "Owner problem", "North")).await.unwrap();
        let foreign = repos.problems.create(new_problem(other.id, "Other problem", "South")).await.unwrap();

        // comment and upvote by the other user on the owner's problem
        let on_owned = repos
            .comments
            .create(NewComment { text: "Me too".to_string(), user_id: other.id, problem_id: owned.id })
            .await
            .unwrap();
        repos.upvotes.create(other.id, owned.id).await.unwrap();
        // comment and upvote by the owner on someone else's problem
        let by_owner = repos
            .comments
            .create(NewComment { text: "Agreed".to_string(), user_id: owner.id, problem_id: foreign.id })
            .await
            .unwrap();
        repos.upvotes.create(owner.id, foreign.id).await.unwrap();

        assert!(repos.users.delete(owner.id).await.unwrap());

        assert!(repos.problems.find_by_id(owned.id).await.unwrap().is_none());
        assert!(repos.comments.find_by_id(on_owned.id).await.unwrap().is_none());
        assert!(repos.comments.find_by_id(by_owner.id).await.unwrap().is_none());
        assert_eq!(repos.upvotes.count_for_problem(owned.id).await.unwrap(), 0);
        assert_eq!(repos.upvotes.count_for_problem(foreign.id).await.unwrap(), 0);
        assert!(repos.problems.find_by_id(foreign.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_filters_location_case_insensitively() {
        let repos = Repositories::memory();
        let user = repos.users.create(new_user("u@example.com")).await.unwrap();
        repos.problems.create(new_problem(user.id, "Streetlight out", "Elm Street")).await.unwrap();
        repos.problems.create(new_problem(user.id, "Overflowing bins", "Central Park")).await.unwrap();

        let query = ProblemQuery { location: Some("elm".to_string()), ..Default::default() };
        let found = repos.problems.list(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].problem.location, "Elm Street");
        assert_eq!(found[0].owner_email, "u@example.com");
    }

    #[tokio::test]
    async fn list_defaults_to_newest_first() {
        let repos = Repositories::memory();
        let user = repos.users.create(new_user("u@example.com")).await.unwrap();
        let first = repos.problems.create(new_problem(user.id, "First problem", "A street")).await.unwrap();
        let second = repos.problems.create(new_problem(user.id, "Second problem", "B street")).await.unwrap();

        let listed = repos.problems.list(&ProblemQuery::default()).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|p| p.problem.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let query = ProblemQuery { sort: SortField::Title, order: SortOrder::Asc, ..Default::default() };
        let listed = repos.problems.list(&query).await.unwrap();
        assert_eq!(listed[0].problem.title, "First problem");
    }
}
