use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Comment, CommentWithAuthor, NewComment, NewProblem, NewUser, Problem, ProblemQuery, ProblemStatus,
    ProblemWithStats, Role, Upvote, User,
};
use crate::database::repository::{
    CommentRepository, ProblemRepository, StoreMaintenance, UpvoteRepository, UserRepository,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, is_blocked, created_at, updated_at";
const PROBLEM_COLUMNS: &str = "id, title, description, location, image, status, user_id, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, text, user_id, problem_id, created_at, updated_at";
const UPVOTE_COLUMNS: &str = "id, user_id, problem_id, created_at, updated_at";

/// Problem rows joined with owner fields and per-row counts
const PROBLEM_WITH_STATS_SELECT: &str = r#"
    SELECT p.id, p.title, p.description, p.location, p.image, p.status, p.user_id,
           p.created_at, p.updated_at,
           u.name AS owner_name,
           u.email AS owner_email,
           (SELECT COUNT(*) FROM upvotes v WHERE v.problem_id = p.id) AS upvote_count,
           (SELECT COUNT(*) FROM comments c WHERE c.problem_id = p.id) AS comment_count
    FROM problems p
    JOIN users u ON u.id = p.user_id
"#;

const COMMENT_WITH_AUTHOR_SELECT: &str = r#"
    SELECT c.id, c.text, c.user_id, c.problem_id, c.created_at, c.updated_at,
           u.name AS author_name,
           u.email AS author_email
    FROM comments c
    JOIN users u ON u.id = c.user_id
"#;

/// sqlx-backed implementation of every repository port
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE metacharacters so user input only ever matches literally
fn like_pattern(raw: &str) -> String {
    let escaped = raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool).await?)
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at DESC, id DESC", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn set_blocked(&self, id: i64, blocked: bool) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "UPDATE users SET is_blocked = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(blocked)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn set_role(&self, id: i64, role: Role) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(role)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProblemRepository for PgStore {
    async fn create(&self, problem: NewProblem) -> Result<Problem, DatabaseError> {
        let sql = format!(
            "INSERT INTO problems (title, description, location, image, user_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            PROBLEM_COLUMNS
        );
        let row = sqlx::query_as::<_, Problem>(&sql)
            .bind(&problem.title)
            .bind(&problem.description)
            .bind(&problem.location)
            .bind(&problem.image)
            .bind(problem.user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Problem>, DatabaseError> {
        let sql = format!("SELECT {} FROM problems WHERE id = $1", PROBLEM_COLUMNS);
        Ok(sqlx::query_as::<_, Problem>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_with_stats(&self, id: i64) -> Result<Option<ProblemWithStats>, DatabaseError> {
        let sql = format!("{} WHERE p.id = $1", PROBLEM_WITH_STATS_SELECT);
        Ok(sqlx::query_as::<_, ProblemWithStats>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, query: &ProblemQuery) -> Result<Vec<ProblemWithStats>, DatabaseError> {
        // Sort column and direction come from closed enums, never from raw input
        let sql = format!(
            "{} WHERE ($1::problem_status IS NULL OR p.status = $1) \
               AND ($2::text IS NULL OR p.location ILIKE $2) \
             ORDER BY p.{col} {dir}, p.id {dir}",
            PROBLEM_WITH_STATS_SELECT,
            col = query.sort.column(),
            dir = query.order.keyword(),
        );
        let location = query.location.as_deref().map(like_pattern);

        Ok(sqlx::query_as::<_, ProblemWithStats>(&sql)
            .bind(query.status)
            .bind(location)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_status(&self, id: i64, status: ProblemStatus) -> Result<Option<Problem>, DatabaseError> {
        let sql = format!(
            "UPDATE problems SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            PROBLEM_COLUMNS
        );
        Ok(sqlx::query_as::<_, Problem>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM problems WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn images_for_user(&self, user_id: i64) -> Result<Vec<String>, DatabaseError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT image FROM problems WHERE user_id = $1 AND image IS NOT NULL")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(image,)| image).collect())
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn create(&self, comment: NewComment) -> Result<Comment, DatabaseError> {
        let sql = format!(
            "INSERT INTO comments (text, user_id, problem_id) VALUES ($1, $2, $3) RETURNING {}",
            COMMENT_COLUMNS
        );
        let row = sqlx::query_as::<_, Comment>(&sql)
            .bind(&comment.text)
            .bind(comment.user_id)
            .bind(comment.problem_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, DatabaseError> {
        let sql = format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS);
        Ok(sqlx::query_as::<_, Comment>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_with_author(&self, id: i64) -> Result<Option<CommentWithAuthor>, DatabaseError> {
        let sql = format!("{} WHERE c.id = $1", COMMENT_WITH_AUTHOR_SELECT);
        Ok(sqlx::query_as::<_, CommentWithAuthor>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_for_problem(&self, problem_id: i64) -> Result<Vec<CommentWithAuthor>, DatabaseError> {
        let sql = format!(
            "{} WHERE c.problem_id = $1 ORDER BY c.created_at DESC, c.id DESC",
            COMMENT_WITH_AUTHOR_SELECT
        );
        Ok(sqlx::query_as::<_, CommentWithAuthor>(&sql)
            .bind(problem_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UpvoteRepository for PgStore {
    async fn find(&self, user_id: i64, problem_id: i64) -> Result<Option<Upvote>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM upvotes WHERE user_id = $1 AND problem_id = $2",
            UPVOTE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Upvote>(&sql)
            .bind(user_id)
            .bind(problem_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create(&self, user_id: i64, problem_id: i64) -> Result<Upvote, DatabaseError> {
        let sql = format!(
            "INSERT INTO upvotes (user_id, problem_id) VALUES ($1, $2) RETURNING {}",
            UPVOTE_COLUMNS
        );
        let row = sqlx::query_as::<_, Upvote>(&sql)
            .bind(user_id)
            .bind(problem_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, user_id: i64, problem_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM upvotes WHERE user_id = $1 AND problem_id = $2")
            .bind(user_id)
            .bind(problem_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_for_problem(&self, problem_id: i64) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM upvotes WHERE problem_id = $1")
            .bind(problem_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn list_for_problem(&self, problem_id: i64) -> Result<Vec<Upvote>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM upvotes WHERE problem_id = $1 ORDER BY id",
            UPVOTE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Upvote>(&sql)
            .bind(problem_id)
            .fetch_all(&self.pool)
            .await?)
    }
}

#[async_trait]
impl StoreMaintenance for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), DatabaseError> {
        sqlx::query("TRUNCATE upvotes, comments, problems, users RESTART IDENTITY CASCADE")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
