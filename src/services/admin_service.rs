use tracing::info;

use crate::database::models::{ProblemWithStats, User};
use crate::database::repository::Repositories;
use crate::services::policy::{ensure_not_self, require_admin, Principal};
use crate::services::problem_service::ProblemService;
use crate::services::ServiceError;

const USER_NOT_FOUND: &str = "User not found.";

/// Admin triage: user moderation and unconditional problem removal
#[derive(Clone)]
pub struct AdminService {
    repos: Repositories,
    problems: ProblemService,
}

impl AdminService {
    pub fn new(repos: Repositories, problems: ProblemService) -> Self {
        Self { repos, problems }
    }

    pub async fn list_users(&self, principal: &Principal) -> Result<Vec<User>, ServiceError> {
        require_admin(principal)?;
        Ok(self.repos.users.list().await?)
    }

    pub async fn toggle_block(&self, principal: &Principal, user_id: i64) -> Result<User, ServiceError> {
        require_admin(principal)?;
        let target = self
            .repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(USER_NOT_FOUND.to_string()))?;
        ensure_not_self(principal, target.id, "You cannot block yourself.")?;

        let updated = self
            .repos
            .users
            .set_blocked(target.id, !target.is_blocked)
            .await?
            .ok_or_else(|| ServiceError::NotFound(USER_NOT_FOUND.to_string()))?;
        info!(
            "Admin {} set blocked={} on user {}",
            principal.id, updated.is_blocked, updated.id
        );
        Ok(updated)
    }

    /// Cascades to the user's problems, comments and upvotes; their images are removed afterwards.
    pub async fn delete_user(&self, principal: &Principal, user_id: i64) -> Result<(), ServiceError> {
        require_admin(principal)?;
        let target = self
            .repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(USER_NOT_FOUND.to_string()))?;
        ensure_not_self(principal, target.id, "You cannot delete yourself.")?;

        let images = self.repos.problems.images_for_user(target.id).await?;
        if !self.repos.users.delete(target.id).await? {
            return Err(ServiceError::NotFound(USER_NOT_FOUND.to_string()));
        }
        info!("Admin {} deleted user {}", principal.id, target.id);

        for file_name in &images {
            self.problems.discard_image(file_name).await;
        }
        Ok(())
    }

    pub async fn list_problems(&self, principal: &Principal) -> Result<Vec<ProblemWithStats>, ServiceError> {
        require_admin(principal)?;
        self.problems.list_all().await
    }

    pub async fn delete_problem(&self, principal: &Principal, problem_id: i64) -> Result<(), ServiceError> {
        require_admin(principal)?;
        self.problems.delete(principal, problem_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::database::models::{NewComment, NewUser, Role};
    use crate::services::problem_service::{CreateProblemInput, ImageUpload};
    use crate::storage::{ImageStore, LocalImageStore};

    struct Fixture {
        admin_svc: AdminService,
        problem_svc: ProblemService,
        repos: Repositories,
        images: Arc<dyn ImageStore>,
        admin: Principal,
        user: Principal,
        _dir: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let images: Arc<dyn ImageStore> = Arc::new(LocalImageStore::open(dir.path()).await.unwrap());
        let repos = Repositories::memory();
        let problem_svc = ProblemService::new(repos.clone(), images.clone(), 5 * 1024 * 1024);
        let admin_svc = AdminService::new(repos.clone(), problem_svc.clone());

        let make = |email: &'static str, role: Role| {
            let repos = repos.clone();
            async move {
                let user = repos
                    .users
                    .create(NewUser {
                        name: "Member".to_string(),
                        email: email.to_string(),
                        password_hash: "hash".to_string(),
                        role,
                    })
                    .await
                    .unwrap();
                Principal::from(&user)
            }
        };
        let admin = make("admin@example.com", Role::Admin).await;
        let user = make("user@example.com", Role::User).await;

        Fixture {
            admin_svc,
            problem_svc,
            repos,
            images,
            admin,
            user,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        let f = fixture().await;
        assert!(matches!(f.admin_svc.list_users(&f.user).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(
            f.admin_svc.toggle_block(&f.user, f.admin.id).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn block_toggles_and_refuses_self() {
        let f = fixture().await;

        match f.admin_svc.toggle_block(&f.admin, f.admin.id).await.unwrap_err() {
            ServiceError::BadRequest(msg) => assert_eq!(msg, "You cannot block yourself."),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            f.admin_svc.toggle_block(&f.admin, 9999).await,
            Err(ServiceError::NotFound(_))
        ));

        assert!(f.admin_svc.toggle_block(&f.admin, f.user.id).await.unwrap().is_blocked);
        assert!(!f.admin_svc.toggle_block(&f.admin, f.user.id).await.unwrap().is_blocked);
    }

    #[tokio::test]
    async fn delete_user_cascades_and_cleans_images() {
        let f = fixture().await;
        let input = CreateProblemInput {
            title: "Broken swing set".to_string(),
            description: "One of the swings has a broken chain".to_string(),
            location: "Riverside Park".to_string(),
        };
        let upload = ImageUpload {
            file_name: "swing.jpg".to_string(),
            content_type: Some("image/jpeg".to_string()),
            bytes: vec![0xff, 0xd8, 0xff],
        };
        let created = f.problem_svc.create(&f.user, input, Some(upload)).await.unwrap();
        let file = created.problem.image.clone().unwrap();
        f.repos
            .comments
            .create(NewComment { text: "Fix it".to_string(), user_id: f.admin.id, problem_id: created.problem.id })
            .await
            .unwrap();

        match f.admin_svc.delete_user(&f.admin, f.admin.id).await.unwrap_err() {
            ServiceError::BadRequest(msg) => assert_eq!(msg, "You cannot delete yourself."),
            other => panic!("unexpected {other:?}"),
        }

        f.admin_svc.delete_user(&f.admin, f.user.id).await.unwrap();
        assert!(f.repos.users.find_by_id(f.user.id).await.unwrap().is_none());
        assert!(f.repos.problems.find_by_id(created.problem.id).await.unwrap().is_none());
        assert!(f.repos.comments.list_for_problem(created.problem.id).await.unwrap().is_empty());
        assert!(!f.images.exists(&file).await);
    }

    #[tokio::test]
    async fn admin_deletes_any_problem() {
        let f = fixture().await;
        let input = CreateProblemInput {
            title: "Illegal dumping".to_string(),
            description: "Construction debris on the sidewalk".to_string(),
            location: "Oak Street".to_string(),
        };
        let created = f.problem_svc.create(&f.user, input, None).await.unwrap();

        let listed = f.admin_svc.list_problems(&f.admin).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].owner_email, "user@example.com");

        f.admin_svc.delete_problem(&f.admin, created.problem.id).await.unwrap();
        assert!(matches!(
            f.admin_svc.delete_problem(&f.admin, created.problem.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
