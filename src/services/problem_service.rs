use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::database::models::{
    CommentWithAuthor, NewProblem, ProblemQuery, ProblemStatus, ProblemWithStats, SortField, SortOrder, Upvote,
};
use crate::database::repository::Repositories;
use crate::services::policy::{ensure_owner_or_admin, Principal};
use crate::services::validation::Validator;
use crate::services::ServiceError;
use crate::storage::{is_allowed_image, ImageStore};

pub const PROBLEM_NOT_FOUND: &str = "Problem not found.";

/// Text fields of a new problem
#[derive(Debug, Clone, Default)]
pub struct CreateProblemInput {
    pub title: String,
    pub description: String,
    pub location: String,
}

/// An uploaded image, fully buffered
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Raw query-string filters, validated by `ProblemService::parse_query`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListProblemsParams {
    pub status: Option<String>,
    pub location: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// A problem with its comments (newest first) and upvotes
#[derive(Debug, Clone)]
pub struct ProblemDetail {
    pub problem: ProblemWithStats,
    pub comments: Vec<CommentWithAuthor>,
    pub upvotes: Vec<Upvote>,
}

#[derive(Clone)]
pub struct ProblemService {
    repos: Repositories,
    images: Arc<dyn ImageStore>,
    max_image_bytes: usize,
}

impl ProblemService {
    pub fn new(repos: Repositories, images: Arc<dyn ImageStore>, max_image_bytes: usize) -> Self {
        Self {
            repos,
            images,
            max_image_bytes,
        }
    }

    /// Validates everything before touching storage; a stored image is removed
    /// again if the insert fails.
    pub async fn create(
        &self,
        principal: &Principal,
        input: CreateProblemInput,
        image: Option<ImageUpload>,
    ) -> Result<ProblemWithStats, ServiceError> {
        let mut v = Validator::new();
        v.length("title", "Title", &input.title, 5, 200)
            .length("description", "Description", &input.description, 10, 2000)
            .length("location", "Location", &input.location, 3, 200);
        v.finish()?;

        if let Some(upload) = &image {
            self.check_image(upload)?;
        }

        let stored = match &image {
            Some(upload) => Some(self.images.save(&upload.file_name, &upload.bytes).await?),
            None => None,
        };

        let new_problem = NewProblem {
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            location: input.location.trim().to_string(),
            image: stored.clone(),
            user_id: principal.id,
        };

        let created = match self.repos.problems.create(new_problem).await {
            Ok(problem) => problem,
            Err(e) => {
                if let Some(file_name) = &stored {
                    self.discard_image(file_name).await;
                }
                return Err(e.into());
            }
        };

        info!("User {} created problem {}", principal.id, created.id);
        self.repos
            .problems
            .find_with_stats(created.id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(PROBLEM_NOT_FOUND.to_string()))
    }

    /// Also used when the request body itself overruns the upload limit
    pub fn file_too_large(&self) -> ServiceError {
        let max_mb = self.max_image_bytes / (1024 * 1024);
        ServiceError::invalid("image", format!("File size too large. Maximum size is {}MB.", max_mb))
    }

    fn check_image(&self, upload: &ImageUpload) -> Result<(), ServiceError> {
        if upload.bytes.len() > self.max_image_bytes {
            return Err(self.file_too_large());
        }
        if !is_allowed_image(&upload.file_name, upload.content_type.as_deref()) {
            return Err(ServiceError::invalid(
                "image",
                "Only image files are allowed (jpeg, jpg, png, gif, webp).",
            ));
        }
        Ok(())
    }

    pub fn parse_query(params: &ListProblemsParams) -> Result<ProblemQuery, ServiceError> {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let status = match non_empty(&params.status) {
            Some(raw) => Some(raw.parse::<ProblemStatus>().map_err(|_| invalid_status())?),
            None => None,
        };
        let sort = match non_empty(&params.sort) {
            Some(raw) => raw.parse::<SortField>().map_err(|_| {
                ServiceError::invalid(
                    "sort",
                    "Invalid sort field. Must be one of: createdAt, updatedAt, title, status, location",
                )
            })?,
            None => SortField::default(),
        };
        let order = match non_empty(&params.order) {
            Some(raw) => raw
                .parse::<SortOrder>()
                .map_err(|_| ServiceError::invalid("order", "Invalid sort order. Must be one of: ASC, DESC"))?,
            None => SortOrder::default(),
        };

        Ok(ProblemQuery {
            status,
            location: non_empty(&params.location),
            sort,
            order,
        })
    }

    pub async fn list(&self, params: &ListProblemsParams) -> Result<Vec<ProblemWithStats>, ServiceError> {
        let query = Self::parse_query(params)?;
        Ok(self.repos.problems.list(&query).await?)
    }

    /// Every problem, newest first
    pub async fn list_all(&self) -> Result<Vec<ProblemWithStats>, ServiceError> {
        Ok(self.repos.problems.list(&ProblemQuery::default()).await?)
    }

    pub async fn get(&self, id: i64) -> Result<ProblemDetail, ServiceError> {
        let problem = self
            .repos
            .problems
            .find_with_stats(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(PROBLEM_NOT_FOUND.to_string()))?;
        let comments = self.repos.comments.list_for_problem(id).await?;
        let upvotes = self.repos.upvotes.list_for_problem(id).await?;

        Ok(ProblemDetail {
            problem,
            comments,
            upvotes,
        })
    }

    pub async fn update_status(
        &self,
        principal: &Principal,
        id: i64,
        status: Option<&str>,
    ) -> Result<ProblemWithStats, ServiceError> {
        let status = status
            .and_then(|raw| raw.parse::<ProblemStatus>().ok())
            .ok_or_else(invalid_status)?;

        let problem = self
            .repos
            .problems
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(PROBLEM_NOT_FOUND.to_string()))?;
        ensure_owner_or_admin(principal, problem.user_id, "You are not authorized to update this problem.")?;

        self.repos
            .problems
            .update_status(id, status)
            .await?
            .ok_or_else(|| ServiceError::NotFound(PROBLEM_NOT_FOUND.to_string()))?;
        info!("Problem {} status set to {} by user {}", id, status, principal.id);

        self.repos
            .problems
            .find_with_stats(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(PROBLEM_NOT_FOUND.to_string()))
    }

    /// Row first, then the image file. A file failure is logged, never returned.
    pub async fn delete(&self, principal: &Principal, id: i64) -> Result<(), ServiceError> {
        let problem = self
            .repos
            .problems
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(PROBLEM_NOT_FOUND.to_string()))?;
        ensure_owner_or_admin(principal, problem.user_id, "You are not authorized to delete this problem.")?;

        if !self.repos.problems.delete(id).await? {
            return Err(ServiceError::NotFound(PROBLEM_NOT_FOUND.to_string()));
        }
        info!("Problem {} deleted by user {}", id, principal.id);

        if let Some(file_name) = &problem.image {
            self.discard_image(file_name).await;
        }
        Ok(())
    }

    /// Best-effort removal of a stored image
    pub async fn discard_image(&self, file_name: &str) {
        match self.images.remove(file_name).await {
            Ok(true) => {}
            Ok(false) => warn!("Image {} was already missing", file_name),
            Err(e) => warn!("Failed to remove image {}: {}", file_name, e),
        }
    }
}

fn invalid_status() -> ServiceError {
    let allowed: Vec<&str> = ProblemStatus::ALL.iter().map(|s| s.as_str()).collect();
    ServiceError::invalid(
        "status",
        format!("Invalid status. Must be one of: {}", allowed.join(", ")),
    )
}
