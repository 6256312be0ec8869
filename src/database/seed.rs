use tracing::info;

use crate::auth::password::hash_password_blocking;
use crate::database::models::{NewComment, NewProblem, NewUser, ProblemStatus, Role};
use crate::database::repository::Repositories;
use crate::services::ServiceError;

struct SeedUser {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: Role,
}

const USERS: [SeedUser; 4] = [
    SeedUser { name: "John Doe", email: "john@example.com", password: "password123", role: Role::User },
    SeedUser { name: "Jane Smith", email: "jane@example.com", password: "password123", role: Role::User },
    SeedUser { name: "Admin User", email: "admin@example.com", password: "admin123", role: Role::Admin },
    SeedUser { name: "Bob Johnson", email: "bob@example.com", password: "password123", role: Role::User },
];

/// (title, description, location, status, owner index into USERS)
const PROBLEMS: [(&str, &str, &str, ProblemStatus, usize); 6] = [
    (
        "Broken Street Light on Main Street",
        "The street light near the intersection of Main St and 5th Ave has been broken for over a week. This creates a safety hazard for pedestrians at night.",
        "Main Street & 5th Avenue",
        ProblemStatus::Pending,
        0,
    ),
    (
        "Pothole on Highway 101",
        "Large pothole on Highway 101 near exit 23. It's causing damage to vehicles and is a serious safety concern.",
        "Highway 101, Exit 23",
        ProblemStatus::InProgress,
        1,
    ),
    (
        "Overflowing Garbage Bins in Central Park",
        "The garbage bins in Central Park have been overflowing for days. This is attracting pests and creating an unsanitary environment.",
        "Central Park",
        ProblemStatus::Pending,
        0,
    ),
    (
        "Graffiti on Public Library Wall",
        "Vandals have spray-painted graffiti on the exterior wall of the public library. It needs to be cleaned as soon as possible.",
        "Public Library, 123 Library Lane",
        ProblemStatus::Resolved,
        3,
    ),
    (
        "Broken Playground Equipment",
        "The swing set at Riverside Park is broken and poses a danger to children. One of the swings has a broken chain.",
        "Riverside Park",
        ProblemStatus::InProgress,
        1,
    ),
    (
        "Illegal Dumping on Oak Street",
        "Someone has illegally dumped construction debris on Oak Street. This is blocking the sidewalk and creating a hazard.",
        "Oak Street, near 10th Avenue",
        ProblemStatus::Pending,
        3,
    ),
];

/// (text, author index, problem index)
const COMMENTS: [(&str, usize, usize); 8] = [
    ("I noticed this too! It's really dangerous at night.", 1, 0),
    ("Has anyone reported this to the city?", 3, 0),
    ("I called the city maintenance department. They said they'll fix it this week.", 0, 0),
    ("This pothole damaged my tire yesterday!", 0, 1),
    ("I saw a crew working on this yesterday. Should be fixed soon.", 3, 1),
    ("The smell is terrible. This needs immediate attention.", 1, 2),
    ("Great to see this was resolved quickly!", 0, 3),
    ("My kids love this park. Please fix this ASAP!", 0, 4),
];

/// (user index, problem index)
const UPVOTES: [(usize, usize); 11] = [
    (0, 1),
    (1, 1),
    (3, 1),
    (0, 2),
    (1, 2),
    (1, 0),
    (3, 0),
    (0, 4),
    (1, 4),
    (3, 4),
    (0, 5),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub problems: usize,
    pub comments: usize,
    pub upvotes: usize,
}

/// Wipe the store and load the sample data set
pub async fn seed(repos: &Repositories) -> Result<SeedSummary, ServiceError> {
    repos.maintenance.reset().await?;
    info!("Store reset");

    let mut user_ids = Vec::with_capacity(USERS.len());
    for seed_user in &USERS {
        let password_hash = hash_password_blocking(seed_user.password.to_string()).await?;
        let user = repos
            .users
            .create(NewUser {
                name: seed_user.name.to_string(),
                email: seed_user.email.to_string(),
                password_hash,
                role: seed_user.role,
            })
            .await?;
        user_ids.push(user.id);
    }

    let mut problem_ids = Vec::with_capacity(PROBLEMS.len());
    for (title, description, location, status, owner) in PROBLEMS {
        let problem = repos
            .problems
            .create(NewProblem {
                title: title.to_string(),
                description: description.to_string(),
                location: location.to_string(),
                image: None,
                user_id: user_ids[owner],
            })
            .await?;
        if status != ProblemStatus::default() {
            repos.problems.update_status(problem.id, status).await?;
        }
        problem_ids.push(problem.id);
    }

    for (text, author, problem) in COMMENTS {
        repos
            .comments
            .create(NewComment {
                text: text.to_string(),
                user_id: user_ids[author],
                problem_id: problem_ids[problem],
            })
            .await?;
    }

    for (user, problem) in UPVOTES {
        repos.upvotes.create(user_ids[user], problem_ids[problem]).await?;
    }

    let summary = SeedSummary {
        users: USERS.len(),
        problems: PROBLEMS.len(),
        comments: COMMENTS.len(),
        upvotes: UPVOTES.len(),
    };
    info!("Seeded {:?}", summary);
    Ok(summary)
}

/// Sample credentials printed after seeding
pub fn sample_logins() -> Vec<(&'static str, &'static str, Role)> {
    USERS.iter().map(|u| (u.email, u.password, u.role)).collect()
}
