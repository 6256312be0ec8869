pub mod comment;
pub mod problem;
pub mod upvote;
pub mod user;

pub use comment::{Comment, CommentWithAuthor, NewComment};
pub use problem::{NewProblem, Problem, ProblemQuery, ProblemStatus, ProblemWithStats, SortField, SortOrder};
pub use upvote::Upvote;
pub use user::{NewUser, Role, User};
