pub mod format;

pub use format::{CommentView, ProblemDetailView, ProblemView, SessionView};
