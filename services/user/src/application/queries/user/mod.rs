mod user_queries;

pub use user_queries::*;
