//! 用户命令/查询处理器

mod begin_registration_handler;
mod finalize_registration_handler;
mod follow_user_handler;
mod unfollow_user_handler;
mod update_profile_handler;
mod user_query_handlers;

pub use begin_registration_handler::BeginRegistrationHandler;
pub use finalize_registration_handler::FinalizeRegistrationHandler;
pub use follow_user_handler::FollowUserHandler;
pub use unfollow_user_handler::UnfollowUserHandler;
pub use update_profile_handler::UpdateProfileHandler;
pub use user_query_handlers::UserQueryHandler;
