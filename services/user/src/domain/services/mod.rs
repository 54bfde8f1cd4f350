//! 领域服务

mod profile_service;
mod registration_service;
mod social_graph_service;

pub use profile_service::{ProfileChange, ProfileService};
pub use registration_service::RegistrationService;
pub use social_graph_service::{FollowOutcome, SocialGraphService, UnfollowOutcome};
