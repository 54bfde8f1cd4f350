//! PostgreSQL 持久化层

mod postgres_pending_registration_repository;
mod postgres_social_graph_repository;
mod postgres_unit_of_work;
mod postgres_user_repository;
mod queries;
mod tx_repositories;

pub use postgres_pending_registration_repository::PostgresPendingRegistrationRepository;
pub use postgres_social_graph_repository::PostgresSocialGraphRepository;
pub use postgres_unit_of_work::{PostgresUnitOfWork, PostgresUnitOfWorkFactory};
pub use postgres_user_repository::PostgresUserRepository;
