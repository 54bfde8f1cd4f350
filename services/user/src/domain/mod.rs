//! 领域层

pub mod group;
pub mod pending_registration;
pub mod repositories;
pub mod services;
pub mod unit_of_work;
pub mod user;
pub mod value_objects;
