//! 值对象

mod email;
mod password;
mod username;

pub use email::{Email, EmailError};
pub use password::{
    HashedPassword, PasswordError, validate_new_password, validate_registration_password,
};
pub use username::{Username, UsernameError};
