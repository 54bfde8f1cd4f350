//! campus-cqrs-core - 命令/查询处理抽象

mod command;
mod query;

pub use command::*;
pub use query::*;
