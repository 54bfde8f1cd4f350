//! 群组与公众号实体
//!
//! 两者都是外部协作方拥有的成员容器；本服务只读群组名单，
//! 并在新用户注册时写入公众号订阅边。

use campus_common::{GroupId, OfficialAccountId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 群组
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 群组成员关系视图：群组信息加成员在群内的头衔
///
/// 头衔是边上的属性，列举时随查询计算，不冗余存储在用户上。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMembership {
    #[serde(flatten)]
    pub group: Group,
    pub title: Option<String>,
}

/// 公众号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficialAccount {
    pub id: OfficialAccountId,
    pub name: String,
}
