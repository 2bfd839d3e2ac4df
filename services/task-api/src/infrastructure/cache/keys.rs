//! 缓存键构造
//!
//! 两类键：
//! - 实体键 `task:{id}`，一个任务对应唯一一个键
//! - 集合键 `tasks:list:{owner}:status=..:q=..:sort=..:archived=..`，
//!   字段顺序固定，缺省值显式写入，保证同一过滤器总是产生同一个键
//!
//! 自由文本字段经过百分号编码，分隔符 `:` 和 Redis 通配符 `*?[`
//! 都无法从用户输入进入键结构，也就不可能干扰按模式失效。

use tado_common::{TaskId, UserId};

use crate::domain::TaskListFilter;

/// 单个任务的实体键
pub fn task_key(id: &TaskId) -> String {
    format!("task:{}", id)
}

/// 一个 (owner, 过滤器) 查询结果的集合键
///
/// `archived` 统一以小写布尔字符串写入，类型在整条链路上都是
/// `bool`，等价查询不会分裂出不同的命名空间。
pub fn task_list_key(owner: &UserId, filter: &TaskListFilter) -> String {
    let status = filter.status.map(|s| s.as_str()).unwrap_or("");
    let q = urlencoding::encode(filter.q.as_deref().unwrap_or(""));
    let sort = filter.sort.canonical();

    format!(
        "tasks:list:{}:status={}:q={}:sort={}:archived={}",
        owner,
        status,
        q,
        urlencoding::encode(&sort),
        filter.archived
    )
}

/// 匹配某 owner 全部集合键的通配符模式
pub fn owner_list_pattern(owner: &UserId) -> String {
    format!("tasks:list:{}:*", owner)
}
