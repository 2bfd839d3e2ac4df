//! Cache trait 定义

use async_trait::async_trait;
use std::time::Duration;
use tado_errors::AppResult;

/// 增量扫描的一轮结果：继续游标加候选键批次。
///
/// 游标为 0 表示扫描结束。同一个键可能在多轮中重复出现，
/// 单轮也可能不返回任何匹配键，调用方都必须容忍。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPage {
    pub cursor: u64,
    pub keys: Vec<String>,
}

/// 缓存 trait
#[async_trait]
pub trait CachePort: Send + Sync {
    /// 获取缓存值
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// 设置缓存值
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()>;

    /// 删除缓存（键不存在不算错误）
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// 批量删除缓存
    async fn delete_many(&self, keys: &[String]) -> AppResult<()>;

    /// 按通配符模式增量扫描一轮
    ///
    /// 对应 Redis 的 `SCAN cursor MATCH pattern COUNT count`。
    /// 传入 0 开始新扫描；返回的游标再次为 0 时表示扫描完成。
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> AppResult<ScanPage>;
}
