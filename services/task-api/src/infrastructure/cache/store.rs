//! 读穿缓存存取与按 owner 的失效编排

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tado_common::{TaskId, UserId};
use tado_config::CacheConfig;
use tado_errors::AppResult;
use tado_ports::CachePort;
use tracing::{error, warn};

use super::keys;
use super::scan::PatternScan;

/// 读请求的缓存结果，暴露为 `X-Cache` 响应头；只用于观测，无契约
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

impl CacheOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }
}

/// 任务缓存
///
/// 存储后端通过 `CachePort` 注入。读写路径 fail-open：存储故障
/// 或坏负载一律当作 miss 处理并记录 warn，绝不向调用方抛错。
/// 失效失败则是 error 级事件，因为在 TTL 之内可能读到旧数据。
#[derive(Clone)]
pub struct TaskCache {
    store: Arc<dyn CachePort>,
    default_ttl: Duration,
    scan_count: usize,
}

impl TaskCache {
    pub fn new(store: Arc<dyn CachePort>, config: &CacheConfig) -> Self {
        Self {
            store,
            default_ttl: Duration::from_secs(config.default_ttl_secs),
            scan_count: config.scan_count,
        }
    }

    /// 读取并反序列化缓存值；任何故障都降级为 miss
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Cache get failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                // 坏负载同样按 miss 处理，由源数据路径兜底
                warn!(key, error = %e, "Undecodable cache payload, treating as miss");
                None
            }
        }
    }

    /// 序列化并带 TTL 写入；失败只记录，不影响写方
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Cache serialization failed, skipping set");
                return;
            }
        };

        if let Err(e) = self.store.set(key, &raw, Some(self.default_ttl)).await {
            warn!(key, error = %e, "Cache set failed, entry dropped");
        }
    }

    /// 使某 owner 的缓存失效
    ///
    /// 给定 `task_id` 时先删实体键，然后总是按模式删除该 owner 的
    /// 全部集合键。在触发写提交之后同步调用，调用方在响应前等待
    /// 其完成。两步任何一步失败都只记录并继续：数据变更已经提交,
    /// 失效失败的后果是在 TTL 之内可能读到旧列表/旧实体。
    pub async fn invalidate_for_owner(&self, owner: &UserId, task_id: Option<&TaskId>) {
        if let Some(id) = task_id {
            let key = keys::task_key(id);
            if let Err(e) = self.store.delete(&key).await {
                error!(%owner, key, error = %e, "Entity key invalidation failed, stale until TTL expiry");
            }
        }

        let pattern = keys::owner_list_pattern(owner);
        if let Err(e) = self.delete_by_pattern(&pattern).await {
            error!(%owner, pattern, error = %e, "List key invalidation failed, stale until TTL expiry");
        }
    }

    /// 游标式遍历并删除所有匹配模式的键
    ///
    /// 每轮的匹配批次立即批量删除，不做跨轮累积。
    pub(crate) async fn delete_by_pattern(&self, pattern: &str) -> AppResult<()> {
        let mut scan = PatternScan::new(self.store.as_ref(), pattern, self.scan_count);

        while let Some(batch) = scan.next_batch().await? {
            self.store.delete_many(&batch).await?;
        }

        Ok(())
    }
}
