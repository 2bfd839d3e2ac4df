//! 任务缓存层
//!
//! 读穿缓存加按 owner 的失效协议。缓存对主数据路径永远是
//! fail-open 的：存储故障降级为 miss，绝不影响请求的可用性。

pub mod keys;
pub mod scan;
pub mod store;

#[cfg(test)]
mod tests;

pub use scan::PatternScan;
pub use store::{CacheOutcome, TaskCache};
