//! 按模式的增量扫描
//!
//! 用 SCAN 游标协议代替阻塞式的全量 KEYS 枚举：每轮只取一批候选键,
//! 内存有界，也不会长时间占住共享的存储。代价是轮数没有上限，
//! 对病态大的键空间接受更多轮次而不是更长的单次阻塞。

use tado_errors::AppResult;
use tado_ports::CachePort;

/// 扫描状态机：每轮按返回游标转移，游标归零即终止
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning(u64),
    Done,
}

/// 一次按模式的游标扫描
pub struct PatternScan<'a> {
    store: &'a dyn CachePort,
    pattern: &'a str,
    count: usize,
    state: ScanState,
}

impl<'a> PatternScan<'a> {
    pub fn new(store: &'a dyn CachePort, pattern: &'a str, count: usize) -> Self {
        Self {
            store,
            pattern,
            count,
            state: ScanState::Scanning(0),
        }
    }

    /// 请求下一轮候选键批次；扫描结束后返回 `None`
    ///
    /// 批次可能为空或包含重复键，终止条件只看游标，
    /// 不依赖轮数或批次内容。
    pub async fn next_batch(&mut self) -> AppResult<Option<Vec<String>>> {
        let cursor = match self.state {
            ScanState::Scanning(cursor) => cursor,
            ScanState::Done => return Ok(None),
        };

        let page = self.store.scan(cursor, self.pattern, self.count).await?;

        self.state = if page.cursor == 0 {
            ScanState::Done
        } else {
            ScanState::Scanning(page.cursor)
        };

        Ok(Some(page.keys))
    }
}
