//! 缓存层集成测试

#[cfg(test)]
mod tests {
    use crate::domain::{SortSpec, TaskListFilter, TaskStatus};
    use crate::infrastructure::cache::keys;
    use crate::infrastructure::cache::{PatternScan, TaskCache};
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tado_common::{TaskId, UserId};
    use tado_config::CacheConfig;
    use tado_errors::{AppError, AppResult};
    use tado_ports::{CachePort, ScanPage};

    // Mock 缓存实现
    struct MockCache {
        data: Mutex<HashMap<String, String>>,
        should_fail: bool,
        scripted_pages: Mutex<VecDeque<ScanPage>>,
        scan_calls: AtomicUsize,
    }

    impl MockCache {
        fn new() -> Self {
            Self {
                data: Mutex::new(HashMap::new()),
                should_fail: false,
                scripted_pages: Mutex::new(VecDeque::new()),
                scan_calls: AtomicUsize::new(0),
            }
        }

        fn with_failure() -> Self {
            Self {
                should_fail: true,
                ..Self::new()
            }
        }

        /// 预设 SCAN 每轮返回的游标和批次
        fn with_scripted_pages(pages: Vec<ScanPage>) -> Self {
            Self {
                scripted_pages: Mutex::new(pages.into()),
                ..Self::new()
            }
        }

        fn insert_raw(&self, key: &str, value: &str) {
            self.data
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }

        fn contains(&self, key: &str) -> bool {
            self.data.lock().unwrap().contains_key(key)
        }

        fn scan_calls(&self) -> usize {
            self.scan_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CachePort for MockCache {
        async fn get(&self, key: &str) -> AppResult<Option<String>> {
            if self.should_fail {
                return Err(AppError::cache("Mock cache error"));
            }
            Ok(self.data.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str, _ttl: Option<Duration>) -> AppResult<()> {
            if self.should_fail {
                return Err(AppError::cache("Mock cache error"));
            }
            self.insert_raw(key, value);
            Ok(())
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            if self.should_fail {
                return Err(AppError::cache("Mock cache error"));
            }
            self.data.lock().unwrap().remove(key);
            Ok(())
        }

        async fn delete_many(&self, keys: &[String]) -> AppResult<()> {
            if self.should_fail {
                return Err(AppError::cache("Mock cache error"));
            }
            let mut data = self.data.lock().unwrap();
            for key in keys {
                data.remove(key);
            }
            Ok(())
        }

        async fn scan(&self, _cursor: u64, pattern: &str, _count: usize) -> AppResult<ScanPage> {
            self.scan_calls.fetch_add(1, Ordering::SeqCst);
            if self.should_fail {
                return Err(AppError::cache("Mock cache error"));
            }

            if let Some(page) = self.scripted_pages.lock().unwrap().pop_front() {
                return Ok(page);
            }

            // 默认行为：一轮返回全部前缀匹配的键
            let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
            let keys = self
                .data
                .lock()
                .unwrap()
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect();
            Ok(ScanPage { cursor: 0, keys })
        }
    }

    fn cache_over(mock: &Arc<MockCache>) -> TaskCache {
        TaskCache::new(mock.clone() as Arc<dyn CachePort>, &CacheConfig::default())
    }

    fn filter(status: Option<TaskStatus>) -> TaskListFilter {
        TaskListFilter {
            status,
            q: None,
            sort: SortSpec::default(),
            archived: false,
        }
    }

    #[tokio::test]
    async fn test_set_then_get_roundtrip() {
        let mock = Arc::new(MockCache::new());
        let cache = cache_over(&mock);

        let value = vec!["write report".to_string(), "ship release".to_string()];
        cache.set_json("task:roundtrip", &value).await;

        let loaded: Option<Vec<String>> = cache.get_json("task:roundtrip").await;
        assert_eq!(loaded, Some(value));
    }

    #[tokio::test]
    async fn test_get_and_set_fail_open_on_store_failure() {
        let mock = Arc::new(MockCache::with_failure());
        let cache = cache_over(&mock);

        // 存储故障不向调用方抛错，读当 miss，写静默丢弃
        let loaded: Option<Vec<String>> = cache.get_json("task:unreachable").await;
        assert_eq!(loaded, None);

        cache.set_json("task:unreachable", &vec!["x"]).await;
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_a_miss() {
        let mock = Arc::new(MockCache::new());
        mock.insert_raw("task:corrupt", "{not valid json");

        let cache = cache_over(&mock);
        let loaded: Option<Vec<String>> = cache.get_json("task:corrupt").await;
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn test_invalidate_for_owner_evicts_entity_and_all_list_keys() {
        let owner = UserId::new();
        let other_owner = UserId::new();
        let task_id = TaskId::new();

        let entity_key = keys::task_key(&task_id);
        let done_key = keys::task_list_key(&owner, &filter(Some(TaskStatus::Done)));
        let in_progress_key =
            keys::task_list_key(&owner, &filter(Some(TaskStatus::InProgress)));
        let foreign_key = keys::task_list_key(&other_owner, &filter(None));

        let mock = Arc::new(MockCache::new());
        for key in [&entity_key, &done_key, &in_progress_key, &foreign_key] {
            mock.insert_raw(key, "[]");
        }

        let cache = cache_over(&mock);
        cache.invalidate_for_owner(&owner, Some(&task_id)).await;

        assert!(!mock.contains(&entity_key));
        assert!(!mock.contains(&done_key));
        assert!(!mock.contains(&in_progress_key));
        // 其他 owner 的集合键不受影响
        assert!(mock.contains(&foreign_key));
    }

    #[tokio::test]
    async fn test_invalidate_without_task_id_keeps_entity_key() {
        let owner = UserId::new();
        let task_id = TaskId::new();

        let entity_key = keys::task_key(&task_id);
        let list_key = keys::task_list_key(&owner, &filter(None));

        let mock = Arc::new(MockCache::new());
        mock.insert_raw(&entity_key, "{}");
        mock.insert_raw(&list_key, "[]");

        let cache = cache_over(&mock);
        cache.invalidate_for_owner(&owner, None).await;

        assert!(mock.contains(&entity_key));
        assert!(!mock.contains(&list_key));
    }

    #[tokio::test]
    async fn test_pattern_delete_runs_until_cursor_exhaustion() {
        // 三轮扫描：游标两次非零，第三次归零才终止；
        // 批次含重复键，必须被容忍
        let pages = vec![
            ScanPage {
                cursor: 42,
                keys: vec!["tasks:list:u:a".to_string(), "tasks:list:u:b".to_string()],
            },
            ScanPage {
                cursor: 7,
                keys: vec!["tasks:list:u:b".to_string()],
            },
            ScanPage {
                cursor: 0,
                keys: vec!["tasks:list:u:c".to_string()],
            },
        ];
        let mock = Arc::new(MockCache::with_scripted_pages(pages));
        for key in ["tasks:list:u:a", "tasks:list:u:b", "tasks:list:u:c"] {
            mock.insert_raw(key, "[]");
        }

        let cache = cache_over(&mock);
        cache.delete_by_pattern("tasks:list:u:*").await.unwrap();

        assert_eq!(mock.scan_calls(), 3);
        assert!(!mock.contains("tasks:list:u:a"));
        assert!(!mock.contains("tasks:list:u:b"));
        assert!(!mock.contains("tasks:list:u:c"));
    }

    #[tokio::test]
    async fn test_scan_tolerates_empty_rounds() {
        let pages = vec![
            ScanPage {
                cursor: 5,
                keys: vec![],
            },
            ScanPage {
                cursor: 0,
                keys: vec!["tasks:list:u:only".to_string()],
            },
        ];
        let mock = Arc::new(MockCache::with_scripted_pages(pages));
        mock.insert_raw("tasks:list:u:only", "[]");

        let cache = cache_over(&mock);
        cache.delete_by_pattern("tasks:list:u:*").await.unwrap();

        assert_eq!(mock.scan_calls(), 2);
        assert!(!mock.contains("tasks:list:u:only"));
    }

    #[tokio::test]
    async fn test_invalidate_swallows_store_failure() {
        let mock = Arc::new(MockCache::with_failure());
        let cache = cache_over(&mock);

        // 实体键删除和模式扫描都失败，调用仍正常结束，不向上抛错
        cache
            .invalidate_for_owner(&UserId::new(), Some(&TaskId::new()))
            .await;
        cache.invalidate_for_owner(&UserId::new(), None).await;
    }

    #[tokio::test]
    async fn test_pattern_scan_yields_nothing_after_done() {
        let mock = Arc::new(MockCache::new());
        let mut scan = PatternScan::new(mock.as_ref(), "tasks:list:u:*", 100);

        // 空键空间：第一轮即归零
        assert_eq!(scan.next_batch().await.unwrap(), Some(vec![]));
        assert_eq!(scan.next_batch().await.unwrap(), None);
        assert_eq!(mock.scan_calls(), 1);
    }
}
