use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;

type Compiled = Result<Arc<Regex>, String>;

/// 缓存的正则数量上限，超出后淘汰最早加入的条目
pub const MAX_CACHED_PATTERNS: usize = 256;

/// 按加入顺序淘汰的正则缓存，编译失败的结果也会缓存
#[derive(Default)]
struct PatternCache {
    entries: HashMap<String, Compiled>,
    order: VecDeque<String>,
}

impl PatternCache {
    fn insert(&mut self, pattern: &str, compiled: Compiled) -> Compiled {
        if let Some(existing) = self.entries.get(pattern) {
            return existing.clone();
        }
        while self.entries.len() >= MAX_CACHED_PATTERNS {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
        self.order.push_back(pattern.to_string());
        self.entries.insert(pattern.to_string(), compiled.clone());
        compiled
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

static PATTERNS: Lazy<RwLock<PatternCache>> = Lazy::new(|| RwLock::new(PatternCache::default()));

pub fn compile(pattern: &str) -> Compiled {
    if let Some(compiled) = PATTERNS.read().entries.get(pattern) {
        return compiled.clone();
    }
    PATTERNS.write().insert(pattern, build(pattern))
}

fn build(pattern: &str) -> Compiled {
    Regex::new(pattern)
        .map(Arc::new)
        .map_err(|err| err.to_string())
}

/// 当前缓存的正则数量
pub fn cached_patterns() -> usize {
    PATTERNS.read().len()
}
