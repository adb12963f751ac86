use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use crate::structure::CodeUnit;

/// Identifying context for the file under analysis, attached to every
/// enriched finding. Module and package names are derived from the path:
/// the filename stem and the parent directory name.
#[derive(Debug, Clone)]
pub struct FileContext {
    pub project: String,
    pub file_path: String,
    pub module_name: String,
    pub package_name: String,
}

pub const UNKNOWN_FILE: &str = "unknown.py";

impl FileContext {
    pub fn from_path(file_path: &str, project: &str) -> Self {
        if file_path == UNKNOWN_FILE || file_path.is_empty() {
            return Self::unknown(project);
        }

        let path = Path::new(file_path);
        let module_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        let package_name = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        Self {
            project: project.to_string(),
            file_path: file_path.to_string(),
            module_name,
            package_name,
        }
    }

    pub fn unknown(project: &str) -> Self {
        Self {
            project: project.to_string(),
            file_path: UNKNOWN_FILE.to_string(),
            module_name: "unknown".to_string(),
            package_name: "unknown".to_string(),
        }
    }
}

impl Default for FileContext {
    fn default() -> Self {
        Self::unknown("Code")
    }
}

/// Request-scoped cache from source text to its parsed structure. Bounded
/// LRU, passed by handle, so repeated analyses of the same content within a
/// request (or a server session that owns one) skip re-parsing. Deliberately
/// not process-global: eviction is explicit and the cache dies with its owner.
pub struct AnalysisCache {
    entries: Mutex<LruCache<u64, Arc<CodeUnit>>>,
}

impl AnalysisCache {
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries.max(1)).unwrap();
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get_or_parse(&self, source: &str) -> Arc<CodeUnit> {
        let key = Self::fingerprint(source);
        let mut entries = self.entries.lock();
        if let Some(unit) = entries.get(&key) {
            return unit.clone();
        }
        let unit = Arc::new(CodeUnit::parse(source));
        entries.put(key, unit.clone());
        unit
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn fingerprint(source: &str) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        source.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(64)
    }
}
