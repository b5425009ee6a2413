use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use super::loader::load_sales_csv;
use super::sales::SalesDataset;

type LoadFn = Box<dyn Fn(&Path) -> Result<SalesDataset>>;

// ---------------------------------------------------------------------------
// Memoized dataset loads
// ---------------------------------------------------------------------------

/// Loaded datasets keyed by source path.
///
/// A path is read at most once until it is invalidated; later calls hand out
/// the same `Arc`. Failed loads are not cached.
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<SalesDataset>>,
    load: LoadFn,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::with_loader(load_sales_csv)
    }
}

impl std::fmt::Debug for DatasetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetCache")
            .field("paths", &self.entries.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl DatasetCache {
    /// Cache backed by a custom loader.
    pub fn with_loader(load: impl Fn(&Path) -> Result<SalesDataset> + 'static) -> Self {
        DatasetCache {
            entries: HashMap::new(),
            load: Box::new(load),
        }
    }

    /// Return the dataset for `path`, loading it on first use.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<SalesDataset>> {
        if let Some(ds) = self.entries.get(path) {
            log::debug!("cache hit for {}", path.display());
            return Ok(Arc::clone(ds));
        }
        log::debug!("cache miss for {}", path.display());
        let ds = Arc::new((self.load)(path)?);
        self.entries.insert(path.to_path_buf(), Arc::clone(&ds));
        Ok(ds)
    }

    /// Forget the dataset loaded from `path`. Returns whether it was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::data::model::RecordSet;
    use crate::data::sales::REQUIRED_COLUMNS;

    fn counting_cache() -> (DatasetCache, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let cache = DatasetCache::with_loader(move |path| {
            seen.set(seen.get() + 1);
            if path.ends_with("broken.csv") {
                anyhow::bail!("unreadable");
            }
            SalesDataset::from_records(RecordSet::new(
                REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
                Vec::new(),
            ))
        });
        (cache, calls)
    }

    #[test]
    fn same_path_loads_once() {
        let (mut cache, calls) = counting_cache();
        let a = cache.get_or_load(Path::new("sales.csv")).unwrap();
        let b = cache.get_or_load(Path::new("sales.csv")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn new_path_and_invalidation_reload() {
        let (mut cache, calls) = counting_cache();
        cache.get_or_load(Path::new("a.csv")).unwrap();
        cache.get_or_load(Path::new("b.csv")).unwrap();
        assert_eq!(calls.get(), 2);

        assert!(cache.invalidate(Path::new("a.csv")));
        assert!(!cache.contains(Path::new("a.csv")));
        cache.get_or_load(Path::new("a.csv")).unwrap();
        assert_eq!(calls.get(), 3);

        cache.clear();
        cache.get_or_load(Path::new("b.csv")).unwrap();
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn failures_are_not_cached() {
        let (mut cache, calls) = counting_cache();
        assert!(cache.get_or_load(Path::new("broken.csv")).is_err());
        assert!(cache.get_or_load(Path::new("broken.csv")).is_err());
        assert_eq!(calls.get(), 2);
    }
}
