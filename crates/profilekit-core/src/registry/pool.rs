//! Connector handles and the per-profile connector pool

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a runtime object built from a profile
///
/// Cloning is cheap and every clone points at the same object.
#[derive(Clone)]
pub struct Connector(Arc<dyn Any + Send + Sync>);

impl Connector {
    /// Wrap a value in a new handle
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Wrap an already shared value
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self(value)
    }

    /// Borrow the wrapped value if it has type `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.0).downcast_ref::<T>()
    }

    /// Get a typed shared handle if the wrapped value has type `T`
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.0).downcast::<T>().ok()
    }

    /// Whether both handles point at the same object
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Connector")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Connectors keyed by `(category, resolved profile name)`
///
/// A key holding `None` remembers that construction produced nothing.
#[derive(Debug, Default)]
pub struct ConnectorPool {
    entries: BTreeMap<String, BTreeMap<String, Option<Connector>>>,
}

impl ConnectorPool {
    /// Create an empty pool
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Store a construction result, replacing any previous entry
    pub fn store(&mut self, category: &str, name: &str, connector: Option<Connector>) {
        self.entries
            .entry(category.to_string())
            .or_default()
            .insert(name.to_string(), connector);
    }

    /// Pooled connector for the key, if any
    pub fn get(&self, category: &str, name: &str) -> Option<Connector> {
        self.entries.get(category)?.get(name)?.clone()
    }

    /// Whether the key holds a result, including a cached absent one
    pub fn is_populated(&self, category: &str, name: &str) -> bool {
        self.entries
            .get(category)
            .is_some_and(|names| names.contains_key(name))
    }

    /// Evict one key, returning its entry
    pub fn remove(&mut self, category: &str, name: &str) -> Option<Option<Connector>> {
        let names = self.entries.get_mut(category)?;
        let entry = names.remove(name);
        if names.is_empty() {
            self.entries.remove(category);
        }
        entry
    }

    /// Evict every key, returning the entries in key order
    pub fn drain(&mut self) -> Vec<(String, String, Option<Connector>)> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .flat_map(|(category, names)| {
                names
                    .into_iter()
                    .map(move |(name, connector)| (category.clone(), name, connector))
            })
            .collect()
    }

    /// Number of populated keys
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// Whether no key is populated
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_downcast() {
        let connector = Connector::new(String::from("a value"));

        assert_eq!(
            connector.downcast_ref::<String>().map(String::as_str),
            Some("a value")
        );
        assert!(connector.downcast_ref::<u32>().is_none());
        assert_eq!(connector.downcast::<String>().unwrap().as_str(), "a value");
    }

    #[test]
    fn test_connector_identity() {
        let first = Connector::new(1_u8);
        let clone = first.clone();
        let other = Connector::new(1_u8);

        assert!(first.ptr_eq(&clone));
        assert!(!first.ptr_eq(&other));
    }

    #[test]
    fn test_store_and_get() {
        let mut pool = ConnectorPool::new();
        assert!(pool.get("foo", "bar").is_none());
        assert!(!pool.is_populated("foo", "bar"));

        let connector = Connector::new("a value");
        pool.store("foo", "bar", Some(connector.clone()));

        assert!(pool.get("foo", "bar").unwrap().ptr_eq(&connector));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_absent_result_is_populated() {
        let mut pool = ConnectorPool::new();
        pool.store("foo", "bar", None);

        assert!(pool.get("foo", "bar").is_none());
        assert!(pool.is_populated("foo", "bar"));
    }

    #[test]
    fn test_remove_prunes_empty_categories() {
        let mut pool = ConnectorPool::new();
        pool.store("foo", "bar", None);

        assert!(matches!(pool.remove("foo", "bar"), Some(None)));
        assert!(pool.is_empty());
        assert!(pool.remove("foo", "bar").is_none());
    }

    #[test]
    fn test_drain_empties_pool() {
        let mut pool = ConnectorPool::new();
        pool.store("b", "x", Some(Connector::new(1_u8)));
        pool.store("a", "y", None);
        pool.store("a", "z", Some(Connector::new(2_u8)));

        let drained = pool.drain();
        let keys: Vec<(&str, &str)> = drained
            .iter()
            .map(|(c, n, _)| (c.as_str(), n.as_str()))
            .collect();

        assert_eq!(keys, vec![("a", "y"), ("a", "z"), ("b", "x")]);
        assert!(pool.is_empty());
        assert_eq!(pool.len(), 0);
    }
}
