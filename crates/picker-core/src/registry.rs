use crate::collection::Collection;
use crate::error::PickerError;
use crate::rating::RatingEnv;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared handle to one collection; holding the lock serializes writers.
pub type CollectionHandle = Arc<Mutex<Collection>>;

/// Named collections that can be driven independently from different threads.
#[derive(Debug)]
pub struct CollectionRegistry {
    env: RatingEnv,
    collections: RwLock<HashMap<String, CollectionHandle>>,
}

impl CollectionRegistry {
    pub fn new(env: RatingEnv) -> Result<Self, PickerError> {
        env.validate()?;
        Ok(Self {
            env,
            collections: RwLock::new(HashMap::new()),
        })
    }

    pub fn env(&self) -> &RatingEnv {
        &self.env
    }

    pub fn get(&self, name: &str) -> Option<CollectionHandle> {
        self.collections.read().get(name).cloned()
    }

    pub fn get_or_create(&self, name: &str) -> CollectionHandle {
        if let Some(handle) = self.get(name) {
            return handle;
        }
        let mut collections = self.collections.write();
        collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Collection::empty(self.env))))
            .clone()
    }

    /// Installs a rebuilt collection under `name`, returning the handle it replaced.
    pub fn insert(&self, name: &str, collection: Collection) -> Option<CollectionHandle> {
        self.collections
            .write()
            .insert(name.to_string(), Arc::new(Mutex::new(collection)))
    }

    pub fn remove(&self, name: &str) -> Option<CollectionHandle> {
        self.collections.write().remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.collections.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemId, Outcome};
    use std::thread;

    #[test]
    fn get_or_create_returns_the_same_handle() {
        let registry = CollectionRegistry::new(RatingEnv::default()).unwrap();
        let first = registry.get_or_create("holiday");
        let second = registry.get_or_create("holiday");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn collections_are_independent() {
        let registry = CollectionRegistry::new(RatingEnv::default()).unwrap();
        {
            let handle = registry.get_or_create("a");
            let mut a = handle.lock();
            a.insert_item(ItemId(1));
            a.insert_item(ItemId(2));
            a.apply(ItemId(1), ItemId(2), Outcome::LeftWins).unwrap();
        }
        let b = registry.get_or_create("b");
        assert!(b.lock().is_empty());
        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(registry.get("a").unwrap().lock().log().len(), 1);
    }

    #[test]
    fn writers_on_one_collection_are_serialized() {
        let registry = CollectionRegistry::new(RatingEnv::default()).unwrap();
        {
            let handle = registry.get_or_create("shared");
            let mut shared = handle.lock();
            for id in 0..4 {
                shared.insert_item(ItemId(id));
            }
        }
        thread::scope(|scope| {
            for worker in 0..4u64 {
                let handle = registry.get_or_create("shared");
                scope.spawn(move || {
                    for round in 0..25u64 {
                        let left = ItemId((worker + round) % 4);
                        let right = ItemId((worker + round + 1) % 4);
                        handle.lock().apply(left, right, Outcome::Draw).unwrap();
                    }
                });
            }
        });
        let handle = registry.get("shared").unwrap();
        let shared = handle.lock();
        assert_eq!(shared.log().len(), 100);
        let sequences: Vec<u64> = shared.log().records().iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn insert_replaces_and_remove_drops() {
        let registry = CollectionRegistry::new(RatingEnv::default()).unwrap();
        registry.get_or_create("x");
        let replaced = registry.insert("x", Collection::new(RatingEnv::default()).unwrap());
        assert!(replaced.is_some());
        assert!(registry.remove("x").is_some());
        assert!(registry.is_empty());
    }
}
