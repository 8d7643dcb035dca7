use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::core::{ParamMap, ParamValue};

/// Identity of one evaluation: which function, over which arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    function: usize,
    arguments: u64,
}

impl CacheKey {
    fn new(function: usize, params: &ParamMap) -> Self {
        let mut entries: Vec<(&String, &ParamValue)> = params.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let mut hasher = DefaultHasher::new();
        entries.hash(&mut hasher);
        Self {
            function,
            arguments: hasher.finish(),
        }
    }
}

/// Results computed during one update cascade.
///
/// A fresh cache is created per change event and dropped when the cascade
/// ends, so a function shared by several redraw callbacks runs once per event.
#[derive(Default)]
pub struct UpdateCache {
    entries: HashMap<CacheKey, Box<dyn Any>>,
    hits: usize,
    misses: usize,
}

impl UpdateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with<T, F>(&mut self, key: CacheKey, compute: F) -> T
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        if let Some(value) = self
            .entries
            .get(&key)
            .and_then(|value| value.downcast_ref::<T>())
        {
            self.hits += 1;
            return value.clone();
        }
        self.misses += 1;
        let value = compute();
        self.entries.insert(key, Box::new(value.clone()));
        value
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits
    }

    #[must_use]
    pub fn misses(&self) -> usize {
        self.misses
    }
}

impl fmt::Debug for UpdateCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateCache")
            .field("entries", &self.entries.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

/// User function of the current parameters, cached by identity.
///
/// Clones share identity, so two callbacks holding clones of one `ParamFn`
/// hit the same cache entry.
pub struct ParamFn<T> {
    func: Rc<dyn Fn(&ParamMap) -> T>,
}

impl<T: Clone + 'static> ParamFn<T> {
    #[must_use]
    pub fn new(func: impl Fn(&ParamMap) -> T + 'static) -> Self {
        Self {
            func: Rc::new(func),
        }
    }

    /// Calls the function directly, bypassing any cache.
    #[must_use]
    pub fn call(&self, params: &ParamMap) -> T {
        (self.func)(params)
    }

    #[must_use]
    pub fn cache_key(&self, params: &ParamMap) -> CacheKey {
        CacheKey::new(Rc::as_ptr(&self.func).cast::<()>() as usize, params)
    }

    pub fn eval(&self, params: &ParamMap, cache: Option<&mut UpdateCache>) -> T {
        match cache {
            Some(cache) => cache.get_or_insert_with(self.cache_key(params), || self.call(params)),
            None => self.call(params),
        }
    }
}

impl<T> Clone for ParamFn<T> {
    fn clone(&self) -> Self {
        Self {
            func: Rc::clone(&self.func),
        }
    }
}

impl<T> fmt::Debug for ParamFn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParamFn(..)")
    }
}

/// Either a constant or a function of the current parameters.
#[derive(Debug, Clone)]
pub enum Evaluable<T> {
    Value(T),
    Func(ParamFn<T>),
}

impl<T: Clone + 'static> Evaluable<T> {
    #[must_use]
    pub fn func(func: impl Fn(&ParamMap) -> T + 'static) -> Self {
        Self::Func(ParamFn::new(func))
    }

    pub fn eval(&self, params: &ParamMap, cache: Option<&mut UpdateCache>) -> T {
        match self {
            Self::Value(value) => value.clone(),
            Self::Func(func) => func.eval(params, cache),
        }
    }
}

impl<T> From<ParamFn<T>> for Evaluable<T> {
    fn from(func: ParamFn<T>) -> Self {
        Self::Func(func)
    }
}
