//! Query identity and the result cache keyed by it.
//!
//! A [`QueryCacheKey`] identifies "this variable's query given the current
//! selections of the variables it references". It is the only identity used
//! to deduplicate query execution and to recognise stale completions: a
//! completion whose key no longer matches the variable's current key is
//! ignored.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use crate::options::OptionSet;
use crate::variable::{Variable, VariableSet};

use super::extract_dependencies;

/// Cache key for a query variable's effective query.
///
/// Built from:
/// - a namespace shared by every key of a session
/// - the variable name
/// - a dependency signature: each referenced name concatenated with that
///   dependency's selection string, whitespace stripped
///
/// The signature has no separators, so `ab` selecting `c` and `a` selecting
/// `bc` produce the same signature. Keys are an approximate identity, not a
/// collision-free hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryCacheKey {
    pub namespace: String,
    pub variable_name: String,
    pub dependency_signature: String,
}

impl fmt::Display for QueryCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.variable_name, self.dependency_signature)
    }
}

/// Builds the cache key of `variable` against the current `variables`.
///
/// Returns `None` for non-query variables, which never execute queries.
/// Dependencies missing from the set contribute their name and an empty value.
///
/// # Examples
///
/// ```
/// use dashvars::templating::build_key;
/// use dashvars::variable::{SelectedValue, Variable, VariableSet};
///
/// let variables = VariableSet::from_variables([
///     Variable::custom("env", "prod").with_selection(SelectedValue::single("prod")),
///     Variable::query("host", "hosts({{ .env }}, {{.zone}})"),
/// ])
/// .unwrap();
///
/// let key = build_key("ns", variables.get("host").unwrap(), &variables).unwrap();
/// assert_eq!(key.dependency_signature, "envprodzone");
/// ```
pub fn build_key(
    namespace: &str,
    variable: &Variable,
    variables: &VariableSet,
) -> Option<QueryCacheKey> {
    let template = variable.query_template()?;

    let mut signature = String::new();
    for dependency in extract_dependencies(template) {
        signature.push_str(&dependency);
        signature.push_str(&variables.selected_value_string(&dependency));
    }
    signature.retain(|c| !c.is_whitespace());

    Some(QueryCacheKey {
        namespace: namespace.to_string(),
        variable_name: variable.name.clone(),
        dependency_signature: signature,
    })
}

/// Bounded cache of successful query results.
///
/// Entries are evicted oldest-first once `capacity` is reached. The cache
/// lives as long as its session.
#[derive(Debug)]
pub struct QueryCache {
    entries: HashMap<QueryCacheKey, OptionSet>,
    /// Insertion order for eviction
    order: VecDeque<QueryCacheKey>,
    capacity: usize,
    hits: usize,
    misses: usize,
}

impl QueryCache {
    /// Creates a cache holding at most `capacity` results (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Get a cached result if available
    pub fn get(&mut self, key: &QueryCacheKey) -> Option<&OptionSet> {
        if let Some(options) = self.entries.get(key) {
            self.hits += 1;
            Some(options)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Insert a result, evicting the oldest entry when full
    pub fn insert(&mut self, key: QueryCacheKey, options: OptionSet) {
        if self.entries.insert(key.clone(), options).is_some() {
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    /// Drop every result for one variable, e.g. on an explicit refresh
    pub fn invalidate_variable(&mut self, variable_name: &str) {
        self.entries.retain(|key, _| key.variable_name != variable_name);
        self.order.retain(|key| key.variable_name != variable_name);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics as `(hits, misses)`
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    /// Calculate hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}
