use std::collections::VecDeque;

use dashmap::DashMap;

/// How many delivered links are remembered per source.
pub const SEEN_CAPACITY: usize = 20;

/// Bounded FIFO of delivered links for one source, most recent last.
#[derive(Debug, Clone)]
pub struct SeenSet {
    links: VecDeque<String>,
    capacity: usize,
}

impl SeenSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            links: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn contains(&self, link: &str) -> bool {
        self.links.iter().any(|l| l == link)
    }

    /// Append `link`, evicting the oldest entries beyond capacity.
    /// A link that is already present moves to the most recent position.
    pub fn record(&mut self, link: &str) {
        if let Some(pos) = self.links.iter().position(|l| l == link) {
            self.links.remove(pos);
        }
        self.links.push_back(link.to_string());

        while self.links.len() > self.capacity {
            self.links.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(String::as_str)
    }
}

/// In-memory record of what has been delivered, per source name.
///
/// Each source's set sits behind its own shard guard, so updates to one
/// source are serialized while different sources rarely contend.
#[derive(Debug)]
pub struct SeenRegistry {
    sets: DashMap<String, SeenSet>,
    capacity: usize,
}

impl Default for SeenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SeenRegistry {
    pub fn new() -> Self {
        Self::with_capacity(SEEN_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sets: DashMap::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn has(&self, source: &str, link: &str) -> bool {
        self.sets
            .get(source)
            .is_some_and(|set| set.contains(link))
    }

    pub fn record(&self, source: &str, link: &str) {
        self.sets
            .entry(source.to_string())
            .or_insert_with(|| SeenSet::new(self.capacity))
            .record(link);
    }

    /// Drop everything remembered for `source`.
    pub fn forget(&self, source: &str) -> bool {
        self.sets.remove(source).is_some()
    }

    /// Drop memory for every source the predicate rejects.
    pub fn retain<F>(&self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.sets.len();
        self.sets.retain(|name, _| keep(name));
        before.saturating_sub(self.sets.len())
    }

    /// Copy of one source's memory, oldest first.
    pub fn snapshot(&self, source: &str) -> Vec<String> {
        self.sets
            .get(source)
            .map(|set| set.links().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn source_count(&self) -> usize {
        self.sets.len()
    }
}
