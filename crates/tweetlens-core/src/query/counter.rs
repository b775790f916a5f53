use std::collections::HashMap;
use std::hash::Hash;

/// Ranks `(key, count)` pairs: count descending, then key ascending.
pub fn top_n<K: Ord>(entries: impl IntoIterator<Item = (K, u64)>, n: usize) -> Vec<(K, u64)> {
    let mut ranked: Vec<(K, u64)> = entries.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}

pub fn merge_counts<K: Hash + Eq>(into: &mut HashMap<K, u64>, from: HashMap<K, u64>) {
    for (key, count) in from {
        *into.entry(key).or_insert(0) += count;
    }
}

/// Counter that periodically drops all but its heaviest keys.
///
/// Counts are exact until the first prune; afterwards keys that were dropped
/// restart from zero if seen again, so the result is a heavy-hitter
/// approximation. A capacity of 0 never prunes.
#[derive(Debug)]
pub struct BoundedCounter<K> {
    counts: HashMap<K, u64>,
    capacity: usize,
    prune_every: u64,
    observed_records: u64,
    observed_keys: u64,
    prunes: u64,
}

impl<K: Hash + Eq + Ord + Clone> BoundedCounter<K> {
    pub fn new(capacity: usize, prune_every: u64) -> Self {
        Self {
            counts: HashMap::new(),
            capacity,
            prune_every: prune_every.max(1),
            observed_records: 0,
            observed_keys: 0,
            prunes: 0,
        }
    }

    /// Counts every key from one record, then prunes if the period elapsed.
    pub fn observe(&mut self, keys: impl IntoIterator<Item = K>) {
        for key in keys {
            *self.counts.entry(key).or_insert(0) += 1;
            self.observed_keys += 1;
        }
        self.observed_records += 1;
        if self.should_prune() {
            self.prune();
        }
    }

    fn should_prune(&self) -> bool {
        self.capacity > 0
            && self.observed_records % self.prune_every == 0
            && self.counts.len() > self.capacity
    }

    fn prune(&mut self) {
        let before = self.counts.len();
        let kept = top_n(self.counts.drain(), self.capacity);
        self.counts.extend(kept);
        self.prunes += 1;
        tracing::info!(
            before,
            after = self.counts.len(),
            records = self.observed_records,
            keys_seen = self.observed_keys,
            "pruned bounded counter"
        );
    }

    pub fn records(&self) -> u64 {
        self.observed_records
    }

    pub fn keys_seen(&self) -> u64 {
        self.observed_keys
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn prunes(&self) -> u64 {
        self.prunes
    }

    pub fn top(&self, n: usize) -> Vec<(K, u64)> {
        top_n(self.counts.iter().map(|(k, v)| (k.clone(), *v)), n)
    }
}
