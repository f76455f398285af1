use std::collections::HashMap;

use tracing::{debug, error};

use crate::source::{self, JourneyTimeShard, JsonSource, StopJourneyTimes};

/// Shard key for a stop: its first two characters, or the whole id when shorter.
pub fn shard_key(stop_id: &str) -> &str {
    match stop_id.char_indices().nth(2) {
        Some((end, _)) => &stop_id[..end],
        None => stop_id,
    }
}

/// Journey-time shards fetched during one run.
///
/// Shards are fetched lazily, the first time a stop with a given prefix is looked up.
/// A failed fetch is not remembered, so a later stop in the same shard tries again.
#[derive(Debug, Default)]
pub struct ShardCache {
    shards: HashMap<String, JourneyTimeShard>,
    failures: usize,
}

impl ShardCache {
    pub fn new() -> Self {
        Default::default()
    }

    /// Outgoing journey times recorded for `stop_id`.
    ///
    /// `None` means nothing is known, either because the shard has no entry for the stop or
    /// because the shard could not be fetched. Fetch failures are logged and never returned.
    pub fn journey_time_for<S: JsonSource>(
        &mut self,
        source: &S,
        config: &source::Config,
        stop_id: &str,
    ) -> Option<&StopJourneyTimes> {
        let key = shard_key(stop_id);
        if !self.shards.contains_key(key) {
            let url = config.shard_url(key);
            match source.fetch_json::<JourneyTimeShard>(&url) {
                Ok(shard) => {
                    debug!("Fetched shard {key} with {} stops", shard.len());
                    self.shards.insert(key.to_string(), shard);
                }
                Err(err) => {
                    error!("Error fetching data for stop {stop_id}: {err}");
                    self.failures += 1;
                    return None;
                }
            }
        }
        self.shards.get(key).and_then(|shard| shard.get(stop_id))
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.shards.contains_key(key)
    }

    /// Number of shards fetched successfully.
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Number of failed shard fetches, retries included.
    pub fn failures(&self) -> usize {
        self.failures
    }
}
