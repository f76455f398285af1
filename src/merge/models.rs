use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    shared::geo::Coordinate,
    source::{SourceRoute, SourceStop},
};

/// Origin stop id to destination stop id to minimal travel time.
pub type JourneyTimes = IndexMap<String, IndexMap<String, f64>>;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Route {
    pub route: String,
    pub co: Vec<String>,
    pub stops: IndexMap<String, Vec<String>>,
}

impl From<SourceRoute> for Route {
    fn from(value: SourceRoute) -> Self {
        Self {
            route: value.route,
            co: value.co,
            stops: value.stops,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Stop {
    pub location: Coordinate,
    #[serde(flatten)]
    pub details: Map<String, Value>,
    /// Companies serving the stop, in order of first appearance.
    pub co: Vec<String>,
    pub nearby: Vec<String>,
}

impl From<&SourceStop> for Stop {
    fn from(value: &SourceStop) -> Self {
        let mut details = value.details.clone();
        // Both are derived here, never taken from the source record
        details.shift_remove("co");
        details.shift_remove("nearby");
        Self {
            location: value.location,
            details,
            co: Vec::new(),
            nearby: Vec::new(),
        }
    }
}

impl Stop {
    /// Records that `co` serves this stop. Returns false when it was already known.
    pub fn add_company(&mut self, co: &str) -> bool {
        if self.co.iter().any(|known| known == co) {
            false
        } else {
            self.co.push(co.to_string());
            true
        }
    }
}

/// The merged data sheet, as written to disk.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteTimeList {
    pub route_list: IndexMap<String, Route>,
    pub stop_list: IndexMap<String, Stop>,
    pub journey_times: JourneyTimes,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub routes: usize,
    pub dropped_routes: usize,
    pub stops: usize,
    pub journey_times: usize,
    pub shards: usize,
    pub shard_failures: usize,
    pub nearby_links: usize,
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} routes ({} dropped), {} stops, {} journey times from {} shards ({} failed fetches), {} nearby links",
            self.routes,
            self.dropped_routes,
            self.stops,
            self.journey_times,
            self.shards,
            self.shard_failures,
            self.nearby_links
        )
    }
}
