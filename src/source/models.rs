use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::shared::geo::Coordinate;

/// Root data sheet. Only the two tables the merge needs are read, the rest is ignored.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RouteFareList {
    pub route_list: IndexMap<String, SourceRoute>,
    pub stop_list: IndexMap<String, SourceStop>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SourceRoute {
    pub route: String,
    pub co: Vec<String>,
    /// Company code to ordered stop ids.
    #[serde(default)]
    pub stops: IndexMap<String, Vec<String>>,
}

impl SourceRoute {
    pub fn has_stops(&self) -> bool {
        self.stops.values().any(|stops| !stops.is_empty())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SourceStop {
    pub location: Coordinate,
    /// Names and any other attribute, carried through untouched.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Destination stop id to travel time, for a single origin stop.
pub type StopJourneyTimes = HashMap<String, f64>;

/// One journey-time document: origin stop id to its outgoing times.
pub type JourneyTimeShard = HashMap<String, StopJourneyTimes>;
