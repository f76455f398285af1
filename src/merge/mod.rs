use std::{io, time::Instant};

use indexmap::{IndexMap, map::Entry};
use thiserror::Error;
use tracing::{debug, info};

mod config;
pub mod models;
pub mod nearby;
pub mod writer;
pub use config::*;
pub use models::*;
pub use writer::*;

use crate::{
    journey::ShardCache,
    source::{self, HttpSource, JsonSource, RouteFareList, SourceRoute, SourceStop},
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Source error: {0}")]
    Source(#[from] source::Error),
    #[error("Route {route} references stop {stop} missing from the stop list")]
    UnknownStop { route: String, stop: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Builds the merged route time list from a route fare list and the journey-time shards.
///
/// One merger handles one run: the shard cache lives as long as the merger does.
pub struct Merger<S> {
    source: S,
    source_config: source::Config,
    config: self::Config,
    shards: ShardCache,
    summary: Summary,
}

impl Merger<HttpSource> {
    pub fn from_config(
        source_config: source::Config,
        config: self::Config,
    ) -> Result<Self, self::Error> {
        let source = HttpSource::new(&source_config)?;
        Ok(Self::new(source, source_config, config))
    }
}

impl<S: JsonSource> Merger<S> {
    pub fn new(source: S, source_config: source::Config, config: self::Config) -> Self {
        Self {
            source,
            source_config,
            config,
            shards: ShardCache::new(),
            summary: Summary::default(),
        }
    }

    pub fn config(&self) -> &self::Config {
        &self.config
    }

    /// Counters of the last merge.
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Fetches the route fare list and merges it. A failure to fetch the route fare list is fatal.
    pub fn run(&mut self) -> Result<RouteTimeList, self::Error> {
        let sheet = self.load()?;
        self.merge(sheet)
    }

    pub fn load(&self) -> Result<RouteFareList, self::Error> {
        debug!("Loading route fare list...");
        let now = Instant::now();
        let sheet: RouteFareList = self
            .source
            .fetch_json(&self.source_config.route_fare_list_url)?;
        debug!(
            "Loading route fare list took {:?} ({} routes, {} stops)",
            now.elapsed(),
            sheet.route_list.len(),
            sheet.stop_list.len()
        );
        Ok(sheet)
    }

    pub fn merge(&mut self, sheet: RouteFareList) -> Result<RouteTimeList, self::Error> {
        let RouteFareList {
            route_list,
            stop_list,
        } = sheet;
        let mut output = RouteTimeList::default();
        self.summary = Summary::default();

        self.load_routes(&mut output, route_list);
        self.load_stops(&mut output, &stop_list)?;
        self.load_journey_times(&mut output);
        self.generate_nearby(&mut output);

        self.summary.shards = self.shards.len();
        self.summary.shard_failures = self.shards.failures();
        info!("Merged {}", self.summary);
        Ok(output)
    }

    fn load_routes(&mut self, output: &mut RouteTimeList, route_list: IndexMap<String, SourceRoute>) {
        debug!("Loading routes...");
        let now = Instant::now();
        for (key, route) in route_list {
            if route.has_stops() {
                output.route_list.insert(key, route.into());
            } else {
                debug!("Dropping route {key} without stops");
                self.summary.dropped_routes += 1;
            }
        }
        self.summary.routes = output.route_list.len();
        debug!("Loading routes took {:?}", now.elapsed());
    }

    fn load_stops(
        &mut self,
        output: &mut RouteTimeList,
        stop_list: &IndexMap<String, SourceStop>,
    ) -> Result<(), self::Error> {
        debug!("Loading stops...");
        let now = Instant::now();
        for (key, route) in &output.route_list {
            for (co, stops) in &route.stops {
                for stop_id in stops {
                    let stop = match output.stop_list.entry(stop_id.clone()) {
                        Entry::Occupied(entry) => entry.into_mut(),
                        Entry::Vacant(entry) => {
                            let source = stop_list.get(stop_id).ok_or_else(|| {
                                self::Error::UnknownStop {
                                    route: key.clone(),
                                    stop: stop_id.clone(),
                                }
                            })?;
                            entry.insert(source.into())
                        }
                    };
                    stop.add_company(co);
                }
            }
        }
        self.summary.stops = output.stop_list.len();
        debug!("Loading stops took {:?}", now.elapsed());
        Ok(())
    }

    fn load_journey_times(&mut self, output: &mut RouteTimeList) {
        debug!("Loading journey times...");
        let now = Instant::now();
        for route in output.route_list.values() {
            for stops in route.stops.values() {
                for pair in stops.windows(2) {
                    let (from, to) = (&pair[0], &pair[1]);
                    let times = output.journey_times.entry(from.clone()).or_default();
                    let Some(time) = self
                        .shards
                        .journey_time_for(&self.source, &self.source_config, from)
                        .and_then(|times| times.get(to))
                        .copied()
                    else {
                        continue;
                    };
                    let time = round_to(time, self.config.precision);
                    match times.get_mut(to) {
                        Some(known) if *known <= time => {}
                        Some(known) => *known = time,
                        None => {
                            times.insert(to.clone(), time);
                        }
                    }
                }
            }
        }
        self.summary.journey_times = output.journey_times.values().map(|times| times.len()).sum();
        debug!("Loading journey times took {:?}", now.elapsed());
    }

    fn generate_nearby(&mut self, output: &mut RouteTimeList) {
        debug!("Generating nearby stops...");
        let now = Instant::now();
        let coordinates: Vec<_> = output.stop_list.values().map(|stop| stop.location).collect();
        let found = nearby::within_radius(&coordinates, self.config.nearby_radius);

        let ids: Vec<String> = output.stop_list.keys().cloned().collect();
        output
            .stop_list
            .values_mut()
            .zip(found)
            .for_each(|(stop, indexes)| {
                stop.nearby = indexes.into_iter().map(|i| ids[i].clone()).collect();
            });
        self.summary.nearby_links = output.stop_list.values().map(|stop| stop.nearby.len()).sum();
        debug!("Generating nearby stops took {:?}", now.elapsed());
    }
}

/// Rounds the exact binary value to `precision` decimal places, ties to even.
///
/// Going through the decimal expansion avoids the false ties scaling creates,
/// e.g. 0.015 is stored just below the tie and rounds down to 0.01.
pub fn round_to(value: f64, precision: usize) -> f64 {
    format!("{value:.precision$}").parse().unwrap_or(value)
}

#[test]
fn round_to_test() {
    assert_eq!(round_to(3.456, 2), 3.46);
    assert_eq!(round_to(1.2, 2), 1.2);
    assert_eq!(round_to(0.125, 2), 0.12);
    assert_eq!(round_to(7.0, 2), 7.0);
    assert_eq!(round_to(59.999, 2), 60.0);
    assert_eq!(round_to(0.005, 2), 0.01);
    assert_eq!(round_to(0.015, 2), 0.01);
    assert_eq!(round_to(0.075, 2), 0.07);
    assert_eq!(round_to(0.155, 2), 0.15);
    assert_eq!(round_to(2.675, 2), 2.67);
}
