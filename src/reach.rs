use std::{collections::HashSet, time::Instant};

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    merge::RouteTimeList,
    shared::geo::{Coordinate, Distance},
};

pub struct Config {
    /// Company codes a traveller is willing to use.
    pub modes: Vec<String>,
    /// Company codes whose interchanges are cheap and never counted.
    pub train_operators: Vec<String>,
    /// Interchanges allowed, exclusive.
    pub max_interchanges: u32,
    pub walking_speed_kmh: f64,
    pub walkable_distance: Distance,
    /// Seconds added for an interchange onto anything but a train.
    pub interchange_time: f64,
    /// Seconds added for an interchange onto a train.
    pub train_interchange_time: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            modes: [
                "kmb",
                "ctb",
                "nlb",
                "gmb",
                "mtr",
                "lightRail",
                "lrtfeeder",
                "hkkf",
                "sunferry",
                "fortuneferry",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            train_operators: vec!["mtr".into(), "lightRail".into()],
            max_interchanges: 1,
            walking_speed_kmh: 5.1,
            walkable_distance: Distance::from_kilometers(1.5),
            interchange_time: 900.0,
            train_interchange_time: 90.0,
        }
    }
}

impl Config {
    pub fn serves(&self, co: &str) -> bool {
        self.modes.iter().any(|mode| mode == co)
    }

    pub fn is_train(&self, co: &str) -> bool {
        self.train_operators.iter().any(|train| train == co)
    }

    /// Seconds needed to walk `distance`.
    pub fn walking_time(&self, distance: Distance) -> f64 {
        distance.as_kilometers() / (self.walking_speed_kmh / 3600.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrival {
    /// Seconds since leaving the origin.
    pub travel_time: f64,
    pub interchanges: u32,
}

/// Stops reachable from an origin, on foot and by riding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reachability {
    pub origin: Coordinate,
    pub walks: IndexMap<String, Arrival>,
    pub rides: IndexMap<String, Arrival>,
}

impl Reachability {
    /// Earliest known arrival at `stop_id`, walking or riding.
    pub fn travel_time(&self, stop_id: &str) -> Option<f64> {
        [self.walks.get(stop_id), self.rides.get(stop_id)]
            .into_iter()
            .flatten()
            .map(|arrival| arrival.travel_time)
            .reduce(f64::min)
    }

    /// Heat points: the origin at zero, every walked-to stop, then every ridden-to stop.
    pub fn points(&self, data: &RouteTimeList) -> Vec<(Coordinate, f64)> {
        let located = |(id, arrival): (&String, &Arrival)| {
            data.stop_list
                .get(id)
                .map(|stop| (stop.location, arrival.travel_time))
        };
        std::iter::once((self.origin, 0.0))
            .chain(self.walks.iter().filter_map(located))
            .chain(self.rides.iter().filter_map(located))
            .collect()
    }
}

struct Ride<'a> {
    co: &'a str,
    stops: &'a [String],
}

/// Travel times from `origin` to every stop reachable within the interchange limit.
///
/// Walks to every stop within walking distance, then repeatedly boards every unused route at
/// the furthest stop reached so far and interchanges through each stop's nearby list.
/// Hops without a recorded journey time end the ride.
pub fn reachable(data: &RouteTimeList, origin: Coordinate, config: &Config) -> Reachability {
    let now = Instant::now();
    let walks = walk_to_stops(data, origin, config);

    let mut rides: IndexMap<String, Arrival> = IndexMap::new();
    let mut used: HashSet<&str> = HashSet::new();
    let mut starts = walks.clone();
    let mut round = 0;
    while !starts.is_empty() {
        let boarded = board(data, &starts, &mut used, config);
        if boarded.is_empty() {
            break;
        }
        round += 1;

        let mut reached: IndexMap<String, Arrival> = IndexMap::new();
        for ride in &boarded {
            let Some(start) = starts.get(&ride.stops[0]) else {
                continue;
            };
            let mut travel_time = start.travel_time;
            for pair in ride.stops.windows(2) {
                let Some(step) = data
                    .journey_times
                    .get(&pair[0])
                    .and_then(|times| times.get(&pair[1]))
                else {
                    break;
                };
                travel_time += step;
                if data.stop_list.contains_key(&pair[1]) {
                    keep_earliest(
                        &mut reached,
                        &pair[1],
                        Arrival {
                            travel_time,
                            interchanges: start.interchanges,
                        },
                    );
                }
            }
        }

        let mut next: IndexMap<String, Arrival> = IndexMap::new();
        for ride in &boarded {
            for stop_id in ride.stops {
                let Some(arrival) = reached.get(stop_id) else {
                    continue;
                };
                if let Some(stop) = data.stop_list.get(stop_id) {
                    for nearby in &stop.nearby {
                        let train = data
                            .stop_list
                            .get(nearby)
                            .is_some_and(|other| other.co.iter().any(|co| config.is_train(co)));
                        interchange(&mut next, nearby, arrival, train, config);
                    }
                }
                interchange(&mut next, stop_id, arrival, config.is_train(ride.co), config);
            }
        }

        debug!(
            "Round {round}: {} rides, {} stops reached, {} interchanges",
            boarded.len(),
            reached.len(),
            next.len()
        );
        for (stop_id, arrival) in reached {
            keep_earliest(&mut rides, &stop_id, arrival);
        }
        starts = next;
    }

    debug!("Reachability from {:?} took {:?}", origin, now.elapsed());
    Reachability {
        origin,
        walks,
        rides,
    }
}

fn walk_to_stops(
    data: &RouteTimeList,
    origin: Coordinate,
    config: &Config,
) -> IndexMap<String, Arrival> {
    data.stop_list
        .iter()
        .filter(|(_, stop)| stop.co.iter().any(|co| config.serves(co)))
        .filter_map(|(id, stop)| {
            let distance = origin.distance(&stop.location);
            (distance <= config.walkable_distance).then(|| {
                let arrival = Arrival {
                    travel_time: config.walking_time(distance),
                    interchanges: 0,
                };
                (id.clone(), arrival)
            })
        })
        .collect()
}

/// Rides on every route not used yet, from the last of its stops that is a start stop.
fn board<'a>(
    data: &'a RouteTimeList,
    starts: &IndexMap<String, Arrival>,
    used: &mut HashSet<&'a str>,
    config: &Config,
) -> Vec<Ride<'a>> {
    let mut rides = Vec::new();
    for (key, route) in &data.route_list {
        if used.contains(key.as_str()) {
            continue;
        }
        let mut boarded = false;
        for co in route.co.iter().filter(|co| config.serves(co)) {
            let Some(stops) = route.stops.get(co) else {
                continue;
            };
            let furthest = starts
                .keys()
                .filter_map(|id| stops.iter().position(|stop| stop == id))
                .max();
            if let Some(index) = furthest {
                rides.push(Ride {
                    co,
                    stops: &stops[index..],
                });
                boarded = true;
            }
        }
        if boarded {
            used.insert(key);
        }
    }
    rides
}

fn interchange(
    next: &mut IndexMap<String, Arrival>,
    stop_id: &str,
    arrival: &Arrival,
    train: bool,
    config: &Config,
) {
    let (penalty, interchanges) = if train {
        (config.train_interchange_time, arrival.interchanges)
    } else {
        (config.interchange_time, arrival.interchanges + 1)
    };
    if interchanges < config.max_interchanges {
        let arrival = Arrival {
            travel_time: arrival.travel_time + penalty,
            interchanges,
        };
        keep_earliest(next, stop_id, arrival);
    }
}

fn keep_earliest(arrivals: &mut IndexMap<String, Arrival>, stop_id: &str, arrival: Arrival) {
    match arrivals.get_mut(stop_id) {
        Some(known) if known.travel_time <= arrival.travel_time => {}
        Some(known) => *known = arrival,
        None => {
            arrivals.insert(stop_id.to_string(), arrival);
        }
    }
}
