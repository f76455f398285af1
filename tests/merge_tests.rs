use reqwest::StatusCode;
use routetime::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;

const ROOT_URL: &str = "memory://routeFareList.min.json";
const TIMES_URL: &str = "memory://times";

#[derive(Default)]
struct MemorySource {
    documents: HashMap<String, Value>,
}

impl MemorySource {
    fn with(mut self, url: impl Into<String>, document: Value) -> Self {
        self.documents.insert(url.into(), document);
        self
    }

    fn with_shard(self, key: &str, document: Value) -> Self {
        self.with(format!("{TIMES_URL}/{key}.json"), document)
    }
}

impl JsonSource for MemorySource {
    fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, source::Error> {
        match self.documents.get(url) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Err(source::Error::Status {
                url: url.to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            }),
        }
    }
}

fn merger(source: MemorySource) -> Merger<MemorySource> {
    let source_config = source::Config {
        route_fare_list_url: ROOT_URL.into(),
        journey_time_base_url: TIMES_URL.into(),
        ..Default::default()
    };
    Merger::new(source, source_config, merge::Config::default())
}

fn stop(lat: f64, lng: f64, name: &str) -> Value {
    json!({"location": {"lat": lat, "lng": lng}, "name": {"en": name}})
}

fn three_stop_sheet() -> Value {
    json!({
        "routeList": {
            "R+1+A+B": {"route": "R", "co": ["A"], "stops": {"A": ["S1", "S2", "S3"]}, "fares": ["4.5"]}
        },
        "stopList": {
            "S1": stop(22.0, 114.0, "One"),
            "S2": stop(22.001, 114.0, "Two"),
            "S3": stop(22.01, 114.0, "Three"),
            "S4": stop(22.0, 114.0005, "Unused")
        },
        "holidays": []
    })
}

#[test]
fn minimal_journey_times_are_rounded() {
    let source = MemorySource::default()
        .with(ROOT_URL, three_stop_sheet())
        .with_shard("S1", json!({"S1": {"S2": 3.456, "S9": 8.0}}))
        .with_shard("S2", json!({"S2": {"S3": 1.2}}));
    let data = merger(source).run().unwrap();

    assert_eq!(
        serde_json::to_value(&data.journey_times).unwrap(),
        json!({"S1": {"S2": 3.46}, "S2": {"S3": 1.2}})
    );
}

#[test]
fn nearby_stops_are_symmetric() {
    let source = MemorySource::default().with(ROOT_URL, three_stop_sheet());
    let data = merger(source).run().unwrap();

    assert_eq!(data.stop_list["S1"].nearby, vec!["S2"]);
    assert_eq!(data.stop_list["S2"].nearby, vec!["S1"]);
    assert!(data.stop_list["S3"].nearby.is_empty());
    // Only stops served by a kept route take part
    assert!(!data.stop_list.contains_key("S4"));
    for (id, stop) in &data.stop_list {
        assert!(!stop.nearby.contains(id));
        for other in &stop.nearby {
            assert!(data.stop_list[other].nearby.contains(id));
        }
    }
}

#[test]
fn routes_without_stops_are_dropped() {
    let sheet = json!({
        "routeList": {
            "empty": {"route": "1", "co": ["A"], "stops": {}},
            "blank": {"route": "2", "co": ["A", "B"], "stops": {"A": [], "B": []}},
            "kept": {"route": "3", "co": ["A", "B"], "stops": {"A": [], "B": ["S1"]}},
            "missing": {"route": "4", "co": ["A"]}
        },
        "stopList": {"S1": stop(22.0, 114.0, "One")}
    });
    let mut merger = merger(MemorySource::default().with(ROOT_URL, sheet));
    let data = merger.run().unwrap();

    assert_eq!(data.route_list.keys().collect::<Vec<_>>(), vec!["kept"]);
    let kept = &data.route_list["kept"];
    assert_eq!(kept.route, "3");
    assert_eq!(kept.co, vec!["A", "B"]);
    assert!(kept.stops["A"].is_empty());
    assert_eq!(kept.stops["B"], vec!["S1"]);
    assert_eq!(merger.summary().routes, 1);
    assert_eq!(merger.summary().dropped_routes, 3);
}

#[test]
fn companies_are_collected_without_duplicates() {
    let sheet = json!({
        "routeList": {
            "r1": {"route": "1", "co": ["kmb", "ctb"], "stops": {"kmb": ["S1", "S2"], "ctb": ["S1", "S2"]}},
            "r2": {"route": "2", "co": ["kmb"], "stops": {"kmb": ["S2", "S3", "S2"]}},
            "r3": {"route": "3", "co": ["nlb"], "stops": {"nlb": ["S3"]}}
        },
        "stopList": {
            "S1": stop(22.0, 114.0, "One"),
            "S2": stop(22.1, 114.0, "Two"),
            "S3": stop(22.2, 114.0, "Three")
        }
    });
    let data = merger(MemorySource::default().with(ROOT_URL, sheet))
        .run()
        .unwrap();

    assert_eq!(data.stop_list["S1"].co, vec!["kmb", "ctb"]);
    assert_eq!(data.stop_list["S2"].co, vec!["kmb", "ctb"]);
    assert_eq!(data.stop_list["S3"].co, vec!["kmb", "nlb"]);
    assert_eq!(
        data.stop_list.keys().collect::<Vec<_>>(),
        vec!["S1", "S2", "S3"]
    );
    assert_eq!(data.stop_list["S1"].details["name"], json!({"en": "One"}));
}

#[test]
fn shared_pairs_are_recorded_once() {
    let sheet = json!({
        "routeList": {
            "r1": {"route": "1", "co": ["kmb"], "stops": {"kmb": ["AA1", "AA2"]}},
            "r2": {"route": "2", "co": ["ctb"], "stops": {"ctb": ["AA1", "AA2", "AA3"]}}
        },
        "stopList": {
            "AA1": stop(22.0, 114.0, "One"),
            "AA2": stop(22.1, 114.0, "Two"),
            "AA3": stop(22.2, 114.0, "Three")
        }
    });
    let source = MemorySource::default()
        .with(ROOT_URL, sheet)
        .with_shard("AA", json!({"AA1": {"AA2": 60.004}, "AA2": {"AA3": 45}}));
    let mut merger = merger(source);
    let data = merger.run().unwrap();

    assert_eq!(
        serde_json::to_value(&data.journey_times).unwrap(),
        json!({"AA1": {"AA2": 60.0}, "AA2": {"AA3": 45.0}})
    );
    let mut buf = Vec::new();
    merge::write_compact(&mut buf, &data.journey_times).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        r#"{"AA1":{"AA2":60.0},"AA2":{"AA3":45.0}}"#
    );
    assert_eq!(merger.summary().shards, 1);
    assert_eq!(merger.summary().journey_times, 2);
}

#[test]
fn failed_shard_leaves_pairs_out() {
    let sheet = json!({
        "routeList": {
            "r1": {"route": "1", "co": ["kmb"], "stops": {"kmb": ["XX1", "XX2", "YY1", "YY2"]}}
        },
        "stopList": {
            "XX1": stop(22.0, 114.0, "One"),
            "XX2": stop(22.1, 114.0, "Two"),
            "YY1": stop(22.2, 114.0, "Three"),
            "YY2": stop(22.3, 114.0, "Four")
        }
    });
    let source = MemorySource::default()
        .with(ROOT_URL, sheet)
        .with_shard("YY", json!({"YY1": {"YY2": 2.5}}));
    let mut merger = merger(source);
    let data = merger.run().unwrap();

    assert!(data.journey_times["XX1"].is_empty());
    assert!(data.journey_times["XX2"].is_empty());
    assert_eq!(data.journey_times["YY1"]["YY2"], 2.5);
    assert_eq!(merger.summary().shard_failures, 2);
    assert_eq!(data.stop_list.len(), 4);
}

#[test]
fn unknown_stop_is_an_error() {
    let sheet = json!({
        "routeList": {"r1": {"route": "1", "co": ["kmb"], "stops": {"kmb": ["S1", "GHOST"]}}},
        "stopList": {"S1": stop(22.0, 114.0, "One")}
    });
    let result = merger(MemorySource::default().with(ROOT_URL, sheet)).run();
    match result {
        Err(merge::Error::UnknownStop { route, stop }) => {
            assert_eq!(route, "r1");
            assert_eq!(stop, "GHOST");
        }
        other => panic!("expected unknown stop, got {other:?}"),
    }
}

#[test]
fn missing_route_fare_list_is_fatal() {
    let result = merger(MemorySource::default()).run();
    assert!(matches!(
        result,
        Err(merge::Error::Source(source::Error::Status { .. }))
    ));
}

#[test]
fn merging_is_deterministic() {
    let build = || {
        let source = MemorySource::default()
            .with(ROOT_URL, three_stop_sheet())
            .with_shard("S1", json!({"S1": {"S2": 3.456}}))
            .with_shard("S2", json!({"S2": {"S3": 1.2}}));
        let data = merger(source).run().unwrap();
        let mut buf = Vec::new();
        merge::write_compact(&mut buf, &data).unwrap();
        buf
    };
    assert_eq!(build(), build());
}
