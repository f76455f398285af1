use std::time::Duration;

pub struct Config {
    pub route_fare_list_url: String,
    pub journey_time_base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            route_fare_list_url: "https://data.hkbus.app/routeFareList.min.json".into(),
            journey_time_base_url: "https://timeinterval.hkbuseta.com/times".into(),
            timeout: Duration::from_secs(30),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl Config {
    /// Location of the journey-time shard holding every stop id starting with `key`.
    pub fn shard_url(&self, key: &str) -> String {
        format!(
            "{}/{}.json",
            self.journey_time_base_url.trim_end_matches('/'),
            key
        )
    }
}

#[test]
fn shard_url_test() {
    let config = Config::default();
    assert_eq!(
        config.shard_url("AB"),
        "https://timeinterval.hkbuseta.com/times/AB.json"
    );

    let config = Config {
        journey_time_base_url: "http://127.0.0.1:1234/times/".into(),
        ..Default::default()
    };
    assert_eq!(config.shard_url("0"), "http://127.0.0.1:1234/times/0.json");
}
