use crate::shared::geo::Distance;

pub struct Config {
    /// Stops closer than this are listed as each other's nearby stops.
    pub nearby_radius: Distance,
    /// Decimal places kept on journey times.
    pub precision: usize,
    pub pretty_file_name: String,
    pub compact_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nearby_radius: Distance::from_kilometers(0.3),
            precision: 2,
            pretty_file_name: "routeTimeList.json".into(),
            compact_file_name: "routeTimeList.min.json".into(),
        }
    }
}
