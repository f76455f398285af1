pub mod journey;
pub mod merge;
pub mod reach;
pub mod shared;
pub mod source;

pub mod prelude {
    pub use crate::journey::{ShardCache, shard_key};
    pub use crate::merge::{
        self, JourneyTimes, Merger, Route, RouteTimeList, Stop, Summary, write_files,
    };
    pub use crate::reach::{self, Arrival, Reachability, reachable};
    pub use crate::shared::geo::{Coordinate, Distance, distance_km};
    pub use crate::source::{self, HttpSource, JsonSource, RouteFareList};
}
