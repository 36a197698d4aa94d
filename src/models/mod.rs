pub mod aggregate;
pub mod catalog;
pub mod observation;
pub mod station;

pub use aggregate::{AggregateRow, GroupKey, MinMaxAccumulator, TickReport};
pub use catalog::StationCatalog;
pub use observation::{EnrichedObservation, WeatherObservation};
pub use station::{StationKey, StationRecord};
