pub mod observation_parser;
pub mod observation_reader;
pub mod station_reader;

pub use observation_parser::ObservationParser;
pub use observation_reader::{ObservationReader, ObservationText};
pub use station_reader::{StationLoad, StationReader};
