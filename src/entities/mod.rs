mod candidate;
mod contour;
mod coordinate;
mod journey;
mod profile;

pub use candidate::{Candidate, Located, SearchArea};
pub use contour::Contour;
pub use coordinate::Coordinate;
pub use journey::{Journey, JourneyRequest};
pub use profile::TravelProfile;
