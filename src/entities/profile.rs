use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{invalid_input_error, Error};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelProfile {
    #[default]
    Cycling,
    Walking,
    Driving,
}

impl TravelProfile {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cycling => "cycling",
            Self::Walking => "walking",
            Self::Driving => "driving",
        }
    }
}

impl FromStr for TravelProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cycling" => Ok(Self::Cycling),
            "walking" => Ok(Self::Walking),
            "driving" => Ok(Self::Driving),
            other => Err(invalid_input_error(format!("unknown travel profile '{}'", other))),
        }
    }
}

impl fmt::Display for TravelProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
