use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "h")]
    House,

    #[serde(rename = "t")]
    Townhouse,

    #[serde(rename = "u")]
    Unit,
}

impl PropertyType {
    /// Fixed category order of the property type chart.
    pub const ALL: [PropertyType; 3] = [Self::House, Self::Townhouse, Self::Unit];

    pub const fn code(self) -> &'static str {
        match self {
            Self::House => "h",
            Self::Townhouse => "t",
            Self::Unit => "u",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::House => "House",
            Self::Townhouse => "Townhouse",
            Self::Unit => "Unit",
        }
    }
}

impl FromStr for PropertyType {
    type Err = UnknownPropertyType;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code {
            "h" => Ok(Self::House),
            "t" => Ok(Self::Townhouse),
            "u" => Ok(Self::Unit),
            _ => Err(UnknownPropertyType),
        }
    }
}

impl Display for PropertyType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("expected one of `h`, `t` or `u`")]
pub struct UnknownPropertyType;
