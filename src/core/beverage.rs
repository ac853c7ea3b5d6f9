//! Static beverage catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Catalog entry describing how to brew one beverage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeverageSpec {
    pub name: &'static str,
    /// How long the brew process runs.
    pub brew_time: Duration,
    /// Water cost in percent of a full tank.
    pub water: u8,
    /// Coffee cost in percent of a full hopper.
    pub coffee: u8,
}

/// A beverage the machine knows how to make.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Beverage {
    Espresso,
    Cappuccino,
    Americano,
}

const ESPRESSO: BeverageSpec = BeverageSpec {
    name: "espresso",
    brew_time: Duration::from_secs(3),
    water: 3,
    coffee: 7,
};

const CAPPUCCINO: BeverageSpec = BeverageSpec {
    name: "cappuccino",
    brew_time: Duration::from_secs(5),
    water: 15,
    coffee: 7,
};

const AMERICANO: BeverageSpec = BeverageSpec {
    name: "americano",
    brew_time: Duration::from_secs(4),
    water: 20,
    coffee: 7,
};

impl Beverage {
    /// The full catalog, in menu order.
    pub const ALL: [Beverage; 3] = [Self::Espresso, Self::Cappuccino, Self::Americano];

    pub fn spec(&self) -> &'static BeverageSpec {
        match self {
            Self::Espresso => &ESPRESSO,
            Self::Cappuccino => &CAPPUCCINO,
            Self::Americano => &AMERICANO,
        }
    }

    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    /// Names of every beverage on the menu.
    pub fn menu() -> Vec<&'static str> {
        Self::ALL.iter().map(Beverage::name).collect()
    }
}

impl fmt::Display for Beverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a beverage name is not on the menu.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown beverage '{0}'")]
pub struct UnknownBeverage(pub String);

impl FromStr for Beverage {
    type Err = UnknownBeverage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| UnknownBeverage(s.to_string()))
    }
}
