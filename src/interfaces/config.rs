use crate::application::switch::Identity;
use crate::domain::money::RateTable;
use crate::domain::peer::PeerInfo;
use crate::error::{Result, SwitchError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One configured exchange rate: `1 from = rate to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSpec {
    pub from: String,
    pub to: String,
    pub rate: Decimal,
}

/// Switch configuration, read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SwitchConfig {
    /// Own address of the switch.
    #[serde(default = "default_address")]
    pub address: String,
    /// Own FSP id of the switch.
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default = "default_rates")]
    pub rates: Vec<RateSpec>,
    /// Peers registered at start-up.
    #[serde(default)]
    pub peers: Vec<PeerInfo>,
}

fn default_address() -> String {
    Identity::default().address
}

fn default_id() -> String {
    Identity::default().id
}

fn default_rates() -> Vec<RateSpec> {
    vec![RateSpec {
        from: "USD".to_string(),
        to: "XOF".to_string(),
        rate: dec!(579.59),
    }]
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            id: default_id(),
            rates: default_rates(),
            peers: Vec::new(),
        }
    }
}

impl SwitchConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            SwitchError::Config(format!("cannot open {}: {e}", path.as_ref().display()))
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        serde_json::from_reader(source).map_err(|e| SwitchError::Config(e.to_string()))
    }

    pub fn identity(&self) -> Identity {
        Identity {
            address: self.address.clone(),
            id: self.id.clone(),
        }
    }

    pub fn rate_table(&self) -> Result<RateTable> {
        let mut table = RateTable::new();
        for spec in &self.rates {
            table.insert(&spec.from, &spec.to, spec.rate)?;
        }
        Ok(table)
    }
}
