//! On-disk JSON layout of the class database
//!
//! ```json
//! {
//!   "version": 1,
//!   "constants": { "OK": 0, "FAILED": 1 },
//!   "classes": [
//!     { "name": "Object" },
//!     {
//!       "name": "LineEdit",
//!       "parent": "Object",
//!       "methods": [
//!         { "name": "get_max_length", "returns": "int" },
//!         { "name": "set_max_length", "args": ["int"] }
//!       ],
//!       "properties": [
//!         { "name": "max_length", "type": "int",
//!           "getter": "get_max_length", "setter": "set_max_length" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Version of the layout this crate reads
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RawDatabase {
    pub version: u32,
    #[serde(default)]
    pub classes: Vec<RawClass>,
    #[serde(default)]
    pub constants: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RawClass {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub methods: Vec<RawMethod>,
    #[serde(default)]
    pub properties: Vec<RawProperty>,
    #[serde(default)]
    pub constants: BTreeMap<String, i64>,
    #[serde(default)]
    pub signals: Vec<RawSignal>,
    #[serde(default)]
    pub singleton: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singleton_name: Option<String>,
    #[serde(default = "default_instantiable")]
    pub instantiable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RawMethod {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_return")]
    pub returns: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RawProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub getter: String,
    #[serde(default)]
    pub setter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RawSignal {
    pub name: String,
}

fn default_instantiable() -> bool {
    true
}

fn default_return() -> String {
    "nil".to_string()
}
