use serde::{Deserialize, Serialize};

/// Settings applied across one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Default `MDEL` for ai and longin records that do not set one. Set to -1
    /// to make those records post an update on every scan.
    #[serde(default)]
    pub mdel_default: Option<i64>,
}
