use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// EPICS record types the builder knows how to create.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Ai,
    Ao,
    Longin,
    Longout,
    Bi,
    Bo,
    Stringin,
    Stringout,
    Mbbi,
    Mbbo,
    Waveform,
}

impl RecordType {
    pub const ALL: [RecordType; 11] = [
        RecordType::Longin,
        RecordType::Longout,
        RecordType::Ai,
        RecordType::Ao,
        RecordType::Bi,
        RecordType::Bo,
        RecordType::Stringin,
        RecordType::Stringout,
        RecordType::Mbbi,
        RecordType::Mbbo,
        RecordType::Waveform,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Ai => "ai",
            RecordType::Ao => "ao",
            RecordType::Longin => "longin",
            RecordType::Longout => "longout",
            RecordType::Bi => "bi",
            RecordType::Bo => "bo",
            RecordType::Stringin => "stringin",
            RecordType::Stringout => "stringout",
            RecordType::Mbbi => "mbbi",
            RecordType::Mbbo => "mbbo",
            RecordType::Waveform => "waveform",
        }
    }

    pub fn is_output(&self) -> bool {
        matches!(
            self,
            RecordType::Ao
                | RecordType::Longout
                | RecordType::Bo
                | RecordType::Stringout
                | RecordType::Mbbo
        )
    }

    /// Link field that carries the device address (`INP` or `OUT`).
    pub fn address_field(&self) -> &'static str {
        if self.is_output() {
            "OUT"
        } else {
            "INP"
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alarm severity as used by the `xxSV` fields of multi-state records.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "NO_ALARM")]
    NoAlarm,
    #[serde(rename = "MINOR")]
    Minor,
    #[serde(rename = "MAJOR")]
    Major,
    #[serde(rename = "INVALID")]
    Invalid,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::NoAlarm => "NO_ALARM",
            Severity::Minor => "MINOR",
            Severity::Major => "MAJOR",
            Severity::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field value. `Unset` marks a field that was named but carries no
/// value; it is kept in the field set and skipped when the database is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Unset,
    Int(i64),
    Float(f64),
    Text(String),
    Severity(Severity),
}

impl FieldValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, FieldValue::Unset)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Unset => Ok(()),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Severity(s) => f.write_str(s.as_str()),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<Severity> for FieldValue {
    fn from(v: Severity) -> Self {
        FieldValue::Severity(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Unset, Into::into)
    }
}

/// Named record fields, kept in field-name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, overwriting any previous value.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or overwrite a field.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    /// Insert a field only when it is not already present.
    pub fn set_default(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.0
            .entry(name.to_string())
            .or_insert_with(|| value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A record held by the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub record_type: RecordType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtyp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub fields: Fields,
}

impl Record {
    pub fn new(record_type: RecordType, name: &str, fields: Fields) -> Self {
        Self {
            record_type,
            name: name.to_string(),
            dtyp: None,
            address: None,
            fields,
        }
    }

    /// Set the device type. Any `DTYP` entry in the field set is dropped so
    /// the record carries a single value.
    pub fn set_dtyp(&mut self, dtyp: &str) {
        self.fields.remove("DTYP");
        self.dtyp = Some(dtyp.to_string());
    }

    /// Set the address link, replacing any `INP`/`OUT` field entry.
    pub fn set_address(&mut self, address: String) {
        self.fields.remove(self.record_type.address_field());
        self.address = Some(address);
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn has_description(&self) -> bool {
        self.fields.contains("DESC")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_default_keeps_existing_value() {
        let mut fields = Fields::new().with("LOPR", -5);
        fields.set_default("LOPR", 0);
        fields.set_default("HOPR", 100);
        assert_eq!(fields.get("LOPR"), Some(&FieldValue::Int(-5)));
        assert_eq!(fields.get("HOPR"), Some(&FieldValue::Int(100)));
    }

    #[test]
    fn set_default_respects_unset_entries() {
        let mut fields = Fields::new().with("MDEL", None::<i64>);
        fields.set_default("MDEL", -1);
        assert_eq!(fields.get("MDEL"), Some(&FieldValue::Unset));
    }

    #[test]
    fn tagging_replaces_field_entries() {
        let fields = Fields::new()
            .with("DTYP", "Soft Channel")
            .with("OUT", "OTHER")
            .with("INP", "kept");
        let mut record = Record::new(RecordType::Bo, "PUMP_S", fields);
        record.set_dtyp("epics_device");
        record.set_address("@PUMP".into());
        assert!(!record.fields.contains("DTYP"));
        assert!(!record.fields.contains("OUT"));
        assert!(record.fields.contains("INP"));
        assert_eq!(record.dtyp.as_deref(), Some("epics_device"));
        assert_eq!(record.address.as_deref(), Some("@PUMP"));
    }

    #[test]
    fn address_field_follows_direction() {
        assert_eq!(RecordType::Ai.address_field(), "INP");
        assert_eq!(RecordType::Mbbo.address_field(), "OUT");
        assert_eq!(RecordType::Waveform.address_field(), "INP");
    }

    #[test]
    fn field_values_format_like_db_text() {
        assert_eq!(FieldValue::Float(0.0).to_string(), "0");
        assert_eq!(FieldValue::Float(2.5).to_string(), "2.5");
        assert_eq!(FieldValue::from(Severity::Major).to_string(), "MAJOR");
        assert_eq!(FieldValue::Unset.to_string(), "");
    }

    #[test]
    fn fields_deserialize_from_yaml() {
        let fields: Fields =
            serde_yaml::from_str("DESC: Beam current\nMDEL: -1\nADEL: 0.5\nEGU: ~\n").unwrap();
        assert_eq!(fields.get("DESC"), Some(&FieldValue::from("Beam current")));
        assert_eq!(fields.get("MDEL"), Some(&FieldValue::Int(-1)));
        assert_eq!(fields.get("ADEL"), Some(&FieldValue::Float(0.5)));
        assert_eq!(fields.get("EGU"), Some(&FieldValue::Unset));
    }
}
