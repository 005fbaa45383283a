use db_builder::{Fields, Severity};
use serde::{Deserialize, Serialize};

/// Field name prefixes for the sixteen states of mbbi and mbbo records.
pub const MBB_PREFIXES: [&str; 16] = [
    "ZR", "ON", "TW", "TH", "FR", "FV", "SX", "SV", // 0-7
    "EI", "NI", "TE", "EL", "TV", "TT", "FT", "FF", // 8-15
];

/// One state of a multi-state record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MbbOption {
    /// Label only; the value is the state's position.
    Label(String),
    Valued(String, i64),
    WithSeverity(String, i64, Severity),
}

impl MbbOption {
    pub fn valued(label: &str, value: i64) -> Self {
        MbbOption::Valued(label.to_string(), value)
    }

    pub fn with_severity(label: &str, value: i64, severity: Severity) -> Self {
        MbbOption::WithSeverity(label.to_string(), value, severity)
    }
}

impl From<&str> for MbbOption {
    fn from(label: &str) -> Self {
        MbbOption::Label(label.to_string())
    }
}

impl From<String> for MbbOption {
    fn from(label: String) -> Self {
        MbbOption::Label(label)
    }
}

/// Write `xxST`, `xxVL` and optional `xxSV` fields for each option. Options
/// beyond the sixteenth have no field slot and are dropped with a warning.
pub fn process_mbb_values(record: &str, fields: &mut Fields, options: &[MbbOption]) {
    if options.len() > MBB_PREFIXES.len() {
        tracing::warn!(
            record,
            given = options.len(),
            "multi-state record takes at most 16 options, ignoring the rest"
        );
    }
    for (index, (prefix, option)) in MBB_PREFIXES.iter().zip(options).enumerate() {
        let (label, value, severity) = match option {
            MbbOption::Label(label) => (label, index as i64, None),
            MbbOption::Valued(label, value) => (label, *value, None),
            MbbOption::WithSeverity(label, value, severity) => (label, *value, Some(*severity)),
        };
        fields.set(&format!("{prefix}ST"), label.as_str());
        fields.set(&format!("{prefix}VL"), value);
        if let Some(severity) = severity {
            fields.set(&format!("{prefix}SV"), severity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db_builder::FieldValue;

    #[test]
    fn labels_take_position_as_value() {
        let mut fields = Fields::new();
        process_mbb_values("x", &mut fields, &[
            MbbOption::from("OFF"),
            MbbOption::from("ON"),
            MbbOption::from("AUTO"),
        ]);
        assert_eq!(fields.get("ZRST"), Some(&FieldValue::from("OFF")));
        assert_eq!(fields.get("ZRVL"), Some(&FieldValue::Int(0)));
        assert_eq!(fields.get("ONVL"), Some(&FieldValue::Int(1)));
        assert_eq!(fields.get("TWST"), Some(&FieldValue::from("AUTO")));
        assert_eq!(fields.get("TWVL"), Some(&FieldValue::Int(2)));
        assert!(!fields.contains("ZRSV"));
        assert_eq!(fields.len(), 6);
    }

    #[test]
    fn last_slot_uses_ff_prefix() {
        let options: Vec<MbbOption> = (0..16).map(|i| MbbOption::from(format!("S{i}"))).collect();
        let mut fields = Fields::new();
        process_mbb_values("x", &mut fields, &options);
        assert_eq!(fields.get("FFST"), Some(&FieldValue::from("S15")));
        assert_eq!(fields.get("FFVL"), Some(&FieldValue::Int(15)));
    }

    #[test]
    fn options_past_sixteen_are_dropped() {
        let options: Vec<MbbOption> = (0..20).map(|i| MbbOption::from(format!("S{i}"))).collect();
        let mut fields = Fields::new();
        process_mbb_values("x", &mut fields, &options);
        assert_eq!(fields.len(), 32);
    }

    #[test]
    fn options_deserialize_from_yaml() {
        let options: Vec<MbbOption> =
            serde_yaml::from_str("- Idle\n- [Run, 4]\n- [Fault, 7, MAJOR]\n").unwrap();
        assert_eq!(
            options,
            vec![
                MbbOption::from("Idle"),
                MbbOption::valued("Run", 4),
                MbbOption::with_severity("Fault", 7, Severity::Major),
            ]
        );
    }
}
