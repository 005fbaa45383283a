use crate::{Generator, RecordArgs, Reporter};
use db_builder::{Record, RecordBuilder, RecordType, Result};

/// Device type tag carried by every generated record.
pub const DEVICE_TYPE: &str = "epics_device";

/// Marks the address as a device-driver lookup rather than a literal link.
pub const ADDRESS_PREFIX: char = '@';

impl<B: RecordBuilder, R: Reporter> Generator<B, R> {
    /// Create one record serviced by the `epics_device` driver.
    ///
    /// The address defaults to `name`. Records created without a `DESC` field
    /// get a notice on the reporter; creation still goes ahead.
    pub fn device_record(
        &mut self,
        record_type: RecordType,
        name: &str,
        args: RecordArgs,
    ) -> Result<Record> {
        let RecordArgs { address, fields } = args;
        let address = address.unwrap_or_else(|| name.to_string());
        let described = fields.contains("DESC");

        let record = self.builder.create(record_type, name, fields)?;
        record.set_dtyp(DEVICE_TYPE);
        record.set_address(format!("{ADDRESS_PREFIX}{address}"));
        let record = record.clone();

        if !described {
            self.reporter.report(&format!("No description for {name}"));
        }
        tracing::debug!(record = name, kind = %record_type, "created record");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db_builder::{Database, FieldValue};

    fn generator() -> Generator<Database, Vec<String>> {
        Generator::with_reporter(Database::new(), Vec::new())
    }

    #[test]
    fn tags_device_type_and_address() {
        let mut gen = generator();
        let record = gen
            .device_record(RecordType::Longin, "COUNT", RecordArgs::new().desc("Counter"))
            .unwrap();
        assert_eq!(record.dtyp.as_deref(), Some(DEVICE_TYPE));
        assert_eq!(record.address.as_deref(), Some("@COUNT"));
        assert_eq!(
            record.field("DESC"),
            Some(&FieldValue::Text("Counter".into()))
        );
        assert!(gen.reporter().is_empty());
        assert_eq!(gen.builder().get("COUNT"), Some(&record));
    }

    #[test]
    fn explicit_address_wins() {
        let mut gen = generator();
        let record = gen
            .device_record(
                RecordType::Bi,
                "STATUS",
                RecordArgs::new().address("SYS:STATUS").desc("x"),
            )
            .unwrap();
        assert_eq!(record.address.as_deref(), Some("@SYS:STATUS"));
    }

    #[test]
    fn missing_description_is_reported_not_fatal() {
        let mut gen = generator();
        let record = gen
            .device_record(RecordType::Stringin, "VERSION", RecordArgs::new())
            .unwrap();
        assert_eq!(record.name, "VERSION");
        assert_eq!(gen.reporter(), &vec!["No description for VERSION".to_string()]);
    }

    #[test]
    fn caller_dtyp_and_link_cannot_replace_tagging() {
        let mut gen = generator();
        let args = RecordArgs::new()
            .desc("x")
            .field("DTYP", "Soft Channel")
            .field("OUT", "OTHER");
        let record = gen.bool_out("PUMP", None, None, args).unwrap();
        assert!(!record.fields.contains("DTYP"));
        assert!(!record.fields.contains("OUT"));

        let text = gen.builder().to_db_string();
        assert_eq!(text.matches("field(DTYP").count(), 1);
        assert!(text.contains("field(DTYP, \"epics_device\")"));
        assert_eq!(text.matches("field(OUT").count(), 1);
        assert!(text.contains("field(OUT, \"@PUMP\")"));
    }

    #[test]
    fn builder_errors_propagate() {
        let mut gen = generator();
        gen.device_record(RecordType::Ai, "X", RecordArgs::new().desc("x"))
            .unwrap();
        let err = gen
            .device_record(RecordType::Ai, "X", RecordArgs::new().desc("x"))
            .unwrap_err();
        assert_eq!(err, db_builder::BuildError::DuplicateRecord("X".into()));
    }
}
