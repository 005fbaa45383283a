use crate::{Fields, Record, RecordType, Result};

/// Creates and stores database records.
pub trait RecordBuilder {
    /// Create a record of the given type and return it for further tagging.
    /// The returned record is the stored one, so changes to it persist.
    fn create(
        &mut self,
        record_type: RecordType,
        name: &str,
        fields: Fields,
    ) -> Result<&mut Record>;
}
