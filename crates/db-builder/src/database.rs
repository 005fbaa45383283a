use crate::{BuildError, Fields, Record, RecordBuilder, RecordType, Result};
use std::collections::HashMap;
use std::io::{self, Write};

/// Longest record name accepted by Channel Access.
pub const MAX_NAME_LEN: usize = 60;

/// Records created during one generation pass, in creation order.
#[derive(Debug, Default, Clone)]
pub struct Database {
    records: Vec<Record>,
    index: HashMap<String, usize>,
    allow_overwrite: bool,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// A database that replaces an existing record of the same name instead of
    /// rejecting it.
    pub fn allowing_overwrite() -> Self {
        Self {
            allow_overwrite: true,
            ..Self::default()
        }
    }

    pub fn get(&self, name: &str) -> Option<&Record> {
        self.index.get(name).and_then(|&i| self.records.get(i))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write all records as EPICS database text.
    pub fn write_db<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            write_record(out, record)?;
        }
        Ok(())
    }

    pub fn to_db_string(&self) -> String {
        let mut buf = Vec::new();
        if let Err(e) = self.write_db(&mut buf) {
            return format!("# error rendering database: {e}\n");
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl RecordBuilder for Database {
    fn create(
        &mut self,
        record_type: RecordType,
        name: &str,
        fields: Fields,
    ) -> Result<&mut Record> {
        validate_name(name)?;
        validate_fields(name, &fields)?;

        let record = Record::new(record_type, name, fields);
        let idx = match self.index.get(name).copied() {
            Some(idx) if self.allow_overwrite => {
                tracing::debug!(record = name, "replacing existing record");
                self.records[idx] = record;
                idx
            }
            Some(_) => return Err(BuildError::DuplicateRecord(name.to_string())),
            None => {
                self.records.push(record);
                let idx = self.records.len() - 1;
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        Ok(&mut self.records[idx])
    }
}

fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "empty"
    } else if name.len() > MAX_NAME_LEN {
        "too long"
    } else if name.chars().any(|c| c.is_whitespace() || c == '"') {
        "contains whitespace or quotes"
    } else {
        return Ok(());
    };
    Err(BuildError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

fn validate_fields(record: &str, fields: &Fields) -> Result<()> {
    for (field, _) in fields.iter() {
        let ok = (1..=4).contains(&field.len())
            && field
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if !ok {
            return Err(BuildError::InvalidField {
                record: record.to_string(),
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

fn write_record<W: Write>(out: &mut W, record: &Record) -> io::Result<()> {
    writeln!(
        out,
        "record({}, \"{}\")",
        record.record_type,
        escape(&record.name)
    )?;
    writeln!(out, "{{")?;
    if let Some(dtyp) = &record.dtyp {
        write_field(out, "DTYP", dtyp)?;
    }
    if let Some(address) = &record.address {
        write_field(out, record.record_type.address_field(), address)?;
    }
    for (name, value) in record.fields.iter() {
        if value.is_unset() {
            continue;
        }
        write_field(out, name, &value.to_string())?;
    }
    writeln!(out, "}}")
}

fn write_field<W: Write>(out: &mut W, name: &str, value: &str) -> io::Result<()> {
    writeln!(out, "    field({name}, \"{}\")", escape(value))
}

// C-style escapes, as read back by dbStatic.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
