use crate::{Ftvl, Generator, GeneratorConfig, MbbOption, RecordArgs, Reporter};
use anyhow::Context;
use db_builder::{Record, RecordBuilder, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One logical record as written in a record-set file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordSpec {
    AIn {
        name: String,
        lopr: Option<f64>,
        hopr: Option<f64>,
        egu: Option<String>,
        prec: Option<i64>,
        #[serde(flatten)]
        args: RecordArgs,
    },
    AOut {
        name: String,
        drvl: Option<f64>,
        drvh: Option<f64>,
        egu: Option<String>,
        prec: Option<i64>,
        #[serde(flatten)]
        args: RecordArgs,
    },
    LongIn {
        name: String,
        lopr: Option<i64>,
        hopr: Option<i64>,
        egu: Option<String>,
        #[serde(flatten)]
        args: RecordArgs,
    },
    LongOut {
        name: String,
        drvl: Option<i64>,
        drvh: Option<i64>,
        egu: Option<String>,
        #[serde(flatten)]
        args: RecordArgs,
    },
    BoolIn {
        name: String,
        znam: Option<String>,
        onam: Option<String>,
        #[serde(flatten)]
        args: RecordArgs,
    },
    BoolOut {
        name: String,
        znam: Option<String>,
        onam: Option<String>,
        #[serde(flatten)]
        args: RecordArgs,
    },
    MbbIn {
        name: String,
        #[serde(default)]
        options: Vec<MbbOption>,
        #[serde(flatten)]
        args: RecordArgs,
    },
    MbbOut {
        name: String,
        #[serde(default)]
        options: Vec<MbbOption>,
        #[serde(flatten)]
        args: RecordArgs,
    },
    StringIn {
        name: String,
        #[serde(flatten)]
        args: RecordArgs,
    },
    StringOut {
        name: String,
        #[serde(flatten)]
        args: RecordArgs,
    },
    Waveform {
        name: String,
        length: u32,
        #[serde(default)]
        ftvl: Ftvl,
        #[serde(flatten)]
        args: RecordArgs,
    },
    /// The record name is derived from `address`.
    WaveformOut {
        address: String,
        length: u32,
        #[serde(default)]
        ftvl: Ftvl,
        #[serde(flatten)]
        args: RecordArgs,
    },
}

impl RecordSpec {
    /// Create the record through `gen`.
    pub fn apply<B: RecordBuilder, R: Reporter>(&self, gen: &mut Generator<B, R>) -> Result<Record> {
        match self {
            RecordSpec::AIn {
                name,
                lopr,
                hopr,
                egu,
                prec,
                args,
            } => gen.a_in(name, *lopr, *hopr, egu.as_deref(), *prec, args.clone()),
            RecordSpec::AOut {
                name,
                drvl,
                drvh,
                egu,
                prec,
                args,
            } => gen.a_out(name, *drvl, *drvh, egu.as_deref(), *prec, args.clone()),
            RecordSpec::LongIn {
                name,
                lopr,
                hopr,
                egu,
                args,
            } => gen.long_in(name, *lopr, *hopr, egu.as_deref(), args.clone()),
            RecordSpec::LongOut {
                name,
                drvl,
                drvh,
                egu,
                args,
            } => gen.long_out(name, *drvl, *drvh, egu.as_deref(), args.clone()),
            RecordSpec::BoolIn {
                name,
                znam,
                onam,
                args,
            } => gen.bool_in(name, znam.as_deref(), onam.as_deref(), args.clone()),
            RecordSpec::BoolOut {
                name,
                znam,
                onam,
                args,
            } => gen.bool_out(name, znam.as_deref(), onam.as_deref(), args.clone()),
            RecordSpec::MbbIn {
                name,
                options,
                args,
            } => gen.mbb_in(name, options.iter().cloned(), args.clone()),
            RecordSpec::MbbOut {
                name,
                options,
                args,
            } => gen.mbb_out(name, options.iter().cloned(), args.clone()),
            RecordSpec::StringIn { name, args } => gen.string_in(name, args.clone()),
            RecordSpec::StringOut { name, args } => gen.string_out(name, args.clone()),
            RecordSpec::Waveform {
                name,
                length,
                ftvl,
                args,
            } => gen.waveform(name, *length, *ftvl, args.clone()),
            RecordSpec::WaveformOut {
                address,
                length,
                ftvl,
                args,
            } => gen.waveform_out(address, *length, *ftvl, args.clone()),
        }
    }
}

/// Contents of a record-set file: optional generator settings and the
/// records to create, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(default)]
    pub config: GeneratorConfig,
    #[serde(default)]
    pub records: Vec<RecordSpec>,
}

impl RecordSet {
    /// Append another set. Its settings win where it sets them.
    pub fn extend(&mut self, other: RecordSet) {
        if other.config.mdel_default.is_some() {
            self.config.mdel_default = other.config.mdel_default;
        }
        self.records.extend(other.records);
    }

    /// Create every record in order, stopping at the first builder error.
    pub fn generate<B: RecordBuilder, R: Reporter>(
        &self,
        gen: &mut Generator<B, R>,
    ) -> Result<Vec<Record>> {
        self.records.iter().map(|spec| spec.apply(gen)).collect()
    }
}

pub fn load_record_set_str(raw: &str) -> anyhow::Result<RecordSet> {
    let set: RecordSet = serde_yaml::from_str(raw).context("parsing record set")?;
    Ok(set)
}

pub fn load_record_set_file(path: impl AsRef<Path>) -> anyhow::Result<RecordSet> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading record set: {}", path.display()))?;
    let set: RecordSet = serde_yaml::from_str(&raw)
        .with_context(|| format!("parsing record set: {}", path.display()))?;
    Ok(set)
}

/// Load every `.yml`/`.yaml` file in `dir`, merged in file-name order.
pub fn load_record_sets_dir(dir: impl AsRef<Path>) -> anyhow::Result<RecordSet> {
    let mut merged = RecordSet::default();
    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        let path = entry.path();
        if let Some(ext) = path.extension() {
            if ext == "yml" || ext == "yaml" {
                entries.push(path);
            }
        }
    }
    entries.sort();
    for p in entries {
        merged.extend(load_record_set_file(&p)?);
    }
    Ok(merged)
}
