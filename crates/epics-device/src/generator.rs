use crate::mbb::{process_mbb_values, MbbOption};
use crate::{GeneratorConfig, Reporter, TracingReporter};
use db_builder::{FieldValue, Fields, Record, RecordBuilder, RecordType, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix distinguishing a setpoint record from the address it drives.
pub const OUTPUT_SUFFIX: &str = "_S";

/// Optional address override plus any extra record fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub fields: Fields,
}

impl RecordArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    pub fn field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.set(name, value);
        self
    }

    pub fn desc(self, text: &str) -> Self {
        self.field("DESC", text)
    }
}

/// Waveform element type (`FTVL`).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ftvl {
    String,
    Char,
    Uchar,
    Short,
    Ushort,
    #[default]
    Long,
    Ulong,
    Int64,
    Uint64,
    Float,
    Double,
    Enum,
}

impl Ftvl {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ftvl::String => "STRING",
            Ftvl::Char => "CHAR",
            Ftvl::Uchar => "UCHAR",
            Ftvl::Short => "SHORT",
            Ftvl::Ushort => "USHORT",
            Ftvl::Long => "LONG",
            Ftvl::Ulong => "ULONG",
            Ftvl::Int64 => "INT64",
            Ftvl::Uint64 => "UINT64",
            Ftvl::Float => "FLOAT",
            Ftvl::Double => "DOUBLE",
            Ftvl::Enum => "ENUM",
        }
    }
}

impl fmt::Display for Ftvl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation context: owns the record builder, the notice sink and the
/// settings that apply to every record created through it.
pub struct Generator<B, R = TracingReporter> {
    pub(crate) builder: B,
    pub(crate) reporter: R,
    config: GeneratorConfig,
}

impl<B: RecordBuilder> Generator<B> {
    pub fn new(builder: B) -> Self {
        Self::with_reporter(builder, TracingReporter)
    }
}

impl<B: RecordBuilder, R: Reporter> Generator<B, R> {
    pub fn with_reporter(builder: B, reporter: R) -> Self {
        Self {
            builder,
            reporter,
            config: GeneratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Default `MDEL` for ai and longin records created from now on.
    pub fn set_mdel_default(&mut self, default: impl Into<Option<i64>>) {
        self.config.mdel_default = default.into();
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_parts(self) -> (B, R) {
        (self.builder, self.reporter)
    }

    pub fn a_in(
        &mut self,
        name: &str,
        lopr: Option<f64>,
        hopr: Option<f64>,
        egu: Option<&str>,
        prec: Option<i64>,
        mut args: RecordArgs,
    ) -> Result<Record> {
        args.fields.set_default("MDEL", self.config.mdel_default);
        args.fields.set("LOPR", lopr);
        args.fields.set("HOPR", hopr);
        args.fields.set("EGU", egu);
        args.fields.set("PREC", prec);
        self.device_record(RecordType::Ai, name, args)
    }

    /// Analog setpoint. Creates `<name>_S` driving address `name`.
    pub fn a_out(
        &mut self,
        name: &str,
        drvl: Option<f64>,
        drvh: Option<f64>,
        egu: Option<&str>,
        prec: Option<i64>,
        mut args: RecordArgs,
    ) -> Result<Record> {
        set_out_defaults(&mut args, name);
        set_scalar_out_defaults(&mut args.fields, drvl, drvh);
        args.fields.set("EGU", egu);
        args.fields.set("PREC", prec);
        self.device_record(RecordType::Ao, &output_name(name), args)
    }

    pub fn long_in(
        &mut self,
        name: &str,
        lopr: Option<i64>,
        hopr: Option<i64>,
        egu: Option<&str>,
        mut args: RecordArgs,
    ) -> Result<Record> {
        args.fields.set_default("MDEL", self.config.mdel_default);
        args.fields.set("LOPR", lopr);
        args.fields.set("HOPR", hopr);
        args.fields.set("EGU", egu);
        self.device_record(RecordType::Longin, name, args)
    }

    pub fn long_out(
        &mut self,
        name: &str,
        drvl: Option<i64>,
        drvh: Option<i64>,
        egu: Option<&str>,
        mut args: RecordArgs,
    ) -> Result<Record> {
        set_out_defaults(&mut args, name);
        set_scalar_out_defaults(&mut args.fields, drvl, drvh);
        args.fields.set("EGU", egu);
        self.device_record(RecordType::Longout, &output_name(name), args)
    }

    pub fn bool_in(
        &mut self,
        name: &str,
        znam: Option<&str>,
        onam: Option<&str>,
        mut args: RecordArgs,
    ) -> Result<Record> {
        args.fields.set("ZNAM", znam);
        args.fields.set("ONAM", onam);
        self.device_record(RecordType::Bi, name, args)
    }

    pub fn bool_out(
        &mut self,
        name: &str,
        znam: Option<&str>,
        onam: Option<&str>,
        mut args: RecordArgs,
    ) -> Result<Record> {
        set_out_defaults(&mut args, name);
        args.fields.set("ZNAM", znam);
        args.fields.set("ONAM", onam);
        self.device_record(RecordType::Bo, &output_name(name), args)
    }

    /// Multi-state input. Each option fills the next state slot; see
    /// [`MbbOption`] for how values and severities are chosen.
    pub fn mbb_in<I, O>(&mut self, name: &str, options: I, mut args: RecordArgs) -> Result<Record>
    where
        I: IntoIterator<Item = O>,
        O: Into<MbbOption>,
    {
        let options: Vec<MbbOption> = options.into_iter().map(Into::into).collect();
        process_mbb_values(name, &mut args.fields, &options);
        self.device_record(RecordType::Mbbi, name, args)
    }

    pub fn mbb_out<I, O>(&mut self, name: &str, options: I, mut args: RecordArgs) -> Result<Record>
    where
        I: IntoIterator<Item = O>,
        O: Into<MbbOption>,
    {
        let options: Vec<MbbOption> = options.into_iter().map(Into::into).collect();
        process_mbb_values(name, &mut args.fields, &options);
        set_out_defaults(&mut args, name);
        self.device_record(RecordType::Mbbo, &output_name(name), args)
    }

    pub fn string_in(&mut self, name: &str, args: RecordArgs) -> Result<Record> {
        self.device_record(RecordType::Stringin, name, args)
    }

    pub fn string_out(&mut self, name: &str, mut args: RecordArgs) -> Result<Record> {
        set_out_defaults(&mut args, name);
        self.device_record(RecordType::Stringout, &output_name(name), args)
    }

    pub fn waveform(
        &mut self,
        name: &str,
        length: u32,
        ftvl: Ftvl,
        mut args: RecordArgs,
    ) -> Result<Record> {
        args.fields.set("NELM", length);
        args.fields.set("FTVL", ftvl.as_str());
        self.device_record(RecordType::Waveform, name, args)
    }

    /// Waveform written by clients. An address already ending in `_S` names
    /// both the record and its address; otherwise `_S` is appended to form
    /// the record name.
    pub fn waveform_out(
        &mut self,
        address: &str,
        length: u32,
        ftvl: Ftvl,
        mut args: RecordArgs,
    ) -> Result<Record> {
        args.fields.set_default("PINI", "YES");
        let name = if address.ends_with(OUTPUT_SUFFIX) {
            address.to_string()
        } else {
            output_name(address)
        };
        args.address = Some(address.to_string());
        self.waveform(&name, length, ftvl, args)
    }
}

fn output_name(name: &str) -> String {
    format!("{name}{OUTPUT_SUFFIX}")
}

fn set_out_defaults(args: &mut RecordArgs, name: &str) {
    args.address.get_or_insert_with(|| name.to_string());
    args.fields.set_default("OMSL", "supervisory");
    args.fields.set_default("PINI", "YES");
}

// DRVL/DRVH always follow the given bounds; LOPR/HOPR only when unset.
fn set_scalar_out_defaults<T>(fields: &mut Fields, drvl: Option<T>, drvh: Option<T>)
where
    T: Into<FieldValue> + Copy,
{
    fields.set("DRVL", drvl);
    fields.set("DRVH", drvh);
    fields.set_default("LOPR", drvl);
    fields.set_default("HOPR", drvh);
}
