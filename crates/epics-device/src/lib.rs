//! epics-device: record generation for the `epics_device` driver
//!
//! Logical constructors (`a_in`, `a_out`, `mbb_in`, `waveform_out`, ...) apply consistent
//! field defaults and naming conventions, then create the underlying EPICS record through a
//! [`db_builder::RecordBuilder`], tagged with the `epics_device` device type and an `@address`
//! link. Output records are named `<name>_S` and address `name`.

mod config;
pub use config::GeneratorConfig;

mod report;
pub use report::{Reporter, TracingReporter};

mod generator;
pub use generator::{Ftvl, Generator, RecordArgs, OUTPUT_SUFFIX};

mod device;
pub use device::{ADDRESS_PREFIX, DEVICE_TYPE};

pub mod mbb;
pub use mbb::{MbbOption, MBB_PREFIXES};

mod loader;
pub use loader::{
    load_record_set_file, load_record_set_str, load_record_sets_dir, RecordSet, RecordSpec,
};

pub use db_builder::{BuildError, FieldValue, Fields, Record, RecordType, Severity};
