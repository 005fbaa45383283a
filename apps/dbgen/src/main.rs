use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use db_builder::Database;
use epics_device as dev;

#[derive(Parser, Debug)]
#[command(
    name = "dbgen",
    version,
    about = "Generate epics_device record databases",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Format {
    Db,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate records from a record-set file or a directory of them
    Generate {
        /// YAML record-set file, or a directory of .yml/.yaml files
        #[arg(long)]
        input: PathBuf,
        /// Output path (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Default MDEL for ai/longin records (overrides the file's config)
        #[arg(long, allow_hyphen_values = true)]
        mdel_default: Option<i64>,
        /// Replace records with duplicate names instead of failing
        #[arg(long, action = ArgAction::SetTrue)]
        allow_overwrite: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Db)]
        format: Format,
    },
    /// List record kinds understood in record-set files
    Kinds,
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            mdel_default,
            allow_overwrite,
            format,
        } => generate(
            &input,
            output.as_deref(),
            mdel_default,
            allow_overwrite,
            format,
        ),
        Commands::Kinds => {
            list_kinds();
            Ok(())
        }
    }
}

fn setup_tracing() {
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn generate(
    input: &Path,
    output: Option<&Path>,
    mdel_default: Option<i64>,
    allow_overwrite: bool,
    format: Format,
) -> Result<()> {
    let set = if input.is_dir() {
        dev::load_record_sets_dir(input)?
    } else {
        dev::load_record_set_file(input)?
    };

    let mut config = set.config.clone();
    if mdel_default.is_some() {
        config.mdel_default = mdel_default;
    }
    let db = if allow_overwrite {
        Database::allowing_overwrite()
    } else {
        Database::new()
    };
    let mut gen = dev::Generator::new(db).with_config(config);
    set.generate(&mut gen)
        .with_context(|| format!("generating records from {}", input.display()))?;
    let (db, _) = gen.into_parts();
    info!(records = db.len(), "generated database");

    match output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write_output(&db, format, &mut out)?;
            out.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_output(&db, format, &mut out)?;
        }
    }
    Ok(())
}

fn write_output<W: Write>(db: &Database, format: Format, out: &mut W) -> Result<()> {
    match format {
        Format::Db => db.write_db(out)?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, db.records())?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn list_kinds() {
    let kinds = [
        ("a_in", "ai", ""),
        ("a_out", "ao", "_S"),
        ("long_in", "longin", ""),
        ("long_out", "longout", "_S"),
        ("bool_in", "bi", ""),
        ("bool_out", "bo", "_S"),
        ("mbb_in", "mbbi", ""),
        ("mbb_out", "mbbo", "_S"),
        ("string_in", "stringin", ""),
        ("string_out", "stringout", "_S"),
        ("waveform", "waveform", ""),
        ("waveform_out", "waveform", "_S"),
    ];
    for (kind, record_type, suffix) in kinds {
        println!("{kind}\t{record_type}\t{suffix}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_args() {
        let cli = Cli::try_parse_from([
            "dbgen",
            "generate",
            "--input",
            "ioc.yaml",
            "--mdel-default",
            "-1",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate {
                input,
                mdel_default,
                format,
                allow_overwrite,
                ..
            } => {
                assert_eq!(input, PathBuf::from("ioc.yaml"));
                assert_eq!(mdel_default, Some(-1));
                assert_eq!(format, Format::Json);
                assert!(!allow_overwrite);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn format_defaults_to_db_text() {
        let cli = Cli::try_parse_from(["dbgen", "generate", "--input", "ioc.yaml"]).unwrap();
        match cli.command {
            Commands::Generate { format, .. } => assert_eq!(format, Format::Db),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["dbgen", "generate", "--input", "x", "--format", "xml"]).is_err());
    }

    #[test]
    fn json_output_lists_records() {
        let set = dev::load_record_set_str(
            "records:\n  - kind: bool_out\n    name: PUMP\n    fields:\n      DESC: Pump enable\n",
        )
        .unwrap();
        let mut gen = dev::Generator::new(Database::new());
        set.generate(&mut gen).unwrap();
        let (db, _) = gen.into_parts();

        let mut buf = Vec::new();
        write_output(&db, Format::Json, &mut buf).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json[0]["name"], "PUMP_S");
        assert_eq!(json[0]["address"], "@PUMP");
        assert_eq!(json[0]["record_type"], "bo");
    }
}
