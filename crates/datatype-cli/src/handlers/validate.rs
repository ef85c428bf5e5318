//! Validation command handler

use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{DocumentReport, OutputWriter};
use datatype_schemas::loader::SchemaParser;
use datatype_schemas::{DatatypeLoader, Registry, Validator, PRIMARY_DATATYPE};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Data path argument that reads from stdin
const STDIN: &str = "-";

/// Handle the validate command
#[instrument(skip_all, fields(schema = %args.schema.display(), documents = args.data.len()))]
pub async fn handle_validate(
    args: ValidateArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let details = format!("schema: {}", args.schema.display());
    let _timer = Timer::with_details("validate_command", &details);
    let validation = super::validation_config(&config.validation, args.max_depth, args.max_errors)?;

    if args.data.iter().filter(|p| p.as_os_str() == STDIN).count() > 1 {
        return Err(Error::invalid_args("stdin ('-') can only be read once"));
    }
    ensure_exists(&args.schema)?;
    for path in &args.referenced {
        ensure_exists(path)?;
    }

    let registry = {
        let _registry_timer = Timer::new("registry_build");
        DatatypeLoader::new().load_registry(&args.schema, &args.referenced)?
    };
    info!(datatypes = registry.len(), "Registry built");
    output.info(&format!(
        "Loaded {} datatype(s) from {}",
        registry.len(),
        args.schema.display()
    ))?;

    for name in registry.dangling_references() {
        warn!(datatype = %name, "Reference to undefined datatype");
        output.warning(&format!("Datatype '{}' is referenced but not defined", name))?;
    }

    let target = target_datatype(&registry, args.datatype.as_deref(), &args.schema)?;
    let validator = Validator::new(&registry).with_config(validation);

    let mut reports = Vec::with_capacity(args.data.len());
    for path in &args.data {
        let (label, data) = read_document(path)?;
        debug!(document = %label, "Validating document");
        let errors = match &args.datatype {
            Some(name) => validator.validate_datatype(name, &data),
            None => validator.validate(&data),
        };
        let report = DocumentReport::new(label, target.clone(), errors);
        output.document_report(&report)?;
        reports.push(report);
    }

    if output.format() != crate::cli::OutputFormat::Human {
        output.data(&reports)?;
    }

    let failed = reports.iter().filter(|r| !r.valid).count();
    info!(documents = reports.len(), failed, "Validation finished");
    if failed > 0 {
        return Err(Error::ValidationFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Name shown for the datatype documents are checked against
fn target_datatype(registry: &Registry, requested: Option<&str>, schema: &Path) -> Result<String> {
    match requested {
        Some(name) if registry.contains(name) => Ok(name.to_string()),
        Some(name) => {
            let known: Vec<&str> = registry.names().collect();
            Err(Error::invalid_args(format!(
                "Unknown datatype '{}'; known datatypes: {}",
                name,
                known.join(", ")
            )))
        }
        None => {
            let primary = &registry.primary().name;
            if primary == PRIMARY_DATATYPE {
                Ok(schema.display().to_string())
            } else {
                Ok(primary.clone())
            }
        }
    }
}

/// Decode one data document, reading stdin for `-`
fn read_document(path: &Path) -> Result<(String, Value)> {
    if path.as_os_str() == STDIN {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        let (value, format) =
            SchemaParser::new().parse_with_fallback(&content, Path::new("<stdin>"))?;
        debug!(?format, bytes = content.len(), "Decoded stdin");
        return Ok((STDIN.to_string(), value));
    }

    ensure_exists(path)?;
    let value = DatatypeLoader::new().load_data(path)?;
    Ok((path.display().to_string(), value))
}
