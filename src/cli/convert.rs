use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use std::path::PathBuf;

use igornx::entry::{ConversionRun, EntryConfigSet, InputFile};

use super::config::Config;

/// Normalize the inputs and write the output store as JSON
pub fn run(
    inputs: Vec<PathBuf>,
    entries: Option<PathBuf>,
    config: Option<PathBuf>,
    skip_unknown_records: bool,
    parallel: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let file_config = match &config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let settings = file_config.run_settings(skip_unknown_records, parallel);

    info!("igornx - Igor Pro to flat entries");
    info!("Inputs: {}", inputs.len());
    info!("Unknown records: {:?}", settings.unknown_records);
    if settings.parallel {
        info!("Parallel decode: enabled");
    }

    let mut run = ConversionRun::with_settings(settings);
    if let Some(path) = &entries {
        let set = EntryConfigSet::from_file(path)
            .with_context(|| format!("Failed to load entry configuration: {}", path.display()))?;
        info!("Entries: {} from {}", set.len(), path.display());
        run.set_entries(set)?;
    }

    for path in inputs {
        let input = InputFile::from_path(&path).with_context(|| {
            format!(
                "Unsupported input {}: expected .ibw, .bwav, .pxp or .pxt",
                path.display()
            )
        })?;
        run.add_input(input);
    }

    let store = run.run().context("Conversion failed")?;
    info!(
        "Wrote {} keys for entries {:?}",
        store.len(),
        store.entry_names()
    );

    let json = serde_json::to_string_pretty(&store).context("Failed to serialize output")?;
    match output {
        Some(path) => std::fs::write(&path, json)
            .with_context(|| format!("Failed to write output: {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
