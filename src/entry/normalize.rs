use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Deserialize;

use super::{ConvertError, EntryConfig, EntryConfigSet, OutputStore, StoreValue};
use crate::archive::{decode_archive, ArchiveOptions, ArchiveTree, RecordPolicy};
use crate::axis::{axis_coordinates, axis_units};
use crate::wave::{WaveArray, WaveRecord};

/// Container family of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Binary wave holding one array (`.ibw`, `.bwav`)
    SingleWave,
    /// Packed experiment holding a folder tree (`.pxp`, `.pxt`)
    PackedArchive,
}

impl ContainerKind {
    /// Pick the container kind from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ibw" | "bwav" => Some(ContainerKind::SingleWave),
            "pxp" | "pxt" => Some(ContainerKind::PackedArchive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
enum InputSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// One input container, on disk or in memory
#[derive(Debug, Clone)]
pub struct InputFile {
    name: String,
    kind: ContainerKind,
    source: InputSource,
}

impl InputFile {
    fn from_file(path: impl Into<PathBuf>, kind: ContainerKind) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            kind,
            source: InputSource::Path(path),
        }
    }

    /// Input of the kind its extension names, or `None` for unknown extensions
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let kind = ContainerKind::from_path(&path)?;
        Some(Self::from_file(path, kind))
    }

    /// Single-wave file on disk
    pub fn wave_path(path: impl Into<PathBuf>) -> Self {
        Self::from_file(path, ContainerKind::SingleWave)
    }

    /// Packed archive on disk
    pub fn archive_path(path: impl Into<PathBuf>) -> Self {
        Self::from_file(path, ContainerKind::PackedArchive)
    }

    /// Single-wave container already in memory; `name` plays the file name
    pub fn wave_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind: ContainerKind::SingleWave,
            source: InputSource::Memory(bytes),
        }
    }

    /// Packed archive already in memory
    pub fn archive_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind: ContainerKind::PackedArchive,
            source: InputSource::Memory(bytes),
        }
    }

    /// Base name (file name with extension)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Container family
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    fn read(&self) -> Result<Cow<'_, [u8]>, ConvertError> {
        match &self.source {
            InputSource::Memory(bytes) => Ok(Cow::Borrowed(bytes)),
            InputSource::Path(path) => std::fs::read(path)
                .map(Cow::Owned)
                .map_err(|source| ConvertError::Io {
                    file: path.display().to_string(),
                    source,
                }),
        }
    }

    /// Entry name synthesized for an unmatched single-wave file
    fn stem(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }
}

/// Tunables of a conversion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Handling of undefined archive record kinds
    pub unknown_records: RecordPolicy,
    /// Decode single-wave files on the rayon pool (`parallel` feature)
    pub parallel: bool,
}

/// Waves resolved for one entry before anything is written
struct ResolvedEntry<'a> {
    data: &'a WaveRecord,
    errors: Option<&'a WaveRecord>,
    axis_waves: BTreeMap<usize, &'a WaveRecord>,
}

/// A single normalization pass over a set of inputs.
///
/// ```rust,no_run
/// use igornx::entry::{ConversionRun, EntryConfig, EntryConfigSet, InputFile};
///
/// let entries = EntryConfigSet::new()
///     .with_entry("scan_1", EntryConfig::with_data("root/scans/scan_1").axis_name(0, "energy"));
///
/// let mut run = ConversionRun::new();
/// run.set_entries(entries)?;
/// run.add_input(InputFile::archive_path("experiment.pxp"));
/// let store = run.run()?;
/// println!("{:?}", store.dims("scan_1"));
/// # Ok::<(), igornx::entry::ConvertError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConversionRun {
    settings: RunSettings,
    entries: Option<EntryConfigSet>,
    inputs: Vec<InputFile>,
}

impl ConversionRun {
    /// Run with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Run with explicit settings
    pub fn with_settings(settings: RunSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Supply the entry configuration; a run accepts exactly one
    pub fn set_entries(&mut self, entries: EntryConfigSet) -> Result<(), ConvertError> {
        if self.entries.is_some() {
            return Err(ConvertError::ConflictingInputMode(
                "entry configuration supplied more than once".to_string(),
            ));
        }
        self.entries = Some(entries);
        Ok(())
    }

    /// Queue an input container
    pub fn add_input(&mut self, input: InputFile) {
        self.inputs.push(input);
    }

    /// Queue a single-wave file on disk
    pub fn add_wave_file(&mut self, path: impl Into<PathBuf>) {
        self.add_input(InputFile::wave_path(path));
    }

    /// Queue a packed archive on disk
    pub fn add_archive_file(&mut self, path: impl Into<PathBuf>) {
        self.add_input(InputFile::archive_path(path));
    }

    /// Decode the inputs and normalize them into a fresh store
    pub fn run(&self) -> Result<OutputStore, ConvertError> {
        let archives: Vec<&InputFile> = self
            .inputs
            .iter()
            .filter(|input| input.kind == ContainerKind::PackedArchive)
            .collect();
        let waves: Vec<&InputFile> = self
            .inputs
            .iter()
            .filter(|input| input.kind == ContainerKind::SingleWave)
            .collect();

        match (archives.as_slice(), waves.is_empty()) {
            ([], _) => self.run_single_waves(&waves),
            ([archive], true) => self.run_archive(archive),
            ([_], false) => Err(ConvertError::ConflictingInputMode(
                "single-wave files cannot be combined with a packed archive".to_string(),
            )),
            (many, _) => Err(ConvertError::ConflictingInputMode(format!(
                "{} packed archives given, a run takes at most one",
                many.len()
            ))),
        }
    }

    fn run_single_waves(&self, files: &[&InputFile]) -> Result<OutputStore, ConvertError> {
        let mut store = OutputStore::new();
        if files.is_empty() {
            info!("No input files, nothing to normalize");
            return Ok(store);
        }

        let decoded = self.decode_waves(files)?;
        let no_entries = EntryConfigSet::new();
        let entries = self.entries.as_ref().unwrap_or(&no_entries);
        let synthesized = EntryConfig::default();
        let mut matched = BTreeSet::new();

        for (file, wave) in files.iter().zip(&decoded) {
            let (entry, config) = match entries.find_by_data(file.name()) {
                Some((name, config)) => {
                    matched.insert(name.to_string());
                    (name.to_string(), config)
                }
                None => (file.stem().to_string(), &synthesized),
            };

            if let Some(path) = &config.data_errors {
                warn!(
                    "Entry '{}': data_errors '{}' ignored without a packed archive",
                    entry, path
                );
            }
            for (dim, axis) in &config.axes {
                if let Some(path) = &axis.wave {
                    warn!(
                        "Entry '{}': axis{} wave '{}' ignored without a packed archive",
                        entry, dim, path
                    );
                }
            }

            info!("Entry '{}' from {}", entry, file.name());
            let resolved = ResolvedEntry {
                data: wave,
                errors: None,
                axis_waves: BTreeMap::new(),
            };
            write_entry(&mut store, &entry, config, &resolved);
        }

        for name in entries.names().filter(|name| !matched.contains(*name)) {
            warn!("Entry '{}' matched no input file", name);
        }
        Ok(store)
    }

    fn decode_waves(&self, files: &[&InputFile]) -> Result<Vec<WaveRecord>, ConvertError> {
        #[cfg(feature = "parallel")]
        if self.settings.parallel {
            use rayon::prelude::*;
            debug!("Decoding {} waves in parallel", files.len());
            return files.par_iter().map(|file| decode_wave_file(file)).collect();
        }
        #[cfg(not(feature = "parallel"))]
        if self.settings.parallel {
            warn!("Parallel decoding requested but the 'parallel' feature is disabled");
        }

        files.iter().map(|file| decode_wave_file(file)).collect()
    }

    fn run_archive(&self, file: &InputFile) -> Result<OutputStore, ConvertError> {
        let mut store = OutputStore::new();
        let Some(entries) = &self.entries else {
            info!("No entry configuration for {}, nothing to normalize", file.name());
            return Ok(store);
        };

        let missing: Vec<String> = entries
            .iter()
            .filter(|(_, config)| config.data.is_none())
            .map(|(name, _)| name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ConvertError::MissingDataReference { entries: missing });
        }

        let bytes = file.read()?;
        let options = ArchiveOptions {
            unknown_records: self.settings.unknown_records,
        };
        let tree = decode_archive(&bytes, &options)
            .map_err(|e| ConvertError::from_archive(file.name(), e))?;
        info!("Decoded {} with {} waves", file.name(), tree.wave_count());

        for (entry, config) in entries.iter() {
            let resolved = resolve_entry(&tree, file.name(), entry, config)?;
            info!("Entry '{}' from {}", entry, file.name());
            write_entry(&mut store, entry, config, &resolved);
        }
        Ok(store)
    }
}

fn decode_wave_file(file: &InputFile) -> Result<WaveRecord, ConvertError> {
    let bytes = file.read()?;
    let wave = WaveRecord::from_bytes(&bytes).map_err(|e| ConvertError::from_decode(file.name(), e))?;
    debug!(
        "Decoded {} (version {}, {} points)",
        file.name(),
        wave.header.version,
        wave.header.num_points
    );
    Ok(wave)
}

fn require<'a>(
    tree: &'a ArchiveTree,
    file: &str,
    entry: &str,
    key: &str,
    path: &str,
) -> Result<&'a WaveRecord, ConvertError> {
    tree.resolve_wave(path).ok_or_else(|| ConvertError::ReferenceNotFound {
        entry: entry.to_string(),
        key: key.to_string(),
        path: path.to_string(),
        file: file.to_string(),
    })
}

fn resolve_entry<'a>(
    tree: &'a ArchiveTree,
    file: &str,
    entry: &str,
    config: &EntryConfig,
) -> Result<ResolvedEntry<'a>, ConvertError> {
    let data_path = config.data.as_deref().unwrap_or_default();
    let data = require(tree, file, entry, "data", data_path)?;
    let errors = config
        .data_errors
        .as_deref()
        .map(|path| require(tree, file, entry, "data_errors", path))
        .transpose()?;

    let mut axis_waves = BTreeMap::new();
    for (&dim, axis) in &config.axes {
        if let Some(path) = &axis.wave {
            let wave = require(tree, file, entry, &format!("axis{dim}"), path)?;
            axis_waves.insert(dim, wave);
        }
    }
    Ok(ResolvedEntry {
        data,
        errors,
        axis_waves,
    })
}

fn write_entry(store: &mut OutputStore, entry: &str, config: &EntryConfig, resolved: &ResolvedEntry<'_>) {
    let wave = resolved.data;
    let header = &wave.header;

    for (key, value) in wave.notes() {
        store.insert(format!("{entry}/note/{key}"), value);
    }

    let mut dims = Vec::new();
    for dim in header.populated_dims() {
        let name = config
            .axis_name_for(dim)
            .map(str::to_string)
            .unwrap_or_else(|| format!("axis{dim}"));

        let (coordinates, default_units) = match resolved.axis_waves.get(&dim) {
            Some(axis_wave) => (axis_wave.data.clone(), axis_wave.data_units.as_str()),
            None => {
                let Some(coordinates) = axis_coordinates(header, dim) else {
                    continue;
                };
                (WaveArray::from(coordinates), axis_units(header, dim).unwrap_or_default())
            }
        };
        let units = config.axis_units_for(dim).unwrap_or(default_units);

        store.insert(format!("{entry}/{name}.data"), coordinates);
        store.insert(format!("{entry}/{name}.units"), units);
        store.insert(format!("{entry}/{name}.index"), dim as i64);
        dims.push(name);
    }
    for dim in resolved.axis_waves.keys().filter(|&&dim| header.dim_size(dim).is_none()) {
        debug!("Entry '{}': axis{} wave ignored, dimension not populated", entry, dim);
    }

    store.insert(format!("{entry}/dims"), dims);
    store.insert(format!("{entry}/data"), wave.data.clone());
    let data_units = config.data_units.as_deref().unwrap_or(&wave.data_units);
    store.insert(format!("{entry}/data.units"), data_units);
    if let Some(errors) = resolved.errors {
        store.insert(format!("{entry}/data.errors"), errors.data.clone());
    }

    for (key, value) in &config.metadata {
        store.insert(format!("{entry}/{key}"), StoreValue::from(value.clone()));
    }
}
