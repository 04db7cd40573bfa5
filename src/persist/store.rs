use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::CorruptMasterPolicy;
use crate::error::{AppError, Result};
use crate::persist::merge::{merge, MergeStats};
use crate::persist::record::{MasterRecord, COLUMNS};
use crate::pipeline::sort_ranked;
use crate::types::PersistMode;

/// The master record set: one CSV file, rewritten whole on every save.
pub struct MasterStore {
    path: PathBuf,
}

impl MasterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted set. A missing file is an empty set; anything that
    /// cannot be parsed back is `PersistenceCorruption`.
    pub fn load(&self) -> Result<Vec<MasterRecord>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No master file at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::Reader::from_reader(file);
        let headers = reader.headers().map_err(|e| self.corrupt(format!("header: {e}")))?;
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(missing) = COLUMNS.iter().find(|c| !headers.iter().any(|h| h == **c)) {
            return Err(self.corrupt(format!("missing column {missing}")));
        }

        let mut by_name: BTreeMap<String, MasterRecord> = BTreeMap::new();
        for (i, row) in reader.deserialize::<MasterRecord>().enumerate() {
            let rec = row.map_err(|e| self.corrupt(format!("row {}: {e}", i + 1)))?;
            if by_name.contains_key(&rec.name) {
                warn!("Duplicate master row for '{}', keeping the later one", rec.name);
            }
            by_name.insert(rec.name.clone(), rec);
        }

        let mut records: Vec<MasterRecord> = by_name.into_values().collect();
        sort_ranked(&mut records);
        Ok(records)
    }

    /// Replaces the file contents atomically. An empty set still writes the header.
    pub fn save(&self, records: &[MasterRecord]) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(COLUMNS)?;
        for rec in records {
            writer.serialize(rec)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Io(e.into_error()))?;
        write_atomic(&self.path, &bytes)
    }

    /// Reconciles `batch` with what is on disk and writes the result.
    /// Overwrite mode never reads the existing file.
    pub fn persist(
        &self,
        batch: Vec<MasterRecord>,
        mode: PersistMode,
    ) -> Result<(Vec<MasterRecord>, MergeStats)> {
        let persisted = match mode {
            PersistMode::Merge => self.load()?,
            PersistMode::Overwrite => Vec::new(),
        };
        let (records, stats) = merge(persisted, batch, mode);
        self.save(&records)?;
        info!(
            path = %self.path.display(),
            %mode,
            total = records.len(),
            added = stats.added,
            updated = stats.updated,
            retained = stats.retained,
            "Master record set saved"
        );
        Ok((records, stats))
    }

    /// [`Self::persist`], with `policy` deciding what happens when the file on
    /// disk cannot be read. `Overwrite` quarantines it before writing `batch`
    /// alone, so the old rows are set aside rather than discarded.
    pub fn persist_with_policy(
        &self,
        batch: Vec<MasterRecord>,
        mode: PersistMode,
        policy: CorruptMasterPolicy,
    ) -> Result<Vec<MasterRecord>> {
        match self.persist(batch.clone(), mode) {
            Ok((records, _)) => Ok(records),
            Err(AppError::PersistenceCorruption { path, reason })
                if policy == CorruptMasterPolicy::Overwrite =>
            {
                warn!(
                    "Master file {} is unreadable ({reason}); replacing it with this batch",
                    path.display()
                );
                self.quarantine()?;
                Ok(self.persist(batch, PersistMode::Overwrite)?.0)
            }
            Err(e) => Err(e),
        }
    }

    /// Moves an unreadable master file aside so it can be inspected later.
    pub fn quarantine(&self) -> Result<PathBuf> {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S")));
        let target = self.path.with_file_name(name);
        std::fs::rename(&self.path, &target)?;
        warn!("Moved unreadable master file to {}", target.display());
        Ok(target)
    }

    fn corrupt(&self, reason: String) -> AppError {
        AppError::PersistenceCorruption {
            path: self.path.clone(),
            reason,
        }
    }
}

/// Writes `bytes` to a temp file beside `path`, syncs it, then renames it
/// over `path`. Readers see the old contents or the new, never a mix.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| AppError::Config(format!("{} is not a file path", path.display())))?;
    let tmp = dir.join(format!(
        ".{}.tmp-{}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let written = File::create(&tmp).and_then(|mut f| {
        f.write_all(bytes)?;
        f.sync_all()
    });
    if let Err(e) = written.and_then(|()| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
