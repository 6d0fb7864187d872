// log.rs — Append-only JSONL decision log with a hash chain.
//
// One JSON object per line. Each event's `previous_hash` is the SHA-256 of
// the preceding raw line, so inserting, deleting or editing a line breaks
// the chain at the next event.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use sf_policy::SecurityDecision;

use crate::error::AuditError;
use crate::event::AuditEvent;
use crate::hasher;

pub struct AuditLog {
    writer: BufWriter<File>,
    path: PathBuf,
    /// Hash of the last line written; the next event links to it.
    last_hash: Option<String>,
}

impl AuditLog {
    /// Open or create the log, recovering the chain head from existing lines.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| AuditError::OpenFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let last_hash = if path.exists() {
            Self::read_last_hash(&path)?
        } else {
            None
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AuditError::OpenFailed {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
            last_hash,
        })
    }

    /// Link `event` to the chain head, write it and flush.
    pub fn append(&mut self, event: &mut AuditEvent) -> Result<(), AuditError> {
        event.previous_hash = self.last_hash.clone();
        let json = serde_json::to_string(event)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        self.last_hash = Some(hasher::hash_str(&json));
        Ok(())
    }

    /// Append a decision event for `decision` and return it.
    pub fn record(&mut self, decision: &SecurityDecision) -> Result<AuditEvent, AuditError> {
        let mut event = AuditEvent::for_decision(decision)?;
        self.append(&mut event)?;
        tracing::debug!(
            "audited {} for intent {} in {}",
            decision.decision,
            decision.intent_id,
            self.path.display()
        );
        Ok(event)
    }

    /// Every event in the file, oldest first. Blank lines are skipped.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<AuditEvent>, AuditError> {
        let mut events = Vec::new();
        for line in Self::lines(path.as_ref())? {
            let (_, line) = line?;
            events.push(serde_json::from_str(&line)?);
        }
        Ok(events)
    }

    /// Check every `previous_hash` link. Returns `Ok(true)` or an
    /// `IntegrityViolation` naming the first broken line (1-based).
    pub fn verify_chain(path: impl AsRef<Path>) -> Result<bool, AuditError> {
        let mut previous_hash: Option<String> = None;

        for line in Self::lines(path.as_ref())? {
            let (line_num, line) = line?;
            let event: AuditEvent = serde_json::from_str(&line)?;

            if event.previous_hash != previous_hash {
                return Err(AuditError::IntegrityViolation {
                    line: line_num,
                    expected: previous_hash.unwrap_or_else(|| "None".to_string()),
                    actual: event.previous_hash.unwrap_or_else(|| "None".to_string()),
                });
            }
            // Hash the raw line; re-serializing could reorder fields.
            previous_hash = Some(hasher::hash_str(&line));
        }

        Ok(true)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_last_hash(path: &Path) -> Result<Option<String>, AuditError> {
        let mut last_line = None;
        for line in Self::lines(path)? {
            last_line = Some(line?.1);
        }
        Ok(last_line.map(|line| hasher::hash_str(&line)))
    }

    /// Non-blank lines with their 1-based line numbers.
    fn lines(
        path: &Path,
    ) -> Result<impl Iterator<Item = Result<(usize, String), AuditError>>, AuditError> {
        let file = File::open(path).map_err(|source| AuditError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(BufReader::new(file)
            .lines()
            .enumerate()
            .filter_map(|(i, line)| match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(Ok((i + 1, line))),
                Err(e) => Some(Err(AuditError::from(e))),
            }))
    }
}
