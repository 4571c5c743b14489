//! File-backed run log.

use crate::RunLogError;
use crate::csv::{self, Row};
use crate::record::RunRecord;
use chrono::{SecondsFormat, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Column holding the generated run id.
pub const RUN_ID_COLUMN: &str = "run_id";
/// Column holding the RFC 3339 append time.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// An append-only CSV log of generation runs.
///
/// Nothing is cached between calls; each append reads the current header
/// so several processes can share one file (last writer wins on a header
/// rewrite).
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

/// Header plus data rows as read from disk.
struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    /// The file has content but its last row is not newline-terminated.
    unterminated: bool,
}

impl RunLog {
    /// Create a run log at the given path. The file and its parent
    /// directories are created on the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a run, returning its run id.
    ///
    /// A `run_id` and `timestamp` column are added at the front unless the
    /// record already has them. Columns the file has not seen before are
    /// appended to the header and older rows are padded with empty cells.
    pub fn append(&self, record: &RunRecord) -> Result<String, RunLogError> {
        if record.is_empty() {
            return Err(RunLogError::EmptyRecord);
        }

        let mut record = record.clone();
        if !record.contains(TIMESTAMP_COLUMN) {
            record.prepend(
                TIMESTAMP_COLUMN,
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        }
        if !record.contains(RUN_ID_COLUMN) {
            record.prepend(RUN_ID_COLUMN, Uuid::new_v4());
        }
        let run_id = record.get(RUN_ID_COLUMN).unwrap_or_default().to_string();

        let mut table = self.load()?;
        let new_columns: Vec<String> = record
            .columns()
            .filter(|c| !table.header.iter().any(|h| h == *c))
            .map(str::to_string)
            .collect();

        if table.header.is_empty() {
            table.header = new_columns;
            let row = row_for(&table.header, &record);
            self.rewrite(&table.header, &[row])?;
            info!(path = %self.path.display(), columns = table.header.len(), "Run log created");
        } else if !new_columns.is_empty() {
            debug!(added = ?new_columns, "Extending run log header");
            table.header.extend(new_columns);
            let width = table.header.len();
            for row in &mut table.rows {
                row.resize(width, String::new());
            }
            table.rows.push(row_for(&table.header, &record));
            self.rewrite(&table.header, &table.rows)?;
        } else {
            let row = row_for(&table.header, &record);
            let mut line = csv::encode_row(&row);
            if table.unterminated {
                line.insert(0, '\n');
            }
            let mut file = OpenOptions::new().append(true).open(&self.path)?;
            file.write_all(line.as_bytes())?;
        }

        debug!(run_id = %run_id, path = %self.path.display(), "Run logged");
        Ok(run_id)
    }

    /// Read every logged run. A missing file reads as an empty log.
    pub fn read_all(&self) -> Result<Vec<RunRecord>, RunLogError> {
        let table = self.load()?;
        Ok(table
            .rows
            .iter()
            .map(|row| {
                table
                    .header
                    .iter()
                    .zip(row)
                    .fold(RunRecord::new(), |rec, (c, v)| rec.with(c.as_str(), v))
            })
            .collect())
    }

    /// Column names currently in the header.
    pub fn columns(&self) -> Result<Vec<String>, RunLogError> {
        Ok(self.load()?.header)
    }

    fn load(&self) -> Result<Table, RunLogError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        let unterminated = !content.is_empty() && !content.ends_with('\n');

        let mut rows = csv::parse(&content)
            .map_err(|(line, reason)| RunLogError::Malformed { line, reason })?
            .into_iter();

        let Some(Row { fields: header, .. }) = rows.next() else {
            return Ok(Table {
                header: Vec::new(),
                rows: Vec::new(),
                unterminated,
            });
        };

        let rows = rows
            .map(|Row { line, mut fields }| {
                if fields.len() > header.len() {
                    return Err(RunLogError::Malformed {
                        line,
                        reason: format!(
                            "row has {} fields but header has {}",
                            fields.len(),
                            header.len()
                        ),
                    });
                }
                fields.resize(header.len(), String::new());
                Ok(fields)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Table {
            header,
            rows,
            unterminated,
        })
    }

    fn rewrite(&self, header: &[String], rows: &[Vec<String>]) -> Result<(), RunLogError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut content = csv::encode_row(header);
        for row in rows {
            content.push_str(&csv::encode_row(row));
        }
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Lay out a record's values in header order.
fn row_for(header: &[String], record: &RunRecord) -> Vec<String> {
    header
        .iter()
        .map(|c| record.get(c).unwrap_or_default().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use subprompt_core::tokenize;

    fn temp_log() -> (tempfile::TempDir, RunLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("logs").join("runs.csv"));
        (dir, log)
    }

    #[test]
    fn first_append_creates_file_and_header() {
        let (_dir, log) = temp_log();
        let run_id = log
            .append(&RunRecord::new().with("seed", 42).with("steps", 50))
            .unwrap();

        assert!(log.path().exists());
        assert_eq!(
            log.columns().unwrap(),
            vec!["run_id", "timestamp", "seed", "steps"]
        );
        let runs = log.read_all().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].get("run_id"), Some(run_id.as_str()));
        assert_eq!(runs[0].get("seed"), Some("42"));
    }

    #[test]
    fn matching_columns_append_in_header_order() {
        let (_dir, log) = temp_log();
        log.append(&RunRecord::new().with("seed", 1).with("steps", 10)).unwrap();
        log.append(&RunRecord::new().with("steps", 20).with("seed", 2)).unwrap();

        let runs = log.read_all().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].get("seed"), Some("2"));
        assert_eq!(runs[1].get("steps"), Some("20"));
        assert_eq!(log.columns().unwrap().len(), 4);
    }

    #[test]
    fn new_columns_extend_header_and_pad_old_rows() {
        let (_dir, log) = temp_log();
        log.append(&RunRecord::new().with("seed", 1)).unwrap();
        log.append(&RunRecord::new().with("seed", 2).with("sampler", "plms")).unwrap();

        assert_eq!(
            log.columns().unwrap(),
            vec!["run_id", "timestamp", "seed", "sampler"]
        );
        let runs = log.read_all().unwrap();
        assert_eq!(runs[0].get("sampler"), Some(""));
        assert_eq!(runs[1].get("sampler"), Some("plms"));
    }

    #[test]
    fn missing_columns_get_empty_cells() {
        let (_dir, log) = temp_log();
        log.append(&RunRecord::new().with("seed", 1).with("scale", 7.5)).unwrap();
        log.append(&RunRecord::new().with("seed", 2)).unwrap();

        let runs = log.read_all().unwrap();
        assert_eq!(runs[1].get("scale"), Some(""));
    }

    #[test]
    fn prompt_records_survive_quoting() {
        let (_dir, log) = temp_log();
        let prompt = "a cat, \"fluffy\":0.5 a dog:1.5";
        log.append(&RunRecord::from_prompt(prompt, &tokenize(prompt))).unwrap();

        let runs = log.read_all().unwrap();
        assert_eq!(runs[0].get("prompt"), Some(prompt));
        assert_eq!(runs[0].get("weights"), Some("0.5;1.5"));
    }

    #[test]
    fn caller_supplied_run_id_is_kept() {
        let (_dir, log) = temp_log();
        let id = log
            .append(&RunRecord::new().with("run_id", "fixed").with("seed", 3))
            .unwrap();
        assert_eq!(id, "fixed");
    }

    #[test]
    fn empty_record_is_rejected() {
        let (_dir, log) = temp_log();
        assert!(matches!(
            log.append(&RunRecord::new()),
            Err(RunLogError::EmptyRecord)
        ));
        assert!(!log.path().exists());
    }

    #[test]
    fn missing_file_reads_empty() {
        let (_dir, log) = temp_log();
        assert!(log.read_all().unwrap().is_empty());
        assert!(log.columns().unwrap().is_empty());
    }

    #[test]
    fn overlong_row_is_malformed() {
        let (_dir, log) = temp_log();
        std::fs::create_dir_all(log.path().parent().unwrap()).unwrap();
        std::fs::write(log.path(), "a,b\n1,2,3\n").unwrap();
        match log.read_all() {
            Err(RunLogError::Malformed { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn append_after_unterminated_last_row() {
        let (_dir, log) = temp_log();
        std::fs::create_dir_all(log.path().parent().unwrap()).unwrap();
        std::fs::write(log.path(), "run_id,timestamp,seed\nA,T,1").unwrap();

        log.append(&RunRecord::new().with("seed", 2)).unwrap();

        let runs = log.read_all().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].get("seed"), Some("1"));
        assert_eq!(runs[1].get("seed"), Some("2"));
        assert!(std::fs::read_to_string(log.path()).unwrap().ends_with('\n'));
    }
}
