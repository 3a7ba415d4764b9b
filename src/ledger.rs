use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tracing::info;

pub const HEADER: &str = "date,oikotie,lumo";

/// One day's counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingRecord {
    pub date: NaiveDate,
    pub oikotie: u64,
    pub lumo: u64,
}

impl ListingRecord {
    pub fn to_row(&self) -> String {
        format!("{},{},{}", self.date.format("%Y-%m-%d"), self.oikotie, self.lumo)
    }

    pub fn parse_row(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
        let [date, oikotie, lumo] = fields.as_slice() else {
            bail!("expected 3 fields, got {}", fields.len());
        };
        Ok(Self {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("bad date {:?}", date))?,
            oikotie: oikotie
                .parse()
                .with_context(|| format!("bad oikotie count {:?}", oikotie))?,
            lumo: lumo
                .parse()
                .with_context(|| format!("bad lumo count {:?}", lumo))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Appended,
    Replaced,
}

/// Dated CSV of daily counts, at most one row per date.
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Create the parent directory and a header-only file if none exists.
    pub fn ensure_initialized(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        if !self.path.exists() {
            fs::write(&self.path, format!("{}\n", HEADER))
                .with_context(|| format!("Failed to create {}", self.path.display()))?;
        }
        Ok(())
    }

    /// Replace the last row if it is for the same date, otherwise append.
    pub fn upsert(&self, record: &ListingRecord) -> Result<UpsertOutcome> {
        self.ensure_initialized()?;
        let date = record.date.format("%Y-%m-%d").to_string();
        let row = record.to_row();
        let content = self.read()?;

        let mut lines: Vec<&str> = content.lines().collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if lines.is_empty() {
            lines.push(HEADER);
        }

        let last_is_today = lines.len() >= 2
            && lines
                .last()
                .and_then(|l| l.split(',').next())
                .is_some_and(|d| d.trim() == date);

        let outcome = if last_is_today {
            let n = lines.len();
            lines[n - 1] = &row;
            self.rewrite(&lines)?;
            UpsertOutcome::Replaced
        } else if content.trim().is_empty() {
            lines.push(&row);
            self.rewrite(&lines)?;
            UpsertOutcome::Appended
        } else {
            let mut file = fs::OpenOptions::new()
                .append(true)
                .open(&self.path)
                .with_context(|| format!("Failed to open {}", self.path.display()))?;
            let sep = if content.ends_with('\n') { "" } else { "\n" };
            writeln!(file, "{}{}", sep, row)
                .with_context(|| format!("Failed to append to {}", self.path.display()))?;
            UpsertOutcome::Appended
        };

        info!("{:?} ledger row for {} in {}", outcome, date, self.path.display());
        Ok(outcome)
    }

    /// All data rows in file order.
    pub fn records(&self) -> Result<Vec<ListingRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = self.read()?;
        content
            .lines()
            .enumerate()
            .skip(1)
            .filter(|(_, l)| !l.trim().is_empty())
            .map(|(i, l)| {
                ListingRecord::parse_row(l)
                    .with_context(|| format!("{}:{}: malformed row", self.path.display(), i + 1))
            })
            .collect()
    }

    fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))
    }

    /// Sibling scratch file; renamed over the ledger once fully written.
    fn scratch_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn rewrite(&self, lines: &[&str]) -> Result<()> {
        let mut out = lines.join("\n");
        out.push('\n');
        let tmp = self.scratch_path();
        fs::write(&tmp, out).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))
    }
}
