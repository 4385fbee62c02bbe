//! CSV writers for consolidated groups.
//!
//! Every group is written twice: once to its own `<output_path><address>.csv`
//! and once into the combined `<output_path>/_total/output.csv`, where each
//! group is introduced by its quoted address and groups are separated by a
//! blank line.

use anyhow::{Context, Result};
use csv::Writer;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::models::Record;
use crate::table::Schema;

pub const COMBINED_FILE_NAME: &str = "output.csv";

/// `<output_path><address>.csv`. The address is used verbatim.
pub fn group_file_path(output_path: &str, address: &str) -> PathBuf {
    PathBuf::from(format!("{}{}.csv", output_path, address))
}

/// Write the header and every record through `writer`.
fn write_rows<W: Write>(writer: &mut Writer<W>, schema: &Schema, records: &[Record]) -> Result<()> {
    writer.write_record(&schema.headers)?;
    for record in records {
        writer.write_record(schema.render(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write one group to its own file, replacing any previous contents.
pub fn write_group_file(path: &Path, schema: &Schema, records: &[Record]) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    write_rows(&mut writer, schema, records)
        .with_context(|| format!("Failed to write output file: {}", path.display()))
}

/// Quoted label line introducing a group in the combined file.
pub fn address_label(address: &str) -> String {
    format!("\"{}\"", address.replace('"', "\"\""))
}

/// Combined output file, open for the lifetime of a run.
pub struct CombinedOutput {
    path: PathBuf,
    out: BufWriter<File>,
    groups_written: usize,
}

impl CombinedOutput {
    /// Create `<dir>/output.csv`, creating `dir` if needed and truncating any
    /// file left by an earlier run.
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        let path = dir.join(COMBINED_FILE_NAME);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create combined output: {}", path.display()))?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
            groups_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn groups_written(&self) -> usize {
        self.groups_written
    }

    /// Append a group. `is_first` comes from the driver: every group but the
    /// first is preceded by a blank separator line.
    pub fn append_group(
        &mut self,
        address: &str,
        schema: &Schema,
        records: &[Record],
        is_first: bool,
    ) -> Result<()> {
        if !is_first {
            writeln!(self.out)?;
        }
        writeln!(self.out, "{}", address_label(address))?;
        {
            let mut writer = Writer::from_writer(&mut self.out);
            write_rows(&mut writer, schema, records)?;
        }
        self.groups_written += 1;
        Ok(())
    }

    /// Flush buffered output to disk.
    pub fn finish(mut self) -> Result<()> {
        self.out
            .flush()
            .with_context(|| format!("Failed to flush combined output: {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::DEFAULT_CATEGORY_PREFIX;
    use csv::StringRecord;

    fn schema() -> Schema {
        let headers: Vec<String> = ["address", "in_search", "Rating", "Category1", "Category2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Schema::resolve(&headers, DEFAULT_CATEGORY_PREFIX).unwrap()
    }

    fn row(schema: &Schema, cells: &[&str]) -> Record {
        schema.parse_row(&StringRecord::from(cells.to_vec()))
    }

    #[test]
    fn test_group_file_path_concatenates() {
        assert_eq!(group_file_path("out/", "5 oak ave"), PathBuf::from("out/5 oak ave.csv"));
        assert_eq!(group_file_path("out/run1_", "5 oak ave"), PathBuf::from("out/run1_5 oak ave.csv"));
    }

    #[test]
    fn test_address_label_quotes() {
        assert_eq!(address_label("5 oak ave"), "\"5 oak ave\"");
        assert_eq!(address_label("the \"old\" mill"), "\"the \"\"old\"\" mill\"");
    }

    #[test]
    fn test_write_group_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("5 oak ave.csv");
        let s = schema();
        let records = vec![row(&s, &["5 oak ave", "True", "4.0", "cafe", ""])];
        write_group_file(&path, &s, &records).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "address,in_search,Rating,Category1,Category2\n5 oak ave,True,4.0,cafe,\n");
    }

    #[test]
    fn test_combined_output_separates_groups() {
        let dir = tempfile::tempdir().unwrap();
        let total = dir.path().join("_total");
        let s = schema();

        let mut combined = CombinedOutput::create(&total).unwrap();
        combined
            .append_group("a st", &s, &[row(&s, &["a st", "True", "4.0", "cafe", ""])], true)
            .unwrap();
        combined
            .append_group("b st", &s, &[row(&s, &["b st", "True", "3.0", "", ""])], false)
            .unwrap();
        assert_eq!(combined.groups_written(), 2);
        let path = combined.path().to_path_buf();
        combined.finish().unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(
            content,
            "\"a st\"\naddress,in_search,Rating,Category1,Category2\na st,True,4.0,cafe,\n\
             \n\
             \"b st\"\naddress,in_search,Rating,Category1,Category2\nb st,True,3.0,,\n"
        );
    }

    #[test]
    fn test_combined_output_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(COMBINED_FILE_NAME), "stale\n").unwrap();
        let combined = CombinedOutput::create(dir.path()).unwrap();
        combined.finish().unwrap();
        assert_eq!(fs::read_to_string(dir.path().join(COMBINED_FILE_NAME)).unwrap(), "");
    }
}
