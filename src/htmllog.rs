//! HTML conversion log.
//!
//! When logging is enabled the dispatcher writes one timestamped HTML file
//! next to the first input, appends a paragraph per finished job (after its
//! batch joins, in input order), and closes with the run summary.
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::channel::ChannelSelection;
use crate::report::{JobOutcome, RunTotals};

const BR: &str = "<br />";

/// An open HTML log file.
#[derive(Debug)]
pub struct HtmlLog {
    file: File,
    path: PathBuf,
}

/// `dd-Mon-yyyy-HHMM_log.html`, e.g. `14-Nov-2023-2213_log.html`.
fn log_file_name(now: OffsetDateTime) -> io::Result<String> {
    const NAME_FORMAT: &[FormatItem<'_>] =
        format_description!("[day]-[month repr:short]-[year]-[hour][minute]");
    let stamp = now.format(NAME_FORMAT).map_err(io::Error::other)?;
    Ok(format!("{stamp}_log.html"))
}

impl HtmlLog {
    /// Create the log next to `first_input` and write the preamble: document
    /// head, start time, and the four channel labels.
    pub fn create_next_to(first_input: &Path, labels: &ChannelSelection) -> io::Result<Self> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let dir = match first_input.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let path = dir.join(log_file_name(now)?);
        let mut file = File::create(&path)?;

        writeln!(
            file,
            "<!doctype html>\n<html lang='en'>\n<head>\n\
             <meta charset='utf-8'>\n\n  <title>EDF to CFS Log</title>\n\
             <meta name='description' content='Conversion Log'>\n\
             </head>\n\n<body>"
        )?;
        writeln!(file, "<p>Logging started{BR}")?;
        writeln!(file, "C3-A2 channel label: {}{BR}", labels.c3)?;
        writeln!(file, "C4-A1 channel label: {}{BR}", labels.c4)?;
        writeln!(file, "EL-A2 channel label: {}{BR}", labels.el)?;
        writeln!(file, "ER-A1 channel label: {}{BR}", labels.er)?;
        writeln!(file, "</p><hr>")?;

        Ok(HtmlLog { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one job's paragraph: its message stream, plus a highlighted
    /// error line when the job failed.
    pub fn append_outcome(&mut self, outcome: &JobOutcome) -> io::Result<()> {
        writeln!(self.file, "<p>Filename: {}{BR}", outcome.path.display())?;
        for line in outcome.log.lines() {
            writeln!(self.file, "{line}{BR}")?;
        }
        if let Err(err) = &outcome.result {
            writeln!(
                self.file,
                "<strong style='color:red;'>ERROR: {err}</strong>{BR}"
            )?;
        }
        writeln!(self.file, "</p>")?;
        Ok(())
    }

    /// Write the run summary and close the document.
    pub fn finish(mut self, totals: RunTotals, elapsed_secs: u64) -> io::Result<()> {
        writeln!(
            self.file,
            "<p>{} files processed in {elapsed_secs} seconds.{BR}",
            totals.processed()
        )?;
        writeln!(
            self.file,
            "{} files converted successfully. {} files could not be converted.</p>",
            totals.converted, totals.failed
        )?;
        writeln!(self.file, "</body>\n</html>")?;
        self.file.flush()
    }
}
