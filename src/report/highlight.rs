//! HTML highlight report
//!
//! Shows a file's text inside `<PRE>` with every replaced number marked in
//! red and followed by its pseudonym in green.

use crate::core::scanner::Occurrence;
use crate::domain::{FilterError, NhsNumber, Result, NHS_NUMBER_LEN};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const SPAN: u64 = NHS_NUMBER_LEN as u64;

/// Location of the highlight report for `source`
pub fn highlight_path(source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{name}.html"))
}

/// Write the highlight page for `reader`
///
/// `pairs` must be in offset order. Text outside the marked spans is
/// HTML-escaped; bytes that are not UTF-8 are shown as replacement
/// characters.
pub fn write_highlight<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    pairs: &[(Occurrence, NhsNumber)],
) -> io::Result<()> {
    writer.write_all(b"<PRE>")?;

    let mut cursor = 0u64;
    let mut buf = Vec::new();
    for (occurrence, pseudonym) in pairs {
        if occurrence.offset < cursor {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("occurrence at {} overlaps previous span", occurrence.offset),
            ));
        }

        buf.clear();
        (&mut reader)
            .take(occurrence.offset - cursor)
            .read_to_end(&mut buf)?;
        write_escaped(&mut writer, &buf)?;

        let skipped = io::copy(&mut (&mut reader).take(SPAN), &mut io::sink())?;
        if skipped != SPAN {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("occurrence at {} lies past end of input", occurrence.offset),
            ));
        }

        write!(
            writer,
            "<span style='background-color: Red'>{}</span> => <span style='background-color: LawnGreen'>{}</span>",
            occurrence.number, pseudonym
        )?;
        cursor = occurrence.offset + SPAN;
    }

    buf.clear();
    reader.read_to_end(&mut buf)?;
    write_escaped(&mut writer, &buf)?;

    writer.write_all(b"</PRE>\n")?;
    writer.flush()
}

/// Write the highlight report for `source` to `dest`
pub fn write_highlight_file(
    source: &Path,
    dest: &Path,
    pairs: &[(Occurrence, NhsNumber)],
) -> Result<()> {
    let output_error = |message: String| FilterError::Output {
        path: dest.to_path_buf(),
        message,
    };

    let input = File::open(source)
        .map_err(|e| output_error(format!("cannot open {}: {e}", source.display())))?;
    let output = File::create(dest).map_err(|e| output_error(e.to_string()))?;

    write_highlight(BufReader::new(input), BufWriter::new(output), pairs)
        .map_err(|e| output_error(e.to_string()))
}

fn write_escaped<W: Write>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    let text = String::from_utf8_lossy(bytes);
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    writer.write_all(escaped.as_bytes())
}
