//! Redacted copy writer
//!
//! Streams the source bytes to the output, swapping each flagged 10-byte
//! span for its pseudonym. Pseudonyms are always ten digits, so the output
//! has the same length as the input and every other byte is unchanged.

use crate::domain::{FilterError, NhsNumber, Result, NHS_NUMBER_LEN};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const SPAN: u64 = NHS_NUMBER_LEN as u64;

/// One span to replace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    /// Byte offset of the original number
    pub offset: u64,
    /// Text written in its place
    pub replacement: NhsNumber,
}

/// Name of the redacted sibling of `source`
///
/// # Examples
///
/// ```
/// use nhsfilter::core::rewriter::output_path;
/// use std::path::Path;
///
/// let out = output_path(Path::new("data/visits.csv"), "ANON_");
/// assert_eq!(out, Path::new("data/ANON_visits.csv"));
/// ```
pub fn output_path(source: &Path, prefix: &str) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{prefix}{name}"))
}

/// Copy `reader` to `writer`, applying substitutions in offset order
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Fails with `InvalidInput` if substitutions overlap or are out of order,
/// and with `UnexpectedEof` if a span lies past the end of the input.
pub fn rewrite<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    substitutions: &[Substitution],
) -> io::Result<u64> {
    let mut cursor = 0u64;
    let mut written = 0u64;

    for sub in substitutions {
        if sub.offset < cursor {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("substitution at {} overlaps previous span", sub.offset),
            ));
        }

        let gap = sub.offset - cursor;
        let copied = io::copy(&mut (&mut reader).take(gap), &mut writer)?;
        let skipped = io::copy(&mut (&mut reader).take(SPAN), &mut io::sink())?;
        if copied != gap || skipped != SPAN {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("substitution at {} lies past end of input", sub.offset),
            ));
        }

        writer.write_all(&sub.replacement.digits())?;
        written += copied + SPAN;
        cursor = sub.offset + SPAN;
    }

    written += io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    Ok(written)
}

/// Write the redacted copy of `source` to `dest`
///
/// The output is assembled in a temporary file next to `dest` and only
/// moved into place once complete, so a failure never leaves a partial
/// output behind.
pub fn rewrite_file(source: &Path, dest: &Path, substitutions: &[Substitution]) -> Result<u64> {
    let output_error = |message: String| FilterError::Output {
        path: dest.to_path_buf(),
        message,
    };

    let input = File::open(source)
        .map_err(|e| output_error(format!("cannot open {}: {e}", source.display())))?;
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| output_error(e.to_string()))?;

    let written = rewrite(
        BufReader::new(input),
        BufWriter::new(tmp.as_file_mut()),
        substitutions,
    )
    .map_err(|e| output_error(e.to_string()))?;

    tmp.persist(dest).map_err(|e| output_error(e.to_string()))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn nhs(s: &str) -> NhsNumber {
        NhsNumber::parse(s).unwrap()
    }

    fn rewrite_vec(input: &[u8], subs: &[Substitution]) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        rewrite(input, &mut out, subs)?;
        Ok(out)
    }

    #[test]
    fn test_single_substitution() {
        let out = rewrite_vec(
            b"ID:9434765919 end",
            &[Substitution {
                offset: 3,
                replacement: nhs("4010232137"),
            }],
        )
        .unwrap();
        assert_eq!(out, b"ID:4010232137 end");
    }

    #[test]
    fn test_length_and_surrounding_bytes_preserved() {
        let input = b"\x00\xffa,9434765919,b\r\n0123456789\xfe";
        let subs = [
            Substitution {
                offset: 4,
                replacement: nhs("4010232137"),
            },
            Substitution {
                offset: 18,
                replacement: nhs("0000000000"),
            },
        ];

        let out = rewrite_vec(input, &subs).unwrap();
        assert_eq!(out.len(), input.len());
        assert_eq!(&out[..4], &input[..4]);
        assert_eq!(&out[4..14], b"4010232137");
        assert_eq!(&out[14..18], &input[14..18]);
        assert_eq!(&out[18..28], b"0000000000");
        assert_eq!(&out[28..], &input[28..]);
    }

    #[test]
    fn test_no_substitutions_copies_verbatim() {
        let input = b"nothing to see 12345";
        assert_eq!(rewrite_vec(input, &[]).unwrap(), input);
    }

    #[test]
    fn test_overlapping_substitutions_rejected() {
        let subs = [
            Substitution {
                offset: 0,
                replacement: nhs("4010232137"),
            },
            Substitution {
                offset: 5,
                replacement: nhs("4010232137"),
            },
        ];
        let err = rewrite_vec(b"9434765919 9434765919", &subs).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_span_past_end_rejected() {
        let subs = [Substitution {
            offset: 5,
            replacement: nhs("4010232137"),
        }];
        let err = rewrite_vec(b"short", &subs).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_output_path_keeps_directory() {
        assert_eq!(
            output_path(Path::new("/tmp/x/data.CSV"), "ANON_"),
            PathBuf::from("/tmp/x/ANON_data.CSV")
        );
        assert_eq!(output_path(Path::new("data.csv"), "ANON_"), PathBuf::from("ANON_data.csv"));
    }

    #[test]
    fn test_rewrite_file() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("in.csv");
        let dest = output_path(&source, "ANON_");
        fs::write(&source, b"a,9434765919\n").unwrap();

        let written = rewrite_file(
            &source,
            &dest,
            &[Substitution {
                offset: 2,
                replacement: nhs("4010232137"),
            }],
        )
        .unwrap();

        assert_eq!(written, 13);
        assert_eq!(fs::read(&dest).unwrap(), b"a,4010232137\n");
        assert_eq!(fs::read(&source).unwrap(), b"a,9434765919\n");
    }

    #[test]
    fn test_rewrite_file_failure_leaves_no_output() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("in.csv");
        let dest = output_path(&source, "ANON_");
        fs::write(&source, b"short").unwrap();

        let result = rewrite_file(
            &source,
            &dest,
            &[Substitution {
                offset: 3,
                replacement: nhs("4010232137"),
            }],
        );

        assert!(matches!(result, Err(FilterError::Output { .. })));
        assert!(!dest.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
