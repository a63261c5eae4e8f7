use log::{info, warn};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::archive::IconArchive;
use super::error::ArchiveError;
use super::family::IconFamily;

/// The outcome of extracting an archive whose header was valid.
#[derive(Debug, Default)]
pub struct ExtractSummary {
    /// The ICNS files that were written, in archive order.
    pub written: Vec<PathBuf>,
    /// The icon records that were skipped, with the reason.
    pub skipped: Vec<(u32, ArchiveError)>,
}

/// Returns the directory used when no output directory is given:
/// `<input>.out`.
pub fn default_output_dir(input: &Path) -> PathBuf {
    let mut dir = OsString::from(input.as_os_str());
    dir.push(".out");
    PathBuf::from(dir)
}

/// Returns the file name for an extracted icon:
/// `<prefix>_<index>[_<name>].icns`.
pub fn output_file_name(prefix: &str, index: u32, name: &str) -> String {
    let mut file_name = format!("{}_{}", prefix, index);
    if !name.is_empty() {
        file_name.push('_');
        file_name.push_str(&sanitize_name(name));
    }
    file_name.push_str(".icns");
    file_name
}

/// Replaces characters that can't appear in a file name.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Converts every icon of an Icon Archiver file into an ICNS file in
/// `output_dir`, creating the directory if necessary.
///
/// Fails without writing anything if the archive header is invalid.  Icon
/// records that can't be decoded are logged and skipped; they are listed
/// in the returned summary.
pub fn extract_archive(input: &Path,
                       output_dir: &Path)
                       -> Result<ExtractSummary, ArchiveError> {
    let data = fs::read(input)?;
    let archive = IconArchive::parse(&data)?;
    let header = archive.header();
    info!("{}: Icon Archiver version {} file with {} icon(s)",
          input.display(),
          header.version.number(),
          header.icon_count);
    if let Some(ref extended) = header.extended {
        if !extended.copyright.is_empty() {
            info!("copyright: {}", extended.copyright);
        }
        if !extended.comment.is_empty() {
            info!("comment: {}", extended.comment);
        }
    }

    fs::create_dir_all(output_dir)?;
    let prefix = input.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "icon".to_string());
    let mut summary = ExtractSummary::default();
    for (index, result) in archive.records() {
        match result {
            Ok(decoded) => {
                let family = IconFamily::from_decoded(&decoded);
                let path = output_dir.join(output_file_name(&prefix,
                                                            index,
                                                            decoded.name()));
                write_icns(&path, &family)?;
                info!("... {}", path.display());
                summary.written.push(path);
            }
            Err(error) => {
                warn!("skipping icon {}: {}", index, error);
                summary.skipped.push((index, error));
            }
        }
    }
    Ok(summary)
}

fn write_icns(path: &Path, family: &IconFamily) -> Result<(), ArchiveError> {
    let mut writer = BufWriter::new(File::create(path)?);
    family.write(&mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_dir_appends_suffix() {
        assert_eq!(default_output_dir(Path::new("icons/Archive.iarc")),
                   PathBuf::from("icons/Archive.iarc.out"));
    }

    #[test]
    fn output_file_names() {
        assert_eq!(output_file_name("Archive", 0, ""), "Archive_0.icns");
        assert_eq!(output_file_name("Archive", 12, "Trash Can"),
                   "Archive_12_Trash Can.icns");
        assert_eq!(output_file_name("Archive", 3, "a/b:c\0"),
                   "Archive_3_a_b_c_.icns");
    }

    #[test]
    fn sanitize_keeps_mac_roman_text() {
        assert_eq!(sanitize_name("Café\u{2122}"), "Café\u{2122}");
        assert_eq!(sanitize_name("tab\there"), "tab_here");
    }
}
