//! File name classification for release assets.
//!
//! Everything here looks at the name only, never at file contents. Matching is
//! case-sensitive.

const ARCHIVED_EXTS: &[&str] = &[
    ".tar", ".tgz", ".tbz2", ".txz", ".zip", ".lzh", ".rar", ".7z",
];

const COMPRESSED_EXTS: &[&str] = &[
    ".gz", ".tgz", ".bz2", ".tbz2", ".xz", ".txz", ".zip", ".lzh", ".rar", ".7z",
];

/// Returns the extension of `name` including the leading dot, or `""`.
///
/// Only the final path segment is considered, so `dir.v1/tool` has no
/// extension.
pub fn extension(name: &str) -> &str {
    let base_start = name.rfind('/').map_or(0, |i| i + 1);
    match name[base_start..].rfind('.') {
        Some(i) => &name[base_start + i..],
        None => "",
    }
}

pub fn has_extension(name: &str) -> bool {
    !extension(name).is_empty()
}

pub fn is_archived(name: &str) -> bool {
    let ext = extension(name);
    if ARCHIVED_EXTS.contains(&ext) {
        return true;
    }
    // .tar.gz, .tar.bz2, .tar.xz
    !ext.is_empty() && extension(&name[..name.len() - ext.len()]) == ".tar"
}

pub fn is_compressed(name: &str) -> bool {
    COMPRESSED_EXTS.contains(&extension(name))
}

/// Extraction pipelines the extractor knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    TarXz,
    Gzip,
}

impl ArchiveFormat {
    const SUFFIXES: &'static [(&'static str, ArchiveFormat)] = &[
        (".zip", ArchiveFormat::Zip),
        (".tar.gz", ArchiveFormat::TarGz),
        (".tgz", ArchiveFormat::TarGz),
        (".tar.xz", ArchiveFormat::TarXz),
        (".txz", ArchiveFormat::TarXz),
        // Must come after .tar.gz so tarballs are not treated as single files
        (".gz", ArchiveFormat::Gzip),
    ];

    pub fn from_path<S: AsRef<str>>(path: S) -> Option<ArchiveFormat> {
        let path = path.as_ref();
        Self::SUFFIXES
            .iter()
            .find(|(suffix, _)| path.ends_with(suffix))
            .map(|(_, format)| *format)
    }
}
