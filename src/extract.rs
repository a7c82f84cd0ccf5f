use crate::format::ArchiveFormat;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};
use tar::{Archive, EntryType};
use thiserror::Error;
use xz2::read::XzDecoder;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported archive format: {}", .0.display())]
    Unsupported(PathBuf),
    #[error("unexpected entry '{name}' of type {kind} in archive")]
    UnexpectedEntry { name: String, kind: String },
    #[error("file '{0}' not found in archive")]
    NotFound(String),
    #[error("could not open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("could not create {}: {source}", .path.display())]
    Create { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Pulls the file named `target` out of `source` and writes it to `dest`.
///
/// Members are matched by base name, so `bin/tool` inside an archive matches a
/// target of `tool`. Bare `.gz` files are not archives: their whole
/// decompressed stream is written and `target` is ignored.
///
/// On error `dest` may be left empty or partially written.
pub fn extract(source: &Path, dest: &Path, target: &str) -> Result<(), ExtractError> {
    let format = ArchiveFormat::from_path(source.to_string_lossy())
        .ok_or_else(|| ExtractError::Unsupported(source.to_path_buf()))?;
    tracing::debug!(
        "Extracting '{}' from {} as {:?}",
        target,
        source.display(),
        format
    );

    let input = File::open(source).map_err(|e| ExtractError::Open {
        path: source.to_path_buf(),
        source: e,
    })?;
    let mut output = File::create(dest).map_err(|e| ExtractError::Create {
        path: dest.to_path_buf(),
        source: e,
    })?;

    match format {
        ArchiveFormat::Zip => extract_zip(input, &mut output, target),
        ArchiveFormat::TarGz => extract_tar(GzDecoder::new(input), &mut output, target),
        ArchiveFormat::TarXz => extract_tar(XzDecoder::new(input), &mut output, target),
        ArchiveFormat::Gzip => {
            io::copy(&mut GzDecoder::new(input), &mut output)?;
            Ok(())
        }
    }
}

fn base_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
}

fn extract_zip<R: Read + Seek>(
    input: R,
    output: &mut File,
    target: &str,
) -> Result<(), ExtractError> {
    let mut archive = zip::ZipArchive::new(input)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        if base_name(file.name()) == target {
            tracing::debug!("Found '{}' at zip entry {}", target, file.name());
            io::copy(&mut file, output)?;
            return Ok(());
        }
    }

    Err(ExtractError::NotFound(target.to_string()))
}

fn extract_tar<R: Read>(input: R, output: &mut File, target: &str) -> Result<(), ExtractError> {
    let mut archive = Archive::new(input);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().into_owned();

        match entry.header().entry_type() {
            EntryType::Directory => continue,
            EntryType::Regular => {
                if base_name(&name) == target {
                    tracing::debug!("Found '{}' at tar entry {}", target, name);
                    io::copy(&mut entry, output)?;
                    return Ok(());
                }
            }
            other => {
                return Err(ExtractError::UnexpectedEntry {
                    name,
                    kind: format!("{:?}", other),
                });
            }
        }
    }

    Err(ExtractError::NotFound(target.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;
    use std::io::Write;
    use tar::{Builder, Header};
    use tempfile::TempDir;
    use xz2::write::XzEncoder;

    enum Member<'a> {
        Dir(&'a str),
        File(&'a str, &'a [u8]),
        Symlink(&'a str, &'a str),
    }

    fn tar_bytes(members: &[Member]) -> Vec<u8> {
        let mut builder = Builder::new(Vec::new());
        for member in members {
            let mut header = Header::new_gnu();
            header.set_mode(0o755);
            match member {
                Member::Dir(path) => {
                    header.set_entry_type(EntryType::Directory);
                    header.set_size(0);
                    header.set_cksum();
                    builder.append_data(&mut header, path, io::empty()).unwrap();
                }
                Member::File(path, data) => {
                    header.set_entry_type(EntryType::Regular);
                    header.set_size(data.len() as u64);
                    header.set_cksum();
                    builder.append_data(&mut header, path, *data).unwrap();
                }
                Member::Symlink(path, link) => {
                    header.set_entry_type(EntryType::Symlink);
                    header.set_size(0);
                    header.set_link_name(link).unwrap();
                    header.set_cksum();
                    builder.append_data(&mut header, path, io::empty()).unwrap();
                }
            }
        }
        builder.into_inner().unwrap()
    }

    fn write_tar_gz(dir: &Path, name: &str, members: &[Member]) -> PathBuf {
        let path = dir.join(name);
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(&tar_bytes(members)).unwrap();
        encoder.finish().unwrap();
        path
    }

    fn write_tar_xz(dir: &Path, name: &str, members: &[Member]) -> PathBuf {
        let path = dir.join(name);
        let mut encoder = XzEncoder::new(File::create(&path).unwrap(), 6);
        encoder.write_all(&tar_bytes(members)).unwrap();
        encoder.finish().unwrap();
        path
    }

    fn write_zip(dir: &Path, name: &str, members: &[Member]) -> PathBuf {
        let path = dir.join(name);
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        let options = zip::write::FileOptions::default();
        for member in members {
            match member {
                Member::Dir(p) => writer.add_directory(*p, options).unwrap(),
                Member::File(p, data) => {
                    writer.start_file(*p, options).unwrap();
                    writer.write_all(data).unwrap();
                }
                Member::Symlink(..) => unreachable!("zip fixtures hold no symlinks"),
            }
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_zip_matches_base_name_at_any_depth() {
        let tmp = TempDir::new().unwrap();
        let archive = write_zip(
            tmp.path(),
            "tool.zip",
            &[
                Member::Dir("bin/"),
                Member::File("README.md", b"readme"),
                Member::File("bin/tool", b"#!/bin/sh\necho tool\n"),
            ],
        );
        let dest = tmp.path().join("out");

        extract(&archive, &dest, "tool").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"#!/bin/sh\necho tool\n");
    }

    #[test]
    fn test_zip_first_match_wins() {
        let tmp = TempDir::new().unwrap();
        let archive = write_zip(
            tmp.path(),
            "tool.zip",
            &[
                Member::File("a/tool", b"first"),
                Member::File("b/tool", b"second"),
            ],
        );
        let dest = tmp.path().join("out");

        extract(&archive, &dest, "tool").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"first");
    }

    #[test]
    fn test_zip_directory_with_target_name_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let archive = write_zip(
            tmp.path(),
            "tool.zip",
            &[Member::Dir("tool/"), Member::File("tool/LICENSE", b"MIT")],
        );
        let dest = tmp.path().join("out");

        let err = extract(&archive, &dest, "tool").unwrap_err();

        assert!(matches!(err, ExtractError::NotFound(ref t) if t == "tool"));
    }

    #[test]
    fn test_tar_gz_extracts_nested_member() {
        let tmp = TempDir::new().unwrap();
        let archive = write_tar_gz(
            tmp.path(),
            "tool_linux_amd64.tar.gz",
            &[
                Member::Dir("tool_linux_amd64/"),
                Member::File("tool_linux_amd64/LICENSE", b"MIT"),
                Member::File("tool_linux_amd64/tool", b"binary-bytes"),
            ],
        );
        let dest = tmp.path().join("tool");

        extract(&archive, &dest, "tool").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"binary-bytes");
    }

    #[test]
    fn test_tgz_uses_gzip_pipeline() {
        let tmp = TempDir::new().unwrap();
        let archive = write_tar_gz(tmp.path(), "tool.tgz", &[Member::File("tool", b"tgz")]);
        let dest = tmp.path().join("out");

        extract(&archive, &dest, "tool").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"tgz");
    }

    #[test]
    fn test_tar_xz_and_txz() {
        let tmp = TempDir::new().unwrap();
        for name in ["tool.tar.xz", "tool.txz"] {
            let archive = write_tar_xz(
                tmp.path(),
                name,
                &[Member::Dir("dist/"), Member::File("dist/tool", b"xz-bytes")],
            );
            let dest = tmp.path().join(format!("{}.out", name));

            extract(&archive, &dest, "tool").unwrap();

            assert_eq!(fs::read(&dest).unwrap(), b"xz-bytes");
        }
    }

    #[test]
    fn test_tar_gz_only_directory_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let archive = write_tar_gz(tmp.path(), "tool.tar.gz", &[Member::Dir("tool/")]);
        let dest = tmp.path().join("out");

        let err = extract(&archive, &dest, "tool").unwrap_err();

        assert!(matches!(err, ExtractError::NotFound(ref t) if t == "tool"));
        assert!(err.to_string().contains("tool"));
    }

    #[test]
    fn test_tar_unexpected_entry_type_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let archive = write_tar_gz(
            tmp.path(),
            "tool.tar.gz",
            &[
                Member::Symlink("bin/latest", "tool"),
                Member::File("bin/tool", b"never reached"),
            ],
        );
        let dest = tmp.path().join("out");

        let err = extract(&archive, &dest, "tool").unwrap_err();

        match err {
            ExtractError::UnexpectedEntry { name, kind } => {
                assert_eq!(name, "bin/latest");
                assert_eq!(kind, "Symlink");
            }
            other => panic!("expected UnexpectedEntry, got {:?}", other),
        }
    }

    #[test]
    fn test_tar_stops_reading_after_match() {
        let tmp = TempDir::new().unwrap();
        let archive = write_tar_gz(
            tmp.path(),
            "tool.tar.gz",
            &[
                Member::File("tool", b"found"),
                Member::Symlink("link", "tool"),
            ],
        );
        let dest = tmp.path().join("out");

        extract(&archive, &dest, "tool").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"found");
    }

    #[test]
    fn test_bare_gzip_copies_whole_stream() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("tool_linux_amd64.gz");
        let payload: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
        let mut encoder = GzEncoder::new(File::create(&source).unwrap(), Compression::default());
        encoder.write_all(&payload).unwrap();
        encoder.finish().unwrap();
        let dest = tmp.path().join("out");

        extract(&source, &dest, "irrelevant").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), payload);
    }

    #[test]
    fn test_unsupported_format_names_source() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("tool.tar.bz2");
        fs::write(&source, b"not really bzip2").unwrap();
        let dest = tmp.path().join("out");

        let err = extract(&source, &dest, "tool").unwrap_err();

        assert!(matches!(err, ExtractError::Unsupported(ref p) if p == &source));
        assert!(err.to_string().contains("tool.tar.bz2"));
        assert!(!dest.exists());
    }

    #[test]
    fn test_missing_source_is_open_error() {
        let tmp = TempDir::new().unwrap();
        let err = extract(
            &tmp.path().join("missing.zip"),
            &tmp.path().join("out"),
            "tool",
        )
        .unwrap_err();

        assert!(matches!(err, ExtractError::Open { .. }));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("bin/tool"), "tool");
        assert_eq!(base_name("tool"), "tool");
        assert_eq!(base_name("a/b/c/tool.exe"), "tool.exe");
        assert_eq!(base_name("bin\\tool.exe"), "tool.exe");
    }
}
