//! Source snapshot archives (`.tar.gz`).

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Component, Path};

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Archive, Builder};
use walkdir::WalkDir;

/// Directory names never included in a source snapshot.
pub const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn", ".bzr"];

/// Archive `src` into `archive` with every entry below `prefix/`.
///
/// VCS metadata directories and any path for which `exclude` returns true are
/// skipped along with their contents. Returns the number of files written.
pub fn create_snapshot<F>(src: &Path, archive: &Path, prefix: &str, exclude: F) -> Result<usize>
where
    F: Fn(&Path) -> bool,
{
    let file = File::create(archive)
        .with_context(|| format!("failed to create archive: {}", archive.display()))?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = Builder::new(encoder);
    builder.follow_symlinks(false);

    let walker = WalkDir::new(src)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let is_vcs = e.file_type().is_dir()
                && VCS_DIRS.iter().any(|d| e.file_name() == std::ffi::OsStr::new(d));
            !is_vcs && !exclude(e.path())
        });

    let mut files = 0;
    for entry in walker {
        let entry = entry.context("failed to walk source tree")?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .context("walked outside the source tree")?;
        let name = Path::new(prefix).join(relative);

        if entry.file_type().is_dir() {
            builder
                .append_dir(&name, entry.path())
                .with_context(|| format!("failed to archive {}", entry.path().display()))?;
        } else {
            builder
                .append_path_with_name(entry.path(), &name)
                .with_context(|| format!("failed to archive {}", entry.path().display()))?;
            files += 1;
        }
    }

    let encoder = builder.into_inner().context("failed to finish archive")?;
    let mut writer = encoder
        .finish()
        .context("failed to finish compressing archive")?;
    writer
        .flush()
        .with_context(|| format!("failed to write archive: {}", archive.display()))?;

    tracing::debug!("Archived {} files into {}", files, archive.display());
    Ok(files)
}

/// Unpack a `.tar.gz` archive into `dest`.
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)
        .with_context(|| format!("failed to open archive: {}", archive.display()))?;
    let mut tar = Archive::new(GzDecoder::new(BufReader::new(file)));

    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create destination directory: {}", dest.display()))?;

    for entry in tar.entries().context("failed to read archive entries")? {
        let mut entry = entry.context("failed to read archive entry")?;
        let path = entry.path().context("failed to get entry path")?.into_owned();

        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            bail!("archive entry escapes destination directory: {}", path.display());
        }

        entry
            .unpack_in(dest)
            .with_context(|| format!("failed to extract {}", path.display()))?;
    }

    Ok(())
}
