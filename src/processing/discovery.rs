//! Turns user-selected files and folders into (source, output) pairs.
//!
//! Every function returns a lazy iterator; nothing touches the filesystem
//! until it is pulled. Only files that can be opened as images are yielded.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::utils::{absolutize, probe_image, with_output_extension};

/// Folder created next to individually selected files
pub const FILES_OUTPUT_DIR: &str = "rembg";

/// Suffix appended to a selected folder's name for its output folder
pub const FOLDER_OUTPUT_SUFFIX: &str = "_rembg";

/// An accepted image and the path its result is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// A discovery run that can be moved onto a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryRequest {
    /// Individually picked files
    Files(Vec<PathBuf>),
    /// One folder, walked recursively
    Folder(PathBuf),
    /// Dropped paths: files and folders in any combination
    Mixed(Vec<PathBuf>),
}

impl DiscoveryRequest {
    pub fn into_discoveries(self) -> Box<dyn Iterator<Item = Discovered> + Send> {
        match self {
            Self::Files(paths) => Box::new(open_files(paths)),
            Self::Folder(path) => Box::new(open_folder(path)),
            Self::Mixed(paths) => Box::new(open_mixed(paths)),
        }
    }
}

/// Discovers individually selected files.
///
/// `/x/y/photo.jpg` is written to `/x/y/rembg/photo.png`.
pub fn open_files<I, P>(paths: I) -> impl Iterator<Item = Discovered> + Send
where
    I: IntoIterator<Item = P>,
    I::IntoIter: Send,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .map(absolutize)
        .filter(|path| is_image_file(path))
        .filter_map(|source| {
            let output = file_output_path(&source)?;
            Some(Discovered { source, output })
        })
}

/// Discovers every image below `folder`, recursively.
///
/// `root/a/b.jpg` is written to `root_rembg/a/b.png`.
pub fn open_folder(folder: impl AsRef<Path>) -> impl Iterator<Item = Discovered> + Send {
    let folder = absolutize(folder);
    let output_root = if folder.is_dir() {
        let root = folder_output_root(&folder);
        if root.is_none() {
            debug!("Skipping {}: folder has no name to derive an output folder from", folder.display());
        }
        root
    } else {
        debug!("Skipping {}: not a folder", folder.display());
        None
    };

    output_root.into_iter().flat_map(move |output_root| {
        let root = folder.clone();
        WalkDir::new(&folder)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            // Symlinked files count when their target is a file; links are
            // not followed into directories.
            .filter(|entry| {
                entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
            })
            .map(|entry| entry.into_path())
            .filter(|path| probe_image(path))
            .filter_map(move |source| {
                let relative = source.strip_prefix(&root).ok()?;
                let output = output_root.join(with_output_extension(relative));
                Some(Discovered { source, output })
            })
    })
}

/// Discovers dropped paths, applying the file or folder rule to each one.
pub fn open_mixed<I, P>(paths: I) -> impl Iterator<Item = Discovered> + Send
where
    I: IntoIterator<Item = P>,
    I::IntoIter: Send,
    P: AsRef<Path>,
{
    paths.into_iter().map(absolutize).flat_map(|path| {
        let discovered: Box<dyn Iterator<Item = Discovered> + Send> = if path.is_file() {
            Box::new(open_files([path]))
        } else if path.is_dir() {
            Box::new(open_folder(path))
        } else {
            debug!("Skipping {}: neither a file nor a folder", path.display());
            Box::new(std::iter::empty())
        };
        discovered
    })
}

fn is_image_file(path: &Path) -> bool {
    path.is_file() && probe_image(path)
}

/// Output path under the file-rule layout, `None` for paths without a file name.
pub fn file_output_path(source: &Path) -> Option<PathBuf> {
    let name = source.file_name()?;
    let parent = source.parent()?;
    Some(
        parent
            .join(FILES_OUTPUT_DIR)
            .join(with_output_extension(Path::new(name))),
    )
}

/// Output folder under the folder-rule layout, `None` for a root folder.
pub fn folder_output_root(folder: &Path) -> Option<PathBuf> {
    let name = folder.file_name()?;
    let mut output_name = OsString::from(name);
    output_name.push(FOLDER_OUTPUT_SUFFIX);
    Some(folder.with_file_name(output_name))
}
