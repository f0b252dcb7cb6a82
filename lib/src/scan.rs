use crate::Error;
use std::path::{Path, PathBuf};

/// Extensions of the images that can be used as sources
pub const SOURCE_EXTENSIONS: [&str; 3] = ["png", "bmp", "jpg"];

/// An image found in a source directory
#[derive(Clone, Debug, PartialEq)]
pub struct SourceImage {
    pub path: PathBuf,
    /// File name, shortened to fit a selection list
    pub label: String,
}

/// Lists the images in `dir` the executable can use as examples, sorted by
/// file name. Subdirectories are not descended into.
pub fn source_images(dir: &Path) -> Result<Vec<SourceImage>, Error> {
    log::debug!("scanning directory: {}", dir.display());

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let path = entry.path();
        if !is_source_image(&path) {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        images.push(SourceImage {
            label: short_label(&name),
            path,
        });
    }

    images.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(images)
}

pub fn is_source_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
}

/// Names longer than 20 characters keep their first 10 and last 5
fn short_label(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= 20 {
        return name.to_owned();
    }

    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{}..{}", head, tail)
}
