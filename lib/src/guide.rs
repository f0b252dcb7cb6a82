use crate::Error;
use image::GenericImageView;
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Which of the two guide slots an image occupies
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GuideRole {
    /// The guide describing the example(s), `--guides`
    From,
    /// The guide describing the output; also used as the style transfer
    /// target and as the inpaint mask
    To,
}

impl fmt::Display for GuideRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::From => "'from'",
            Self::To => "'to'",
        })
    }
}

/// A guide image, either already on disk, or held in memory and written out
/// next to the output right before launch
#[derive(Clone)]
pub enum Guide {
    Path(PathBuf),
    Image(image::DynamicImage),
}

impl Guide {
    /// The path the executable will read, `None` if the guide hasn't been
    /// flushed yet
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Image(_) => None,
        }
    }

    /// Makes sure the guide has pixel data and exists on disk.
    ///
    /// In-memory guides are saved as png to `sidecar`, guides that are
    /// already files are checked in place.
    pub fn flush(self, role: GuideRole, sidecar: &Path) -> Result<Self, Error> {
        match self {
            Self::Image(img) => {
                if img.width() == 0 || img.height() == 0 {
                    return Err(Error::EmptyGuide(role));
                }

                img.save_with_format(sidecar, image::ImageFormat::Png)?;
                log::debug!("saved {} guide to {}", role, sidecar.display());
                Ok(Self::Path(sidecar.to_owned()))
            }
            Self::Path(path) => {
                if !path.is_file() {
                    return Err(Error::EmptyGuide(role));
                }

                let (width, height) = image::image_dimensions(&path)?;
                if width == 0 || height == 0 {
                    return Err(Error::EmptyGuide(role));
                }

                Ok(Self::Path(path))
            }
        }
    }
}

impl From<PathBuf> for Guide {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for Guide {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_owned())
    }
}

impl From<image::DynamicImage> for Guide {
    fn from(img: image::DynamicImage) -> Self {
        Self::Image(img)
    }
}

/// Path of a guide written next to `output`, eg `out/gen.png` + `_to` becomes
/// `out/gen_to.png`
pub(crate) fn sidecar_path(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{}{}.png", stem, suffix))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sidecar_names() {
        assert_eq!(
            sidecar_path(Path::new("/tmp/out/generated.jpg"), "_from"),
            PathBuf::from("/tmp/out/generated_from.png")
        );
    }

    #[test]
    fn empty_in_memory_guide_is_rejected() {
        let empty = Guide::Image(image::DynamicImage::new_rgba8(0, 0));
        let err = empty
            .flush(GuideRole::To, Path::new("unused.png"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::EmptyGuide(GuideRole::To)));
    }

    #[test]
    fn missing_file_guide_is_rejected() {
        let missing = Guide::Path(PathBuf::from("no/such/guide.png"));
        let err = missing
            .flush(GuideRole::From, Path::new("unused.png"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::EmptyGuide(GuideRole::From)));
    }
}
