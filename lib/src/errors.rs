use crate::{guide::GuideRole, Mode};
use std::{fmt, path::PathBuf};

#[derive(Debug)]
pub struct InvalidRange {
    pub(crate) min: f32,
    pub(crate) max: f32,
    pub(crate) value: f32,
    pub(crate) name: &'static str,
}

impl fmt::Display for InvalidRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parameter '{}' - value '{}' is outside the range of {}-{}",
            self.name, self.value, self.min, self.max
        )
    }
}

#[derive(Debug)]
pub struct InputCount {
    pub(crate) mode: Mode,
    pub(crate) min: usize,
    pub(crate) max: Option<usize>,
    pub(crate) provided: usize,
}

impl fmt::Display for InputCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(
                f,
                "'{}' takes exactly {} input image(s), but {} were provided",
                self.mode, self.min, self.provided
            ),
            _ => write!(
                f,
                "'{}' takes at least {} input image(s), but {} were provided",
                self.mode, self.min, self.provided
            ),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    /// An error in the image library occurred, eg failed to load/save a guide
    Image(image::ImageError),
    /// Io is notoriously error free with no problems, but we cover it just in case!
    Io(std::io::Error),
    /// The preferences file could not be read or written
    Config(serde_json::Error),
    /// A tuning parameter had an invalid range specified
    InvalidRange(InvalidRange),
    /// The mode was given the wrong number of source images
    InputCount(InputCount),
    /// The mode requires a guide image that wasn't provided
    MissingGuide(Mode, GuideRole),
    /// A guide image was provided, but it has no pixel data
    EmptyGuide(GuideRole),
    /// A guide image only exists in memory, it has to be written to disk
    /// before a command can reference it
    GuideNotFlushed(GuideRole),
    /// The user specified an image format the executable can't write
    UnsupportedOutputFormat(String),
    /// The output path has no parent directory, or it doesn't exist
    OutputDirMissing(PathBuf),
    /// The executable couldn't be started
    Launch {
        executable: PathBuf,
        source: std::io::Error,
    },
    /// No executable was configured
    NoExecutable,
    /// Only single example generation can be run over a whole directory
    BatchMode(Mode),
    /// An unknown mode name was given
    UnknownMode(String),
    /// A size wasn't of the form `WxH` or a single number
    InvalidSize(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Launch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image(ie) => write!(f, "{}", ie),
            Self::Io(io) => write!(f, "{}", io),
            Self::Config(ce) => write!(f, "invalid preferences: {}", ce),
            Self::InvalidRange(ir) => write!(f, "{}", ir),
            Self::InputCount(ic) => write!(f, "{}", ic),
            Self::MissingGuide(mode, role) => {
                write!(f, "'{}' requires a {} guide image", mode, role)
            }
            Self::EmptyGuide(role) => write!(f, "the {} guide image is empty", role),
            Self::GuideNotFlushed(role) => write!(
                f,
                "the {} guide image has not been saved to disk yet",
                role
            ),
            Self::UnsupportedOutputFormat(fmt) => {
                write!(f, "the output format '{}' is not supported", fmt)
            }
            Self::OutputDirMissing(dir) => {
                write!(f, "the output directory '{}' does not exist", dir.display())
            }
            Self::Launch { executable, source } => {
                if source.kind() == std::io::ErrorKind::NotFound {
                    write!(f, "'{}' was not found", executable.display())
                } else {
                    write!(f, "failed to start '{}': {}", executable.display(), source)
                }
            }
            Self::NoExecutable => write!(
                f,
                "the path to the texture-synthesis executable has not been set"
            ),
            Self::BatchMode(mode) => write!(
                f,
                "'{}' can't be run over a directory, only '{}' can",
                mode,
                Mode::Generate
            ),
            Self::UnknownMode(name) => write!(
                f,
                "mode `{}` not one of: 'generate', 'multi-generate', 'guided-synthesis', 'transfer-style', 'inpaint'",
                name
            ),
            Self::InvalidSize(input) => write!(
                f,
                "size `{}` is not of the form `width x height` or a single number",
                input
            ),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(ie: image::ImageError) -> Self {
        Self::Image(ie)
    }
}

impl From<std::io::Error> for Error {
    fn from(io: std::io::Error) -> Self {
        Self::Io(io)
    }
}

impl From<serde_json::Error> for Error {
    fn from(ce: serde_json::Error) -> Self {
        Self::Config(ce)
    }
}
