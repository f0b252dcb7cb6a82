use crate::Error;
use std::{convert::TryFrom, fmt, path::Path, str::FromStr};

/// Sizes offered as presets, in pixels
pub const PRESETS: [u32; 5] = [64, 128, 256, 512, 1024];

/// Size used when an input image can't be probed for its dimensions
pub const FALLBACK_SIZE: Dims = Dims {
    width: 400,
    height: 400,
};

/// Simple dimensions struct
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dims {
    pub width: u32,
    pub height: u32,
}

impl Dims {
    pub fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scales both dimensions by `percent`, truncating. Results too large for
    /// a `u32` saturate.
    pub fn scaled(self, percent: u32) -> Self {
        let scale = |v: u32| {
            u32::try_from(u64::from(v) * u64::from(percent) / 100).unwrap_or(u32::MAX)
        };
        Self {
            width: scale(self.width),
            height: scale(self.height),
        }
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parses `WxH`, or a single number used for both dimensions
impl FromStr for Dims {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidSize(input.to_owned());
        let mut i = input.splitn(2, 'x');

        let x: u32 = i
            .next()
            .unwrap_or("")
            .trim()
            .parse()
            .map_err(|_e| invalid())?;
        let y: u32 = match i.next() {
            Some(num) => num.trim().parse().map_err(|_e| invalid())?,
            None => x,
        };
        Ok(Self::new(x, y))
    }
}

/// How a size handed to the executable is chosen
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SizeSpec {
    /// Width and height picked from `PRESETS`
    Preset(Dims),
    /// Explicit dimensions multiplied by a percentage
    Scaled { dims: Dims, percent: u32 },
}

impl SizeSpec {
    /// Creates a preset size, failing if either side isn't one of `PRESETS`
    pub fn preset(width: u32, height: u32) -> Result<Self, Error> {
        for side in &[width, height] {
            if !PRESETS.contains(side) {
                return Err(Error::InvalidSize(side.to_string()));
            }
        }
        Ok(Self::Preset(Dims::new(width, height)))
    }

    pub fn resolve(self) -> Dims {
        match self {
            Self::Preset(dims) => dims,
            Self::Scaled { dims, percent } => dims.scaled(percent),
        }
    }
}

impl From<Dims> for SizeSpec {
    fn from(dims: Dims) -> Self {
        Self::Scaled { dims, percent: 100 }
    }
}

/// Reads the dimensions of an image from its header, falling back to
/// `FALLBACK_SIZE` when the format is unknown or the file is unreadable
pub fn input_dimensions(path: &Path) -> Dims {
    match image::image_dimensions(path) {
        Ok((width, height)) => Dims::new(width, height),
        Err(err) => {
            log::debug!(
                "unable to read dimensions of {}: {}, using {}",
                path.display(),
                err,
                FALLBACK_SIZE
            );
            FALLBACK_SIZE
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_sizes() {
        assert_eq!("400x300".parse::<Dims>().unwrap(), Dims::new(400, 300));
        assert_eq!("512".parse::<Dims>().unwrap(), Dims::square(512));
        assert!("x300".parse::<Dims>().is_err());
        assert!("400xabc".parse::<Dims>().is_err());
    }

    #[test]
    fn scales_by_percent() {
        let spec = SizeSpec::Scaled {
            dims: Dims::new(401, 200),
            percent: 50,
        };
        assert_eq!(spec.resolve(), Dims::new(200, 100));
        assert_eq!(SizeSpec::from(Dims::square(7)).resolve(), Dims::square(7));
    }

    #[test]
    fn huge_scales_saturate() {
        assert_eq!(
            Dims::new(u32::MAX, 3).scaled(1000),
            Dims::new(u32::MAX, 30)
        );
    }

    #[test]
    fn presets_are_checked() {
        assert_eq!(
            SizeSpec::preset(64, 1024).unwrap().resolve(),
            Dims::new(64, 1024)
        );
        assert!(SizeSpec::preset(100, 64).is_err());
    }

    #[test]
    fn unreadable_input_falls_back() {
        assert_eq!(
            input_dimensions(Path::new("definitely/not/here.png")),
            FALLBACK_SIZE
        );
    }
}
