use crate::{
    errors::{InputCount, InvalidRange},
    guide::{Guide, GuideRole},
    Dims, Error,
};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

/// The kind of synthesis the executable is asked to perform
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Generate similar-looking images from a single example
    Generate,
    /// "Remix" several examples into a new image
    MultiGenerate,
    /// Guide the generation with a "from" -> "to" transformation
    GuidedSynthesis,
    /// Use the example as a style, and a guide as content
    TransferStyle,
    /// Fill in the regions of the example marked by a mask
    Inpaint,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Generate,
        Mode::MultiGenerate,
        Mode::GuidedSynthesis,
        Mode::TransferStyle,
        Mode::Inpaint,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::MultiGenerate => "multi-generate",
            Self::GuidedSynthesis => "guided-synthesis",
            Self::TransferStyle => "transfer-style",
            Self::Inpaint => "inpaint",
        }
    }

    /// The (min, max) number of source images the mode takes
    pub(crate) fn input_bounds(self) -> (usize, Option<usize>) {
        match self {
            Self::MultiGenerate => (1, None),
            _ => (1, Some(1)),
        }
    }

    /// The guides the mode can't run without
    pub fn required_guides(self) -> &'static [GuideRole] {
        match self {
            Self::Generate | Self::MultiGenerate => &[],
            Self::GuidedSynthesis => &[GuideRole::From, GuideRole::To],
            Self::TransferStyle | Self::Inpaint => &[GuideRole::To],
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == input)
            .ok_or_else(|| Error::UnknownMode(input.to_owned()))
    }
}

/// Tuning parameters forwarded to the executable
#[derive(Clone, Debug, PartialEq)]
pub struct Tweaks {
    pub seed: u64,
    pub rand_init: u64,
    pub k_neighbors: u32,
    pub cauchy: f32,
    pub backtrack_percent: f32,
    pub backtrack_stages: u32,
    pub tiling: bool,
    pub alpha: f32,
    pub output_size: Dims,
    pub input_size: Option<Dims>,
}

impl Default for Tweaks {
    fn default() -> Self {
        Self {
            seed: 1,
            rand_init: 1,
            k_neighbors: 50,
            cauchy: 1.0,
            backtrack_percent: 0.5,
            backtrack_stages: 5,
            tiling: false,
            alpha: 0.8,
            output_size: Dims::square(400),
            input_size: None,
        }
    }
}

impl Tweaks {
    fn check_validity(&self) -> Result<(), Error> {
        let ranges = [
            ("cauchy", self.cauchy, 0.0, 1.0),
            ("backtrack-pct", self.backtrack_percent, 0.0, 1.0),
            ("alpha", self.alpha, 0.0, 1.0),
            ("backtrack-stages", self.backtrack_stages as f32, 0.0, 10.0),
        ];

        for &(name, value, min, max) in &ranges {
            if !(min..=max).contains(&value) {
                return Err(Error::InvalidRange(InvalidRange {
                    min,
                    max,
                    value,
                    name,
                }));
            }
        }

        if self.rand_init == 0 {
            return Err(Error::InvalidRange(InvalidRange {
                min: 1.0,
                max: u64::MAX as f32,
                value: 0.0,
                name: "rand-init",
            }));
        }

        let sizes = std::iter::once(self.output_size).chain(self.input_size);
        for size in sizes {
            if size.width == 0 || size.height == 0 {
                return Err(Error::InvalidSize(size.to_string()));
            }
        }

        Ok(())
    }
}

/// One invocation of the synthesis executable.
///
/// # Example
/// ```no_run
/// let request = tsynth_launcher::JobRequest::builder(tsynth_launcher::Mode::Generate)
///     .input("imgs/1.jpg")
///     .output("out/01.png")
///     .seed(211)
///     .build()
///     .expect("invalid request");
/// ```
#[derive(Clone)]
pub struct JobRequest {
    pub(crate) mode: Mode,
    pub(crate) inputs: Vec<PathBuf>,
    pub(crate) guide_from: Option<Guide>,
    pub(crate) guide_to: Option<Guide>,
    pub(crate) output: PathBuf,
    pub(crate) tweaks: Tweaks,
}

impl JobRequest {
    pub fn builder(mode: Mode) -> JobRequestBuilder {
        JobRequestBuilder::new(mode)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn tweaks(&self) -> &Tweaks {
        &self.tweaks
    }

    pub fn guide(&self, role: GuideRole) -> Option<&Guide> {
        match role {
            GuideRole::From => self.guide_from.as_ref(),
            GuideRole::To => self.guide_to.as_ref(),
        }
    }

    pub(crate) fn guide_mut(&mut self, role: GuideRole) -> &mut Option<Guide> {
        match role {
            GuideRole::From => &mut self.guide_from,
            GuideRole::To => &mut self.guide_to,
        }
    }

    /// Checks the request has what its mode requires, without touching the
    /// filesystem
    pub(crate) fn check_shape(&self) -> Result<(), Error> {
        check_output_format(&self.output)?;

        let (min, max) = self.mode.input_bounds();
        let provided = self.inputs.len();
        if provided < min || max.map_or(false, |max| provided > max) {
            return Err(Error::InputCount(InputCount {
                mode: self.mode,
                min,
                max,
                provided,
            }));
        }

        for &role in self.mode.required_guides() {
            if self.guide(role).is_none() {
                return Err(Error::MissingGuide(self.mode, role));
            }
        }

        Ok(())
    }
}

/// Extensions the executable can encode
pub const OUTPUT_EXTENSIONS: [&str; 3] = ["png", "jpg", "bmp"];

pub(crate) fn check_output_format(path: &Path) -> Result<(), Error> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if OUTPUT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) => Ok(()),
        Some(other) => Err(Error::UnsupportedOutputFormat(other.to_owned())),
        None => Err(Error::UnsupportedOutputFormat(String::new())),
    }
}

/// Builds a `JobRequest`, calling `build` checks the parameter ranges and
/// that the mode has the inputs and guides it needs
pub struct JobRequestBuilder {
    mode: Mode,
    inputs: Vec<PathBuf>,
    guide_from: Option<Guide>,
    guide_to: Option<Guide>,
    output: PathBuf,
    tweaks: Tweaks,
}

impl JobRequestBuilder {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            inputs: Vec::new(),
            guide_from: None,
            guide_to: None,
            output: PathBuf::new(),
            tweaks: Tweaks::default(),
        }
    }

    /// Adds a source image
    pub fn input<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.inputs.push(path.into());
        self
    }

    /// Adds several source images, in order
    pub fn inputs<P: Into<PathBuf>, I: IntoIterator<Item = P>>(mut self, paths: I) -> Self {
        self.inputs.extend(paths.into_iter().map(Into::into));
        self
    }

    /// The guide describing the example, only used by guided synthesis
    pub fn guide_from<G: Into<Guide>>(mut self, guide: G) -> Self {
        self.guide_from = Some(guide.into());
        self
    }

    /// The guide describing the output, the style transfer target, or the
    /// inpaint mask, depending on the mode
    pub fn guide_to<G: Into<Guide>>(mut self, guide: G) -> Self {
        self.guide_to = Some(guide.into());
        self
    }

    /// The file the executable writes, its extension picks the format
    pub fn output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = path.into();
        self
    }

    pub fn tweaks(mut self, tweaks: Tweaks) -> Self {
        self.tweaks = tweaks;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.tweaks.seed = seed;
        self
    }

    pub fn random_init(mut self, count: u64) -> Self {
        self.tweaks.rand_init = count;
        self
    }

    pub fn nearest_neighbors(mut self, count: u32) -> Self {
        self.tweaks.k_neighbors = count;
        self
    }

    /// Range (0.0 - 1.0)
    pub fn cauchy_dispersion(mut self, cauchy: f32) -> Self {
        self.tweaks.cauchy = cauchy;
        self
    }

    /// Range (0.0 - 1.0)
    pub fn backtrack_percent(mut self, percent: f32) -> Self {
        self.tweaks.backtrack_percent = percent;
        self
    }

    pub fn backtrack_stages(mut self, stages: u32) -> Self {
        self.tweaks.backtrack_stages = stages;
        self
    }

    pub fn tiling_mode(mut self, tiling: bool) -> Self {
        self.tweaks.tiling = tiling;
        self
    }

    /// Range (0.0 - 1.0)
    pub fn guide_alpha(mut self, alpha: f32) -> Self {
        self.tweaks.alpha = alpha;
        self
    }

    pub fn output_size(mut self, size: Dims) -> Self {
        self.tweaks.output_size = size;
        self
    }

    pub fn resize_input(mut self, size: Dims) -> Self {
        self.tweaks.input_size = Some(size);
        self
    }

    pub fn build(self) -> Result<JobRequest, Error> {
        self.tweaks.check_validity()?;

        let request = JobRequest {
            mode: self.mode,
            inputs: self.inputs,
            guide_from: self.guide_from,
            guide_to: self.guide_to,
            output: self.output,
            tweaks: self.tweaks,
        };

        request.check_shape()?;
        Ok(request)
    }
}
