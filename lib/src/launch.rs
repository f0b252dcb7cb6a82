use crate::{
    command,
    guide::sidecar_path,
    output,
    poll::{FsProbe, OutputProbe, OutputWatch, PollConfig, Tick},
    registry::{ImageRegistry, Loaded},
    Error, GuideRole, JobRequest, Mode,
};
use std::{
    fmt,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    time::{Duration, Instant},
};

/// File stem the synthesis executable is expected to have
pub const EXECUTABLE_NAME: &str = "texture-synthesis";

/// Result of looking for the executable at a user supplied path
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutableStatus {
    pub path: PathBuf,
    pub found: bool,
}

impl fmt::Display for ExecutableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} in: {}",
            EXECUTABLE_NAME,
            if self.found { "found" } else { "not found" },
            self.path.display()
        )
    }
}

/// Starts the synthesis executable for `JobRequest`s
#[derive(Clone, Debug)]
pub struct Launcher {
    executable: PathBuf,
    poll: PollConfig,
    inherit_output: bool,
}

impl Launcher {
    pub fn new<P: Into<PathBuf>>(executable: P) -> Self {
        Self {
            executable: executable.into(),
            poll: PollConfig::default(),
            inherit_output: false,
        }
    }

    /// Timings used by the handles this launcher creates
    pub fn poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Lets the executable write to our stdout/stderr, by default both are
    /// discarded
    pub fn inherit_output(mut self, inherit: bool) -> Self {
        self.inherit_output = inherit;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Resolves `path` to an absolute path and checks it points at the
    /// synthesis executable
    pub fn locate(path: &Path) -> ExecutableStatus {
        let path = std::fs::canonicalize(path).unwrap_or_else(|_e| {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_e| path.to_owned())
        });

        let found = path.is_file()
            && path.file_stem().and_then(|s| s.to_str()) == Some(EXECUTABLE_NAME);

        ExecutableStatus { path, found }
    }

    /// Starts the executable for `request` without waiting for it.
    ///
    /// The output directory has to exist. If it can't be written to, the job
    /// writes to the temp directory instead and the handle carries a warning.
    /// In-memory guides are written next to the output first. The returned
    /// handle has to be polled to find out when the output is ready.
    pub fn launch(&self, mut request: JobRequest) -> Result<JobHandle, Error> {
        request.check_shape()?;

        let output = request.output().to_owned();
        let dir = match output.parent() {
            Some(dir) if dir.as_os_str().is_empty() => Path::new("."),
            Some(dir) if dir.is_dir() => dir,
            Some(dir) => return Err(Error::OutputDirMissing(dir.to_owned())),
            None => return Err(Error::OutputDirMissing(output.clone())),
        };

        // Unwritable directories are swapped for the temp directory, keeping
        // the file name
        let writable = output::ensure_writable(dir)?;
        let output = match writable.warning {
            Some(_) => match output.file_name() {
                Some(name) => writable.dir.join(name),
                None => return Err(Error::OutputDirMissing(output.clone())),
            },
            None => output,
        };
        request.output = output.clone();

        let mode = request.mode();
        for &role in mode.required_guides() {
            let slot = request.guide_mut(role);
            if let Some(guide) = slot.take() {
                let sidecar = sidecar_path(&output, sidecar_suffix(mode, role));
                *slot = Some(guide.flush(role, &sidecar)?);
            }
        }

        let args = command::args(&request)?;
        log::debug!("{} {:?}", self.executable.display(), args);

        // The baseline has to be taken before the process can touch the output
        let watch = OutputWatch::arm(output, self.poll, &FsProbe, Instant::now());

        let mut cmd = Command::new(&self.executable);
        cmd.args(&args).stdin(Stdio::null());
        if !self.inherit_output {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let child = cmd.spawn().map_err(|source| Error::Launch {
            executable: self.executable.clone(),
            source,
        })?;

        log::info!(
            "started {} ({}) -> {}",
            mode,
            child.id(),
            watch.path().display()
        );

        Ok(JobHandle {
            child,
            watch,
            warning: writable.warning,
        })
    }

    /// Runs single example generation over every image in `sources`, each
    /// one writing `<stem>.png` into `output_dir`.
    ///
    /// Every job is started before any is polled.
    pub fn launch_batch(
        &self,
        request: &JobRequest,
        sources: &[PathBuf],
        output_dir: &Path,
    ) -> Result<Vec<JobHandle>, Error> {
        if request.mode() != Mode::Generate {
            return Err(Error::BatchMode(request.mode()));
        }

        sources
            .iter()
            .map(|source| {
                let mut job = request.clone();
                job.inputs = vec![source.clone()];
                job.output = output_dir.join(output::png_name(source));
                self.launch(job)
            })
            .collect()
    }
}

fn sidecar_suffix(mode: Mode, role: GuideRole) -> &'static str {
    match (mode, role) {
        (Mode::Inpaint, _) => "_inpaint",
        (Mode::TransferStyle, _) => "_guide",
        (_, GuideRole::From) => "_from",
        (_, GuideRole::To) => "_to",
    }
}

/// Where a running job is at
#[derive(Debug, PartialEq)]
pub enum JobStatus {
    /// Still going, poll again after the duration
    Running(Duration),
    /// The output has been written
    Finished(PathBuf),
    /// The process exited without producing a new output
    Exited(ExitStatus),
    /// Nothing showed up in time
    TimedOut,
}

/// How `JobHandle::wait` ended
#[derive(Debug, PartialEq)]
pub enum JobOutcome {
    Loaded { path: PathBuf, loaded: Loaded },
    Exited(ExitStatus),
    TimedOut,
}

/// A started job, owning its own poll state
pub struct JobHandle {
    child: Child,
    watch: OutputWatch,
    warning: Option<String>,
}

impl JobHandle {
    /// OS process id of the executable
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn output(&self) -> &Path {
        self.watch.path()
    }

    pub fn watch(&self) -> &OutputWatch {
        &self.watch
    }

    /// Set when the requested output directory wasn't writable and the job
    /// writes to the temp directory instead
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    /// Checks on the job once.
    ///
    /// The process exit status is used when it's available; the output file
    /// is polled otherwise.
    pub fn poll(&mut self, now: Instant) -> JobStatus {
        self.poll_with(now, &FsProbe)
    }

    fn poll_with(&mut self, now: Instant, probe: &dyn OutputProbe) -> JobStatus {
        let rearm = match self.watch.tick(now, probe) {
            Tick::Ready(path) => return JobStatus::Finished(path),
            Tick::TimedOut => return JobStatus::TimedOut,
            Tick::Rearm(rearm) => rearm,
        };

        match self.child.try_wait() {
            Ok(Some(status)) => {
                // The output may have been written since the tick above. A
                // clean exit that left an older output untouched didn't
                // produce anything.
                if status.success() && self.watch.is_fresh(probe) {
                    self.watch.mark_ready();
                    JobStatus::Finished(self.watch.path().to_owned())
                } else {
                    JobStatus::Exited(status)
                }
            }
            Ok(None) => JobStatus::Running(rearm),
            Err(err) => {
                log::debug!("unable to query process {}: {}", self.child.id(), err);
                JobStatus::Running(rearm)
            }
        }
    }

    /// Polls on the calling thread until the job ends, then loads the output
    /// into `registry`
    pub fn wait<R: ImageRegistry + ?Sized>(self, registry: &mut R) -> Result<JobOutcome, Error> {
        self.wait_with(registry, |_status| {})
    }

    /// Same as `wait`, calling `on_poll` with every status observed
    pub fn wait_with<R, F>(mut self, registry: &mut R, mut on_poll: F) -> Result<JobOutcome, Error>
    where
        R: ImageRegistry + ?Sized,
        F: FnMut(&JobStatus),
    {
        loop {
            let status = self.poll(Instant::now());
            on_poll(&status);

            match status {
                JobStatus::Running(rearm) => std::thread::sleep(rearm),
                JobStatus::Finished(path) => {
                    std::thread::sleep(self.watch.config().settle);
                    let loaded = registry.load_or_refresh(&path)?;
                    return Ok(JobOutcome::Loaded { path, loaded });
                }
                JobStatus::Exited(status) => {
                    log::warn!(
                        "{} exited ({}) without writing {}",
                        EXECUTABLE_NAME,
                        status,
                        self.watch.path().display()
                    );
                    return Ok(JobOutcome::Exited(status));
                }
                JobStatus::TimedOut => return Ok(JobOutcome::TimedOut),
            }
        }
    }
}
