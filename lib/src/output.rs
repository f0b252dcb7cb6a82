use crate::Error;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Name of the directory created under the system temp directory
pub const TEMP_SUBDIR: &str = "tsynth_params";

/// Prefix of the scratch file created while probing a directory
const PROBE_PREFIX: &str = ".tsynth-probe";

/// Where generated images are written
#[derive(Clone, Debug, PartialEq)]
pub enum OutputTarget {
    /// Write into a directory picked by the user
    Directory(PathBuf),
    /// Write next to the selected input, named after it
    OverrideInput,
    /// Write into a scratch directory under the system temp directory
    Temp,
}

/// The output path a job writes to, plus a warning to show the user when
/// the requested location couldn't be used
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedOutput {
    pub path: PathBuf,
    pub warning: Option<String>,
}

/// A directory that passed the write probe, or the temp directory that
/// replaced it
#[derive(Clone, Debug, PartialEq)]
pub struct WritableDir {
    pub dir: PathBuf,
    pub warning: Option<String>,
}

/// Resolves the file a job writes.
///
/// `file_name` is used for `Directory` and `Temp`, and for `OverrideInput`
/// when `input` is `None` (eg. multi example generation, which has no single
/// input to name the output after).
pub fn resolve_output(
    target: &OutputTarget,
    file_name: &str,
    input: Option<&Path>,
) -> Result<ResolvedOutput, Error> {
    match target {
        OutputTarget::Directory(dir) => {
            let writable = ensure_writable(dir)?;
            Ok(ResolvedOutput {
                path: writable.dir.join(file_name),
                warning: writable.warning,
            })
        }
        OutputTarget::OverrideInput => match input {
            Some(input) => {
                let dir = input
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                let writable = ensure_writable(dir)?;
                Ok(ResolvedOutput {
                    path: writable.dir.join(png_name(input)),
                    warning: writable.warning,
                })
            }
            None => Ok(ResolvedOutput {
                path: temp_dir()?.join(file_name),
                warning: None,
            }),
        },
        OutputTarget::Temp => Ok(ResolvedOutput {
            path: temp_dir()?.join(file_name),
            warning: None,
        }),
    }
}

/// Probes `dir` by creating and removing a file in it. When that fails, the
/// temp directory is returned instead, along with a warning.
///
/// This is best-effort, permissions can change between the probe and the
/// executable writing its output.
pub fn ensure_writable(dir: &Path) -> Result<WritableDir, Error> {
    if !dir.is_dir() {
        let temp = temp_dir()?;
        let warning = format!(
            "Directory {} does not exist, writing to {} instead",
            dir.display(),
            temp.display()
        );
        log::warn!("{}", warning);

        return Ok(WritableDir {
            dir: temp,
            warning: Some(warning),
        });
    }

    match probe(dir) {
        Ok(()) => Ok(WritableDir {
            dir: absolute(dir),
            warning: None,
        }),
        Err(err) => {
            log::warn!("write probe in {} failed: {}", dir.display(), err);

            Ok(WritableDir {
                dir: temp_dir()?,
                warning: Some(format!(
                    "No permission to write to: {}. Select different folder",
                    dir.display()
                )),
            })
        }
    }
}

/// Only ever removes a file it created itself, existing files are left alone
fn probe(dir: &Path) -> io::Result<()> {
    let pid = std::process::id();
    for attempt in 0..16u32 {
        let probe = dir.join(format!("{}-{}-{}", PROBE_PREFIX, pid, attempt));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&probe)
        {
            Ok(file) => {
                drop(file);
                return fs::remove_file(&probe);
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "no free name for the write probe",
    ))
}

/// The scratch directory, created on demand
pub fn temp_dir() -> Result<PathBuf, Error> {
    let dir = std::env::temp_dir().join(TEMP_SUBDIR);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// The file name of `input` with its extension swapped for `png`
pub fn png_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}.png", stem)
}

fn absolute(dir: &Path) -> PathBuf {
    fs::canonicalize(dir).unwrap_or_else(|_e| dir.to_owned())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn png_names() {
        assert_eq!(png_name(Path::new("imgs/bricks.JPG")), "bricks.png");
        assert_eq!(png_name(Path::new("rock.bmp")), "rock.png");
    }

    #[test]
    fn temp_target_uses_scratch_dir() {
        let out = resolve_output(&OutputTarget::Temp, "Generated.png", None).unwrap();
        assert_eq!(out.path, std::env::temp_dir().join(TEMP_SUBDIR).join("Generated.png"));
        assert!(out.warning.is_none());
        assert!(out.path.parent().unwrap().is_dir());
    }

    #[test]
    fn missing_dir_falls_back_to_temp() {
        let target = OutputTarget::Directory(PathBuf::from("/definitely/not/a/real/dir"));
        let out = resolve_output(&target, "Generated.png", None).unwrap();
        assert!(out.path.starts_with(std::env::temp_dir()));
        assert!(out.warning.is_some());
    }
}
