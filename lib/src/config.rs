use crate::{poll::PollConfig, Error, Launcher};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Settings that persist between runs
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Path to the texture-synthesis executable
    pub executable: Option<PathBuf>,
    pub poll: PollConfig,
    /// Show the executable's own output instead of discarding it
    pub inherit_output: bool,
}

impl Preferences {
    /// `<config dir>/tsynth-launcher/preferences.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tsynth-launcher").join("preferences.json"))
    }

    /// Reads preferences from `path`, a missing file gives the defaults
    pub fn load(path: &Path) -> Result<Self, Error> {
        match fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no preferences at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// A launcher for the configured executable
    pub fn launcher(&self) -> Result<Launcher, Error> {
        let executable = self.executable.as_ref().ok_or(Error::NoExecutable)?;

        Ok(Launcher::new(executable.clone())
            .poll_config(self.poll)
            .inherit_output(self.inherit_output))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    #[test]
    fn durations_are_human_readable() {
        let prefs: Preferences = serde_json::from_str(
            r#"{ "executable": "/opt/texture-synthesis", "poll": { "interval": "1s", "timeout": "20s" } }"#,
        )
        .unwrap();

        assert_eq!(prefs.poll.interval, Duration::from_secs(1));
        assert_eq!(prefs.poll.timeout, Duration::from_secs(20));
        // Unspecified fields keep their defaults
        assert_eq!(prefs.poll.settle, PollConfig::default().settle);
        assert!(!prefs.inherit_output);
    }

    #[test]
    fn missing_executable_is_reported() {
        assert!(matches!(
            Preferences::default().launcher().err().unwrap(),
            Error::NoExecutable
        ));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let prefs = Preferences::load(Path::new("/definitely/not/preferences.json")).unwrap();
        assert_eq!(prefs, Preferences::default());
    }
}
