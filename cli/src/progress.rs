use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tsynth_launcher::JobStatus;

/// Spinner shown while a job's output is polled
pub struct JobProgress {
    pb: ProgressBar,
}

impl JobProgress {
    pub fn new(output: &Path, hidden: bool) -> Self {
        let pb = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };

        let sty = ProgressStyle::default_spinner()
            .template("[{elapsed_precise}] {spinner:.cyan/blue} {msg}")
            .tick_chars("/|\\- ");
        pb.set_style(sty);
        pb.set_message(&format!("waiting for {}", output.display()));

        Self { pb }
    }

    pub fn update(&self, status: &JobStatus) {
        match status {
            JobStatus::Running(_) => self.pb.tick(),
            JobStatus::Finished(path) => {
                self.pb.set_message(&format!("loading {}", path.display()));
            }
            JobStatus::Exited(_) | JobStatus::TimedOut => {}
        }
    }
}

impl Drop for JobProgress {
    fn drop(&mut self) {
        self.pb.finish_and_clear();
    }
}
