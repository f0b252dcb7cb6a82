use std::{
    fs,
    path::{Path, PathBuf},
};
use tsynth_launcher::{image, Error, JobRequest, Launcher, Mode};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "tsynth-launcher-{}-{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("created scratch dir");
    dir
}

#[test]
fn missing_executable_fails_to_launch() {
    let dir = scratch("missing-exe");
    let request = JobRequest::builder(Mode::Generate)
        .input(dir.join("in.png"))
        .output(dir.join("out.png"))
        .build()
        .unwrap();

    let err = Launcher::new(dir.join("texture-synthesis"))
        .launch(request)
        .err()
        .unwrap();

    match err {
        Error::Launch { source, .. } => {
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn output_dir_must_exist() {
    let request = JobRequest::builder(Mode::Generate)
        .input("in.png")
        .output("/definitely/not/a/dir/out.png")
        .build()
        .unwrap();

    let err = Launcher::new("texture-synthesis")
        .launch(request)
        .err()
        .unwrap();
    assert!(matches!(err, Error::OutputDirMissing(_)));
}

#[test]
fn empty_guide_blocks_launch() {
    let dir = scratch("empty-guide");
    let request = JobRequest::builder(Mode::Inpaint)
        .input(dir.join("in.png"))
        .guide_to(image::DynamicImage::new_rgba8(0, 0))
        .output(dir.join("out.png"))
        .build()
        .unwrap();

    let err = Launcher::new(dir.join("texture-synthesis"))
        .launch(request)
        .err()
        .unwrap();
    assert!(matches!(err, Error::EmptyGuide(_)));
    // Nothing was written for the guide either
    assert!(!dir.join("out_inpaint.png").exists());
}

#[test]
fn batch_only_runs_generate() {
    let request = JobRequest::builder(Mode::MultiGenerate)
        .inputs(vec!["a.png", "b.png"])
        .output("out.png")
        .build()
        .unwrap();

    let err = Launcher::new("texture-synthesis")
        .launch_batch(&request, &[PathBuf::from("a.png")], Path::new("."))
        .err()
        .unwrap();
    assert!(matches!(err, Error::BatchMode(Mode::MultiGenerate)));
}

#[cfg(unix)]
#[test]
fn writable_output_dir_is_kept() {
    let dir = scratch("launch-writable");
    let request = JobRequest::builder(Mode::Generate)
        .input(dir.join("in.png"))
        .output(dir.join("out.png"))
        .build()
        .unwrap();

    let job = Launcher::new("true").launch(request).unwrap();
    assert_eq!(job.output(), dir.join("out.png"));
    assert!(job.warning().is_none());
}

#[cfg(unix)]
#[test]
fn read_only_output_dir_launches_into_temp() {
    use std::os::unix::fs::PermissionsExt;

    let dir = scratch("launch-read-only");
    let locked = dir.join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users can write regardless of the mode bits
    let privileged = fs::write(locked.join("check"), b"").is_ok();

    let request = JobRequest::builder(Mode::Generate)
        .input(dir.join("in.png"))
        .output(locked.join("out.png"))
        .build()
        .unwrap();
    let result = Launcher::new("true").launch(request);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let job = result.unwrap();
    if privileged {
        assert_eq!(job.output(), locked.join("out.png"));
        return;
    }

    assert_eq!(
        job.output(),
        tsynth_launcher::output::temp_dir().unwrap().join("out.png")
    );
    assert!(job.warning().unwrap().contains("No permission"));
}
