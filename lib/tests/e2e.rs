//! Runs the launcher against a shell script standing in for the executable.
//!
//! Everything happens in a single test so no other test in this process can
//! fork while a script is still open for writing.
#![cfg(unix)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    time::Duration,
};
use tsynth_launcher::{
    image, ImageCache, JobOutcome, JobRequest, Launcher, Loaded, Mode, PollConfig,
};

/// Copies the last positional argument to `--out`, then exits with `code`
fn fake_executable(dir: &Path, code: i32) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
out=""
last=""
while [ $# -gt 0 ]; do
    case "$1" in
        --out) out="$2"; shift ;;
        *) last="$1" ;;
    esac
    shift
done
if [ {code} -eq 0 ]; then
    cp "$last" "$out"
fi
exit {code}
"#,
        code = code
    );

    let exe_dir = dir.join(format!("exit-{}", code));
    fs::create_dir_all(&exe_dir).unwrap();

    let path = exe_dir.join("texture-synthesis");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Exits cleanly without writing anything
fn idle_executable(dir: &Path) -> PathBuf {
    let exe_dir = dir.join("idle");
    fs::create_dir_all(&exe_dir).unwrap();

    let path = exe_dir.join("texture-synthesis");
    fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn launches_polls_and_loads() {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = std::env::temp_dir().join(format!("tsynth-launcher-e2e-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("batch")).unwrap();

    let working = fake_executable(&dir, 0);
    let failing = fake_executable(&dir, 3);
    let idle = idle_executable(&dir);

    let input = dir.join("bricks.png");
    image::RgbaImage::from_pixel(12, 12, image::Rgba([90, 40, 20, 255]))
        .save(&input)
        .unwrap();

    let poll = PollConfig {
        interval: Duration::from_millis(20),
        timeout: Duration::from_secs(10),
        settle: Duration::from_millis(100),
    };
    let launcher = Launcher::new(&working).poll_config(poll);
    assert!(Launcher::locate(&working).found);

    let request = JobRequest::builder(Mode::Generate)
        .input(&input)
        .output(dir.join("Generated.png"))
        .build()
        .unwrap();

    let mut cache = ImageCache::new();

    let first = launcher.launch(request.clone()).unwrap();
    assert_eq!(
        first.wait(&mut cache).unwrap(),
        JobOutcome::Loaded {
            path: dir.join("Generated.png"),
            loaded: Loaded::New,
        }
    );

    // Running the same job again reloads the existing entry
    let second = launcher.launch(request.clone()).unwrap();
    match second.wait(&mut cache).unwrap() {
        JobOutcome::Loaded { loaded, .. } => assert_eq!(loaded, Loaded::Refreshed),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(cache.len(), 1);

    // Batches write `<stem>.png` per source
    let handles = launcher
        .launch_batch(&request, &[input.clone()], &dir.join("batch"))
        .unwrap();
    for handle in handles {
        assert!(matches!(
            handle.wait(&mut cache).unwrap(),
            JobOutcome::Loaded { .. }
        ));
    }
    assert!(dir.join("batch").join("bricks.png").is_file());

    // A failing process ends the job without waiting for the timeout
    let failed = Launcher::new(&failing)
        .poll_config(poll)
        .launch(
            JobRequest::builder(Mode::Generate)
                .input(&input)
                .output(dir.join("Failed.png"))
                .build()
                .unwrap(),
        )
        .unwrap();
    match failed.wait(&mut cache).unwrap() {
        JobOutcome::Exited(status) => assert_eq!(status.code(), Some(3)),
        other => panic!("unexpected outcome: {:?}", other),
    }

    // A clean exit that leaves the previous output untouched isn't a result
    let before = fs::metadata(dir.join("Generated.png")).unwrap().modified().unwrap();
    let untouched = Launcher::new(&idle)
        .poll_config(poll)
        .launch(request)
        .unwrap();
    match untouched.wait(&mut cache).unwrap() {
        JobOutcome::Exited(status) => assert!(status.success()),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(
        fs::metadata(dir.join("Generated.png")).unwrap().modified().unwrap(),
        before
    );
}
