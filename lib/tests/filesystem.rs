use std::{
    fs,
    path::{Path, PathBuf},
};
use tsynth_launcher::{
    image::{self, GenericImageView},
    output, scan, Guide, GuideRole, ImageCache, ImageRegistry, Loaded, OutputTarget,
};

/// A fresh directory under the system temp dir, unique per test
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

fn write_png(path: &Path, size: u32, shade: u8) {
    image::RgbaImage::from_pixel(size, size, image::Rgba([shade, shade, shade, 255]))
        .save(path)
        .expect("saved png");
}

#[test]
fn writable_directory_is_kept() {
    let dir = scratch("writable");
    let out = output::resolve_output(&OutputTarget::Directory(dir.clone()), "Generated.png", None)
        .unwrap();

    assert_eq!(out.path, fs::canonicalize(&dir).unwrap().join("Generated.png"));
    assert!(out.warning.is_none());
    // The probe cleans up after itself
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
}

#[test]
fn existing_files_survive_the_write_check() {
    let dir = scratch("existing-files");
    let notes = dir.join("write_test.txt");
    fs::write(&notes, b"user notes").unwrap();

    let out = output::resolve_output(&OutputTarget::Directory(dir.clone()), "Generated.png", None)
        .unwrap();
    assert!(out.warning.is_none());

    assert_eq!(fs::read(&notes).unwrap(), b"user notes");
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
}

#[test]
fn unwritable_directory_redirects_to_temp() {
    let dir = scratch("not-a-dir");
    // A regular file can't have anything created inside it, no matter who
    // we're running as
    let blocker = dir.join("blocker");
    fs::write(&blocker, b"").unwrap();

    let writable = output::ensure_writable(&blocker).unwrap();
    assert_eq!(writable.dir, output::temp_dir().unwrap());
    assert!(writable.warning.is_some());
}

#[cfg(unix)]
#[test]
fn read_only_directory_redirects_to_temp() {
    use std::os::unix::fs::PermissionsExt;

    let dir = scratch("read-only");
    let locked = dir.join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users can write regardless of the mode bits, in which case
    // there's nothing to redirect
    let privileged = fs::write(locked.join("probe"), b"").is_ok();
    let result = output::resolve_output(&OutputTarget::Directory(locked.clone()), "gen.png", None);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    if privileged {
        return;
    }

    let out = result.unwrap();
    assert!(out.path.starts_with(output::temp_dir().unwrap()));
    assert!(out.warning.unwrap().contains("No permission"));
}

#[test]
fn override_writes_next_to_input() {
    let dir = scratch("override");
    let input = dir.join("bricks.jpg");
    fs::write(&input, b"").unwrap();

    let out = output::resolve_output(&OutputTarget::OverrideInput, "ignored.png", Some(&input))
        .unwrap();
    assert_eq!(out.path, fs::canonicalize(&dir).unwrap().join("bricks.png"));
}

#[test]
fn scan_lists_only_images() {
    let dir = scratch("scan");
    for name in &["b.png", "a.JPG", "c.bmp", "notes.txt", "d.jpeg"] {
        fs::write(dir.join(name), b"").unwrap();
    }
    fs::create_dir(dir.join("nested.png")).unwrap();

    let names: Vec<_> = scan::source_images(&dir)
        .unwrap()
        .into_iter()
        .map(|img| img.label)
        .collect();
    assert_eq!(names, vec!["a.JPG", "b.png", "c.bmp"]);
}

#[test]
fn registry_refreshes_existing_entries() {
    let dir = scratch("registry");
    let path = dir.join("gen.png");
    write_png(&path, 8, 10);

    let mut cache = ImageCache::new();
    assert_eq!(cache.load_or_refresh(&path).unwrap(), Loaded::New);

    write_png(&path, 16, 200);
    // A relative spelling of the same file must hit the same entry
    let indirect = dir.join(".").join("gen.png");
    assert_eq!(cache.load_or_refresh(&indirect).unwrap(), Loaded::Refreshed);

    assert_eq!(cache.len(), 1);
    let cached = cache.get(&path).unwrap();
    assert_eq!(cached.reloads, 1);
    assert_eq!(cached.image.dimensions(), (16, 16));
}

#[test]
fn registry_reports_unreadable_images() {
    let dir = scratch("registry-bad");
    let path = dir.join("broken.png");
    fs::write(&path, b"not a png").unwrap();

    let mut cache = ImageCache::new();
    assert!(cache.load_or_refresh(&path).is_err());
    assert!(cache.is_empty());
}

#[test]
fn in_memory_guides_are_written_to_disk() {
    let dir = scratch("guide");
    let sidecar = dir.join("gen_to.png");

    let guide = Guide::Image(image::DynamicImage::new_rgba8(6, 3));
    let flushed = guide.flush(GuideRole::To, &sidecar).unwrap();

    assert_eq!(flushed.path(), Some(sidecar.as_path()));
    assert_eq!(image::image_dimensions(&sidecar).unwrap(), (6, 3));

    // Already on disk, checked in place
    let again = flushed.flush(GuideRole::To, Path::new("unused.png")).unwrap();
    assert_eq!(again.path(), Some(sidecar.as_path()));
}
