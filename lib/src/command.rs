//! Maps a `JobRequest` onto the executable's command line.
//!
//! The executable takes its global flags first, then a verb (`generate` or
//! `transfer-style`) followed by the verb's own flags and positional paths:
//!
//! ```text
//! texture-synthesis [--alpha A] --out P --out-size WxH --seed S --rand-init N
//!     --k-neighs K --cauchy C --backtrack-pct F --backtrack-stages B
//!     [--in-size WxH] [--tiling] [--inpaint MASK] <verb> ...
//! ```

use crate::{Error, GuideRole, JobRequest, Mode};
use std::{ffi::OsString, path::Path};

/// Assembles the arguments (excluding the executable itself) for `request`.
///
/// Every guide the mode needs must already be on disk, see `Guide::flush`.
pub fn args(request: &JobRequest) -> Result<Vec<OsString>, Error> {
    request.check_shape()?;

    let tweaks = request.tweaks();
    let mut args: Vec<OsString> = Vec::with_capacity(24);

    if request.mode() == Mode::TransferStyle {
        push_flag(&mut args, "--alpha", tweaks.alpha);
    }

    args.push("--out".into());
    args.push(request.output().into());
    push_flag(&mut args, "--out-size", tweaks.output_size);
    push_flag(&mut args, "--seed", tweaks.seed);
    push_flag(&mut args, "--rand-init", tweaks.rand_init);
    push_flag(&mut args, "--k-neighs", tweaks.k_neighbors);
    push_flag(&mut args, "--cauchy", tweaks.cauchy);
    push_flag(&mut args, "--backtrack-pct", tweaks.backtrack_percent);
    push_flag(&mut args, "--backtrack-stages", tweaks.backtrack_stages);

    if let Some(in_size) = tweaks.input_size {
        push_flag(&mut args, "--in-size", in_size);
    }

    if tweaks.tiling {
        args.push("--tiling".into());
    }

    let input = &request.inputs()[0];

    match request.mode() {
        Mode::Generate | Mode::MultiGenerate => {
            args.push("generate".into());
            args.extend(request.inputs().iter().map(OsString::from));
        }
        Mode::GuidedSynthesis => {
            let to = guide_path(request, GuideRole::To)?;
            let from = guide_path(request, GuideRole::From)?;

            args.push("generate".into());
            args.push("--target-guide".into());
            args.push(to.into());
            args.push("--guides".into());
            args.push(from.into());
            // `--guides` takes several values, so the example has to be
            // separated from them
            args.push("--".into());
            args.push(input.into());
        }
        Mode::TransferStyle => {
            let guide = guide_path(request, GuideRole::To)?;

            args.push("transfer-style".into());
            args.push("--style".into());
            args.push(input.into());
            args.push("--guide".into());
            args.push(guide.into());
        }
        Mode::Inpaint => {
            let mask = guide_path(request, GuideRole::To)?;

            args.push("--inpaint".into());
            args.push(mask.into());
            args.push("generate".into());
            args.push(input.into());
        }
    }

    Ok(args)
}

fn push_flag<V: std::fmt::Display>(args: &mut Vec<OsString>, flag: &str, value: V) {
    args.push(flag.into());
    args.push(value.to_string().into());
}

fn guide_path(request: &JobRequest, role: GuideRole) -> Result<&Path, Error> {
    request
        .guide(role)
        .ok_or(Error::MissingGuide(request.mode(), role))?
        .path()
        .ok_or(Error::GuideNotFlushed(role))
}
