// BEGIN - Embark standard lints v0.4
// do not change or add/remove here, but one can add exceptions after this section
// for more info see: <https://github.com/EmbarkStudios/rust-ecosystem/issues/59>
#![deny(unsafe_code)]
#![warn(
    clippy::all,
    clippy::await_holding_lock,
    clippy::char_lit_as_u8,
    clippy::checked_conversions,
    clippy::dbg_macro,
    clippy::debug_assert_with_mut_call,
    clippy::doc_markdown,
    clippy::empty_enum,
    clippy::enum_glob_use,
    clippy::exit,
    clippy::expl_impl_clone_on_copy,
    clippy::explicit_deref_methods,
    clippy::explicit_into_iter_loop,
    clippy::fallible_impl_from,
    clippy::filter_map_next,
    clippy::float_cmp_const,
    clippy::fn_params_excessive_bools,
    clippy::if_let_mutex,
    clippy::implicit_clone,
    clippy::imprecise_flops,
    clippy::inefficient_to_string,
    clippy::invalid_upcast_comparisons,
    clippy::large_types_passed_by_value,
    clippy::let_unit_value,
    clippy::linkedlist,
    clippy::lossy_float_literal,
    clippy::macro_use_imports,
    clippy::manual_ok_or,
    clippy::map_err_ignore,
    clippy::map_flatten,
    clippy::map_unwrap_or,
    clippy::match_on_vec_items,
    clippy::match_same_arms,
    clippy::match_wildcard_for_single_variants,
    clippy::mem_forget,
    clippy::mismatched_target_os,
    clippy::mut_mut,
    clippy::mutex_integer,
    clippy::needless_borrow,
    clippy::needless_continue,
    clippy::option_option,
    clippy::path_buf_push_overwrite,
    clippy::ptr_as_ptr,
    clippy::ref_option_ref,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::same_functions_in_if_condition,
    clippy::semicolon_if_nothing_returned,
    clippy::string_add_assign,
    clippy::string_add,
    clippy::string_lit_as_bytes,
    clippy::string_to_string,
    clippy::todo,
    clippy::trait_duplication_in_bounds,
    clippy::unimplemented,
    clippy::unnested_or_patterns,
    clippy::unused_self,
    clippy::useless_transmute,
    clippy::verbose_file_reads,
    clippy::zero_sized_map_values,
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms
)]
// END - Embark standard lints v0.4
// The exit code of the executable is forwarded
#![allow(clippy::exit)]

mod progress;

use structopt::StructOpt;

use progress::JobProgress;
use std::{
    path::{Path, PathBuf},
    process::ExitStatus,
};
use tsynth_launcher::{
    config::Preferences, image::GenericImageView, input_dimensions, output, scan, Dims, Error,
    ImageCache, JobOutcome, JobRequest, JobRequestBuilder, Launcher, Loaded, Mode, OutputTarget,
    SizeSpec,
};

fn parse_size(input: &str) -> Result<Dims, Error> {
    input.parse()
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
struct GuidedSynthesis {
    /// Guide map describing the example
    #[structopt(long, parse(from_os_str))]
    from: PathBuf,
    /// Guide map describing the generated output
    #[structopt(long, parse(from_os_str))]
    to: PathBuf,
    /// Example image used to synthesize a new image
    #[structopt(parse(from_os_str))]
    example: PathBuf,
}

#[derive(StructOpt)]
struct TransferStyle {
    /// The image from which the style will be be sourced
    #[structopt(long, parse(from_os_str))]
    style: PathBuf,
    /// The image used as a guide for the generated output
    #[structopt(long, parse(from_os_str))]
    guide: PathBuf,
}

#[derive(StructOpt)]
struct Inpaint {
    /// Inpaint map image, where black pixels are resolved, and white pixels are kept
    #[structopt(long, parse(from_os_str))]
    mask: PathBuf,
    /// The image to fill in
    #[structopt(parse(from_os_str))]
    example: PathBuf,
}

#[derive(StructOpt)]
enum Subcommand {
    /// Generates a new image from a single example
    #[structopt(name = "generate")]
    Generate {
        #[structopt(parse(from_os_str))]
        example: PathBuf,
    },
    /// Remixes several examples into a new image
    #[structopt(name = "multi-generate")]
    MultiGenerate {
        #[structopt(parse(from_os_str), required = true, min_values = 1)]
        examples: Vec<PathBuf>,
    },
    /// Generates a new image steered by a pair of guide maps
    #[structopt(name = "guided-synthesis")]
    GuidedSynthesis(GuidedSynthesis),
    /// Transfers the style from an example onto a target guide
    #[structopt(name = "transfer-style")]
    TransferStyle(TransferStyle),
    /// Fills in the masked parts of an example
    #[structopt(name = "inpaint")]
    Inpaint(Inpaint),
    /// Generates a new image for every image in a directory
    #[structopt(name = "batch")]
    Batch {
        #[structopt(parse(from_os_str))]
        dir: PathBuf,
    },
    /// Lists the images in a directory that can be used as examples
    #[structopt(name = "list")]
    List {
        #[structopt(parse(from_os_str))]
        dir: PathBuf,
    },
    /// Checks the texture-synthesis executable can be found
    #[structopt(name = "check")]
    Check {
        /// Remember the executable in the preferences file
        #[structopt(long)]
        save: bool,
    },
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
struct Tweaks {
    /// A seed value for the random generator to give pseudo-deterministic result.
    #[structopt(long, default_value = "1")]
    seed: u64,
    /// The number of randomly initialized pixels before the main resolve loop starts
    #[structopt(long, default_value = "1")]
    rand_init: u64,
    /// The number of neighboring pixels each pixel is aware of during the generation,
    /// larger numbers means more global structures are captured.
    #[structopt(long = "k-neighs", default_value = "50")]
    k_neighbors: u32,
    /// The distribution dispersion used for picking best candidate (controls the distribution 'tail flatness').
    /// Values close to 0.0 will produce 'harsh' borders between generated 'chunks'.
    /// Values closer to 1.0 will produce a smoother gradient on those borders.
    #[structopt(long, default_value = "1.0")]
    cauchy: f32,
    /// The percentage of pixels to be backtracked during each p_stage. Range (0.0, 1.0).
    #[structopt(long = "backtrack-pct", default_value = "0.5")]
    backtrack_percentage: f32,
    /// The number of backtracking stages. Backtracking prevents 'garbage' generation.
    #[structopt(long = "backtrack-stages", default_value = "5")]
    backtrack_stages: u32,
    /// Alpha parameter controls the 'importance' of the user guide maps, only used by
    /// `transfer-style`. Range (0.0 - 1.0)
    #[structopt(long, default_value = "0.8")]
    alpha: f32,
    /// Enables tiling of the output image
    #[structopt(long = "tiling")]
    enable_tiling: bool,
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
struct Sizes {
    /// Size of the generated image, in `width x height`, or a single number for both
    /// dimensions. Defaults to the size of the example
    #[structopt(long, parse(try_from_str = parse_size))]
    out_size: Option<Dims>,
    /// Percentage the output size is scaled by
    #[structopt(long, default_value = "100")]
    out_pct: u32,
    /// Resize input example map(s), in `width x height`, or a single number for both
    /// dimensions. Defaults to the size of the example
    #[structopt(long, parse(try_from_str = parse_size))]
    in_size: Option<Dims>,
    /// Percentage the input size is scaled by
    #[structopt(long, default_value = "100")]
    in_pct: u32,
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
struct Output {
    /// Directory the generated image is written to, the temp directory is used
    /// if it can't be written to. Defaults to the current directory
    #[structopt(long, short = "o", parse(from_os_str))]
    out_dir: Option<PathBuf>,
    /// Writes the generated image next to the example, named after it
    #[structopt(long, conflicts_with_all = &["out-dir", "temp"])]
    override_input: bool,
    /// Writes the generated image to a scratch directory
    #[structopt(long, conflicts_with = "out-dir")]
    temp: bool,
    /// File name of the generated image, the extension determines the format
    #[structopt(long, default_value = "Generated.png")]
    name: String,
}

impl Output {
    fn target(&self) -> OutputTarget {
        if self.override_input {
            OutputTarget::OverrideInput
        } else if self.temp {
            OutputTarget::Temp
        } else {
            OutputTarget::Directory(self.out_dir.clone().unwrap_or_else(|| PathBuf::from(".")))
        }
    }
}

#[derive(StructOpt)]
#[structopt(
    name = "tsynth-launcher",
    about = "Runs texture-synthesis in the background and loads what it generates",
    rename_all = "kebab-case"
)]
struct Opt {
    /// Preferences file, defaults to the user's config directory
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
    /// Path to the texture-synthesis executable, overrides the preferences
    #[structopt(long = "exe", env = "TSYNTH_EXE", parse(from_os_str))]
    executable: Option<PathBuf>,
    /// Show the output of texture-synthesis itself
    #[structopt(long)]
    show_output: bool,
    /// Start the job and return without waiting for the output
    #[structopt(long)]
    no_wait: bool,
    /// Don't show a spinner while waiting
    #[structopt(long)]
    no_progress: bool,
    #[structopt(flatten)]
    output: Output,
    #[structopt(flatten)]
    sizes: Sizes,
    #[structopt(flatten)]
    tweaks: Tweaks,
    #[structopt(subcommand)]
    cmd: Subcommand,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match real_main() {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            print_error(&e);
            std::process::exit(1);
        }
    }
}

fn print_error(e: &dyn std::fmt::Display) {
    if atty::is(atty::Stream::Stderr) {
        eprintln!("\x1b[31merror\x1b[0m: {}", e);
    } else {
        eprintln!("error: {}", e);
    }
}

fn real_main() -> Result<i32, Error> {
    let args = Opt::from_args();

    let prefs_path = args.config.clone().or_else(Preferences::default_path);
    let mut prefs = match prefs_path {
        Some(ref path) => Preferences::load(path)?,
        None => Preferences::default(),
    };

    if let Some(ref exe) = args.executable {
        prefs.executable = Some(exe.clone());
    }
    if args.show_output {
        prefs.inherit_output = true;
    }

    let (mode, examples, guide_from, guide_to) = match &args.cmd {
        Subcommand::List { dir } => {
            for img in scan::source_images(dir)? {
                println!("{}\t{}", img.label, img.path.display());
            }
            return Ok(0);
        }
        Subcommand::Check { save } => {
            let exe = prefs.executable.as_ref().ok_or(Error::NoExecutable)?;
            let status = Launcher::locate(exe);
            println!("{}", status);

            if *save && status.found {
                if let Some(ref path) = prefs_path {
                    prefs.executable = Some(status.path);
                    prefs.save(path)?;
                    println!("saved to {}", path.display());
                }
            }

            return Ok(if status.found { 0 } else { 1 });
        }
        Subcommand::Batch { dir } => return run_batch(&args, &prefs, dir),
        Subcommand::Generate { example } => (Mode::Generate, vec![example.clone()], None, None),
        Subcommand::MultiGenerate { examples } => {
            (Mode::MultiGenerate, examples.clone(), None, None)
        }
        Subcommand::GuidedSynthesis(gs) => (
            Mode::GuidedSynthesis,
            vec![gs.example.clone()],
            Some(gs.from.clone()),
            Some(gs.to.clone()),
        ),
        Subcommand::TransferStyle(ts) => (
            Mode::TransferStyle,
            vec![ts.style.clone()],
            None,
            Some(ts.guide.clone()),
        ),
        Subcommand::Inpaint(ip) => (
            Mode::Inpaint,
            vec![ip.example.clone()],
            None,
            Some(ip.mask.clone()),
        ),
    };

    // Sizes default to the example, or to the guide for style transfer,
    // since that's what the output will look like
    let size_source = match (mode, &guide_to) {
        (Mode::TransferStyle, Some(guide)) => guide.clone(),
        _ => examples[0].clone(),
    };

    // There's no single example to name the output after when remixing
    let name_source = if mode == Mode::MultiGenerate {
        None
    } else {
        Some(examples[0].as_path())
    };

    let resolved = output::resolve_output(&args.output.target(), &args.output.name, name_source)?;
    if let Some(ref warning) = resolved.warning {
        eprintln!("{}", warning);
    }

    let mut builder = request_builder(&args, mode, &size_source)
        .inputs(examples)
        .output(resolved.path);
    if let Some(from) = guide_from {
        builder = builder.guide_from(from);
    }
    if let Some(to) = guide_to {
        builder = builder.guide_to(to);
    }
    let request = builder.build()?;

    let job = prefs.launcher()?.launch(request)?;
    if let Some(warning) = job.warning() {
        eprintln!("{}", warning);
    }
    if args.no_wait {
        println!("{}", job.output().display());
        return Ok(0);
    }

    let mut cache = ImageCache::new();
    let progress = JobProgress::new(job.output(), args.no_progress);
    let outcome = job.wait_with(&mut cache, |status| progress.update(status))?;
    drop(progress);

    Ok(report(&cache, outcome))
}

/// Applies the tweak and size flags, sizes not given explicitly are taken
/// from `size_source`
fn request_builder(args: &Opt, mode: Mode, size_source: &Path) -> JobRequestBuilder {
    let probed = input_dimensions(size_source);

    let out_size = SizeSpec::Scaled {
        dims: args.sizes.out_size.unwrap_or(probed),
        percent: args.sizes.out_pct,
    };
    let in_size = SizeSpec::Scaled {
        dims: args.sizes.in_size.unwrap_or(probed),
        percent: args.sizes.in_pct,
    };

    let tweaks = &args.tweaks;
    JobRequest::builder(mode)
        .seed(tweaks.seed)
        .random_init(tweaks.rand_init)
        .nearest_neighbors(tweaks.k_neighbors)
        .cauchy_dispersion(tweaks.cauchy)
        .backtrack_percent(tweaks.backtrack_percentage)
        .backtrack_stages(tweaks.backtrack_stages)
        .guide_alpha(tweaks.alpha)
        .tiling_mode(tweaks.enable_tiling)
        .output_size(out_size.resolve())
        .resize_input(in_size.resolve())
}

fn run_batch(args: &Opt, prefs: &Preferences, dir: &Path) -> Result<i32, Error> {
    let sources: Vec<PathBuf> = scan::source_images(dir)?
        .into_iter()
        .map(|img| img.path)
        .collect();

    if sources.is_empty() {
        log::info!("no images found in {}", dir.display());
        return Ok(0);
    }

    let writable = match args.output.target() {
        OutputTarget::Directory(out_dir) => output::ensure_writable(&out_dir)?,
        OutputTarget::OverrideInput => output::ensure_writable(dir)?,
        OutputTarget::Temp => output::ensure_writable(&output::temp_dir()?)?,
    };
    if let Some(ref warning) = writable.warning {
        eprintln!("{}", warning);
    }

    // The template only has to be valid, its input and output are replaced
    // for every source
    let template = request_builder(args, Mode::Generate, &sources[0])
        .input(&sources[0])
        .output(writable.dir.join(output::png_name(&sources[0])))
        .build()?;

    let jobs = prefs
        .launcher()?
        .launch_batch(&template, &sources, &writable.dir)?;

    if args.no_wait {
        for job in &jobs {
            println!("{}", job.output().display());
        }
        return Ok(0);
    }

    let mut cache = ImageCache::new();
    let code = wait_all(jobs, &mut cache, |job, cache| {
        let progress = JobProgress::new(job.output(), args.no_progress);
        let output = job.output().to_owned();
        let outcome = job.wait_with(cache, |status| progress.update(status));
        (output, outcome)
    });

    Ok(code)
}

/// Waits on every job in turn, a job whose output fails to load doesn't stop
/// the rest from being waited on
fn wait_all<J, F>(jobs: Vec<J>, cache: &mut ImageCache, mut wait: F) -> i32
where
    F: FnMut(J, &mut ImageCache) -> (PathBuf, Result<JobOutcome, Error>),
{
    let mut code = 0;
    for job in jobs {
        let (output, outcome) = wait(job, cache);
        match outcome {
            Ok(outcome) => code = code.max(report(cache, outcome)),
            Err(err) => {
                log::error!("unable to load {}: {}", output.display(), err);
                print_error(&err);
                code = code.max(1);
            }
        }
    }
    code
}

/// Prints how a job ended, returning the exit code to use
fn report(cache: &ImageCache, outcome: JobOutcome) -> i32 {
    match outcome {
        JobOutcome::Loaded { path, loaded } => {
            let verb = match loaded {
                Loaded::New => "generated",
                Loaded::Refreshed => "regenerated",
            };

            match cache.get(&path) {
                Some(cached) => {
                    let (width, height) = cached.image.dimensions();
                    println!("{} {} ({}x{})", verb, path.display(), width, height);
                }
                None => println!("{} {}", verb, path.display()),
            }
            0
        }
        // The executable may still be running, it's not an error
        JobOutcome::TimedOut => 0,
        JobOutcome::Exited(status) => {
            print_error(&format!("texture-synthesis exited with {}", status));
            exit_code(status)
        }
    }
}

/// A clean exit that didn't write the output is still a failure
fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) if !status.success() => code,
        _ => 1,
    }
}
