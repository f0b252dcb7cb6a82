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

//! `tsynth-launcher` runs the `texture-synthesis` executable as a background
//! job and picks up the image it writes.
//!
//! A job is described by a `JobRequest`, built via a `JobRequestBuilder`.
//! `Launcher::launch` turns the request into a command line, starts the
//! executable without waiting for it, and returns a `JobHandle`. The handle
//! owns the poll state of the job: polling it reports when the output file
//! has been (re)written, the process exited, or the job timed out. Finished
//! outputs are loaded into an `ImageRegistry`, such as `ImageCache`.
//!
//! ## Modes
//!
//! 1. Single example generation
//! 2. Multi example generation
//! 3. Guided synthesis
//! 4. Style transfer
//! 5. Inpainting
//!
//! ## Usage
//!
//! ```no_run
//! use tsynth_launcher::{ImageCache, JobOutcome, JobRequest, Launcher, Mode};
//!
//! let request = JobRequest::builder(Mode::Generate)
//!     .input("imgs/1.jpg")
//!     .output("out/01.png")
//!     .tiling_mode(true)
//!     .build()
//!     .expect("invalid request");
//!
//! let job = Launcher::new("bin/texture-synthesis")
//!     .launch(request)
//!     .expect("failed to launch");
//!
//! let mut cache = ImageCache::new();
//! if let JobOutcome::Loaded { path, .. } = job.wait(&mut cache).expect("failed to load") {
//!     println!("generated {}", path.display());
//! }
//! ```
pub mod command;
pub mod config;
mod errors;
pub mod guide;
pub mod launch;
pub mod output;
pub mod poll;
pub mod registry;
mod request;
pub mod scan;
mod size;

pub use errors::{Error, InputCount, InvalidRange};
pub use guide::{Guide, GuideRole};
pub use launch::{ExecutableStatus, JobHandle, JobOutcome, JobStatus, Launcher};
pub use output::{OutputTarget, ResolvedOutput};
pub use poll::{OutputWatch, PollConfig, PollState, Tick};
pub use registry::{ImageCache, ImageRegistry, Loaded};
pub use request::{JobRequest, JobRequestBuilder, Mode, Tweaks, OUTPUT_EXTENSIONS};
pub use size::{input_dimensions, Dims, SizeSpec, FALLBACK_SIZE, PRESETS};

pub use image;
