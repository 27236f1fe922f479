//! Translation capture.
//!
//! Every lookup made while a page renders passes through a
//! [`CaptureRecorder`], which records it into a shared [`Accumulator`] under
//! its resolved dot path together with the interpolation values of the call.
//! Missing translations are recorded too, with an empty value, so an operator
//! can fill them in from the editor.
//!
//! # Flow
//!
//! 1. A renderer calls [`Translator::t`] (or any [`TranslationProvider`] wrapped
//!    by a recorder).
//! 2. The recorder resolves `scope` + key into a path before delegating.
//! 3. The wrapped provider resolves; the recorder records the outcome and hands
//!    the result back unchanged.
//! 4. The snapshot endpoint serves [`Accumulator::snapshot`] as JSON.
//!
//! # Limitations
//!
//! The accumulator is process-wide. Concurrent requests interleave their
//! captures, so a snapshot reflects every request rendered since the last
//! reset, not one page.

pub mod accumulator;
pub mod interpolate;
pub mod options;
pub mod path;
pub mod provider;
pub mod recorder;
pub mod translator;
pub mod value;

pub use accumulator::{Accumulator, CaptureEntry, LocaleCapture, Snapshot};
pub use interpolate::interpolate;
pub use options::{HostObject, Interpolations, OptionValue, Options, RESERVED_KEYS, STRIPPED_KEYS};
pub use path::resolve_path;
pub use provider::TranslationProvider;
pub use recorder::CaptureRecorder;
pub use translator::Translator;
pub use value::{MISSING_PREFIX, Value};
