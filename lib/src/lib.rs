#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

//! A toy orrery: a fixed table of bodies circling the origin, driven by
//! a simulated-day clock and a periodic ticker, with change
//! notifications for a rendering layer to subscribe to.

pub mod bodies;
pub mod clock;
pub mod observe;
pub mod system;
pub mod ticker;
