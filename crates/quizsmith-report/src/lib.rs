//! quizsmith-report — report artifact rendering.
//!
//! Renders a finished `Report` as a markdown summary or a self-contained
//! HTML file. These are offline artifacts; serving pages is someone else's
//! job.

pub mod html;
pub mod markdown;
