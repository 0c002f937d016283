//! # Phase Module
//!
//! The lifecycle ladder of a video and the pure classifier that places a
//! snapshot on it.
//!
//! | Rank | Phase | Reached when |
//! |------|-------|--------------|
//! | 0 | Published | companion repo is set |
//! | 1 | Pending Publish | uploaded and tweeted |
//! | 2 | Edit Requested | editing requested |
//! | 3 | Material Done | code, screen, head and diagrams done |
//! | 4 | Started | a date is set |
//! | 5 | Delayed | on hold (side state) |
//! | 6 | Sponsored Blocked | sponsor blocks it (side state) |
//! | 7 | Ideas | nothing above |
//!
//! Lower rank means further along.

mod classifier;

pub use classifier::*;
