//! Algebra tutor helpers built on top of [`TextGenerator`](crate::TextGenerator).
//!
//! Terminal I/O stays with the caller; this module only builds prompts,
//! keeps session state and interprets replies.

pub mod prompts;
pub mod session;

pub use session::{
    Tutor, TutorAction, TutorSession, is_affirmative, is_negative, read_answer,
};
