//! Profile data a document is tailored from: work experience, education and
//! achievements. Every query is scoped to the authorized account.

pub mod achievements;
pub mod educations;
pub mod experiences;
