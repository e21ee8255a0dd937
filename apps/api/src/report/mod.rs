//! Drug notice: backend fields → filtered fields → two-column PDF.

pub mod fields;
pub mod handlers;
