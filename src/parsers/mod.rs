//! Input formats. Only Go's coverage profile is read today.
pub mod gocover;
