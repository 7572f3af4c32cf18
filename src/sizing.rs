//! Instance size vocabulary and cost weighting
//!
//! EC2 instance types follow a `<family>.<size>` naming scheme where the size
//! token comes from a fixed, totally ordered vocabulary. The ordering drives
//! two things: rightsizing proposals (the next smaller size in the same
//! family) and the exponential weight used to attribute a fleet-wide cost to
//! individual instances.
//!
//! The vocabulary is a closed lookup table. Types that do not parse as
//! `family.size`, or whose size token is unknown (metal variants, future
//! sizes), carry no ordering information: they weigh 1.0 and are never
//! rightsized.

/// Size tokens in ascending capacity order
pub const INSTANCE_SIZE_ORDER: [&str; 18] = [
    "nano", "micro", "small", "medium", "large", "xlarge", "2xlarge", "3xlarge", "4xlarge",
    "6xlarge", "8xlarge", "9xlarge", "10xlarge", "12xlarge", "16xlarge", "18xlarge", "24xlarge",
    "32xlarge",
];

/// Split an instance type into (family, size), requiring exactly one dot
fn split_type(instance_type: &str) -> Option<(&str, &str)> {
    let mut parts = instance_type.split('.');
    let family = parts.next()?;
    let size = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((family, size))
}

/// Position of the size token in the ordered vocabulary, if recognized
pub fn size_index(instance_type: &str) -> Option<usize> {
    let (_, size) = split_type(instance_type)?;
    INSTANCE_SIZE_ORDER.iter().position(|s| *s == size)
}

/// Next smaller type in the same family, if one exists
///
/// Returns `None` for unrecognized types and for types already at the
/// smallest size.
pub fn next_smaller_type(instance_type: &str) -> Option<String> {
    let (family, size) = split_type(instance_type)?;
    let idx = INSTANCE_SIZE_ORDER.iter().position(|s| *s == size)?;
    if idx == 0 {
        return None;
    }
    Some(format!("{}.{}", family, INSTANCE_SIZE_ORDER[idx - 1]))
}

/// Exponential size proxy: 2^index, or 1.0 when the size is unknown
///
/// A crude stand-in for relative on-demand pricing (each size step roughly
/// doubles capacity and cost).
pub fn approximate_weight(instance_type: &str) -> f64 {
    match size_index(instance_type) {
        Some(idx) => 2f64.powi(idx as i32),
        None => 1.0,
    }
}

/// Weight clamped to at least 1.0, as used for cost attribution
pub fn effective_weight(instance_type: &str) -> f64 {
    approximate_weight(instance_type).max(1.0)
}
