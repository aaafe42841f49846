//! Shared range-validation helpers used by the provider validators.

/// Push an error if `value` is below `min` (integer, no upper bound).
pub(crate) fn validate_min(errors: &mut Vec<String>, name: &str, value: u32, min: u32) {
    if value < min {
        errors.push(format!("{name} = {value} must be at least {min}"));
    }
}

/// Push an error if `value` is outside `[min, max]` (float). NaN never passes.
pub(crate) fn validate_range_f64(
    errors: &mut Vec<String>,
    name: &str,
    value: f64,
    min: f64,
    max: f64,
) {
    if !(min..=max).contains(&value) {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error if `value` is not one of `allowed`. A leading `models/`
/// resource prefix is ignored.
pub(crate) fn validate_one_of(errors: &mut Vec<String>, name: &str, value: &str, allowed: &[&str]) {
    let bare = value.strip_prefix("models/").unwrap_or(value);
    if !allowed.contains(&bare) {
        errors.push(format!(
            "{name} = \"{value}\" is not one of [{}]",
            allowed.join(", ")
        ));
    }
}
