//! Delimiter splitting that never drops empty fields.

/// Split an unquoted delimiter-joined string into its fields.
///
/// The output always has `(number of delimiter occurrences) + 1` elements:
/// leading, interior, and trailing empties are all preserved.
///
/// ```
/// use csv_loom::split;
///
/// assert_eq!(split(',', "A,B,C"), vec!["A", "B", "C"]);
/// assert_eq!(split(',', "A,,C"), vec!["A", "", "C"]);
/// assert_eq!(split(',', ",,C"), vec!["", "", "C"]);
/// assert_eq!(split(',', ","), vec!["", ""]);
/// assert_eq!(split(',', ""), vec![""]);
/// ```
pub fn split(delimiter: char, text: &str) -> Vec<String> {
    text.split(delimiter).map(str::to_string).collect()
}
