//! Source locations for log lines.

/// Formats `file:line`, keeping only the last two components of the path.
///
/// ```
/// assert_eq!(
///     logjson::caller_path("/src/app/logjson/stack.rs", 7),
///     "logjson/stack.rs:7",
/// );
/// ```
pub fn caller_path(file: &str, line: u32) -> String {
    const KEEP_COMPONENTS: usize = 2;

    let trimmed = file
        .rmatch_indices(['/', '\\'])
        .nth(KEEP_COMPONENTS - 1)
        .map_or(file, |(index, _)| &file[index + 1..]);
    format!("{trimmed}:{line}")
}
