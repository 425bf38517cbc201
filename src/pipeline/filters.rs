/// Name-based campaign filters, both case-insensitive substring checks.
/// Exclusion wins: a campaign whose name contains any `does_not_contain`
/// entry is dropped even if it also matches `contains`. An empty list
/// disables the corresponding check.
pub fn name_passes(name: &str, contains: &[String], does_not_contain: &[String]) -> bool {
    let name = name.to_lowercase();

    if does_not_contain
        .iter()
        .any(|s| name.contains(&s.to_lowercase()))
    {
        return false;
    }

    contains.is_empty() || contains.iter().any(|s| name.contains(&s.to_lowercase()))
}
