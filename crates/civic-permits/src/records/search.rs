/// Case-insensitive substring match across a record's searchable fields.
/// A blank or missing needle matches everything.
pub fn matches_search<'a, I>(needle: Option<&str>, haystacks: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = match needle.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_lowercase(),
        _ => return true,
    };

    haystacks
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}
