//! Builders for PostgREST query-string filters.
//!
//! Filter values are wrapped in double quotes so commas and parentheses in a
//! keyword cannot break out of the `or=(...)` group. Inside quotes, `"` and
//! `\` are backslash-escaped. LIKE metacharacters in the keyword are escaped
//! first so they match literally.

/// `*kw*` with `%`, `_` and `\` escaped for a LIKE pattern.
fn like_pattern(keyword: &str) -> String {
  let mut out = String::with_capacity(keyword.len() + 2);
  out.push('*');
  for c in keyword.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('*');
  out
}

fn quote(value: &str) -> String {
  let mut out = String::with_capacity(value.len() + 2);
  out.push('"');
  for c in value.chars() {
    if matches!(c, '"' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('"');
  out
}

/// Value of the `or` parameter matching `keyword` in either text column.
pub fn keyword_filter(keyword: &str) -> String {
  let pattern = quote(&like_pattern(keyword));
  format!("(title.ilike.{pattern},selftext.ilike.{pattern})")
}
