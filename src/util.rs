use chrono::DateTime;
use chrono::Utc;

const MAX_RATING: usize = 5;

pub fn format_timestamp(at: DateTime<Utc>) -> String {
  at.format("%d.%m.%Y %H:%M").to_string()
}

/// Renders a 1–5 rating as filled and empty stars. Out-of-range values are clamped.
pub fn rating_stars(rating: i32) -> String {
  let filled = usize::try_from(rating).unwrap_or(0).min(MAX_RATING);
  format!("{}{}", "★".repeat(filled), "☆".repeat(MAX_RATING - filled))
}
