use chrono::{NaiveDate, Utc};

use crate::model::parse_timestamp;

/// Build the copyable citation line for a question page:
/// `Author. "Question." Site Name, 12 June 2024. https://site/faqs/slug`
///
/// The author segment is omitted when unknown. Without a publication date the
/// current date is used; a timestamp that fails to parse is included verbatim.
pub fn citation_line(
    question: &str,
    url: &str,
    site_name: &str,
    published_at: Option<&str>,
    author: Option<&str>,
) -> String {
    let date = match published_at {
        Some(raw) => parse_timestamp(Some(raw))
            .map(|ts| format_date(ts.date_naive()))
            .unwrap_or_else(|| raw.to_string()),
        None => format_date(Utc::now().date_naive()),
    };

    let author_text = author
        .map(|name| format!("{name}. "))
        .unwrap_or_default();

    format!("{author_text}\"{question}.\" {site_name}, {date}. {url}")
}

fn format_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_citation_with_author_and_date() {
        let line = citation_line(
            "What is ultra processed food",
            "https://example.org/faqs/what-is-upf",
            "Example FAQs",
            Some("2024-06-12T09:30:00Z"),
            Some("A. Writer"),
        );
        assert_eq!(
            line,
            "A. Writer. \"What is ultra processed food.\" Example FAQs, 12 June 2024. https://example.org/faqs/what-is-upf"
        );
    }

    #[test]
    fn author_segment_is_omitted_when_unknown() {
        let line = citation_line(
            "Why slugs",
            "https://example.org/faqs/why-slugs",
            "Example FAQs",
            Some("2023-01-02T00:00:00Z"),
            None,
        );
        assert!(line.starts_with("\"Why slugs.\""));
        assert!(line.contains("2 January 2023"));
    }

    #[test]
    fn missing_date_falls_back_to_today() {
        let line = citation_line("Q", "https://u", "Site", None, None);
        // The exact date is the current day; assert the stable parts.
        assert!(line.starts_with("\"Q.\" Site, "));
        assert!(line.ends_with(". https://u"));
    }

    #[test]
    fn unparsable_date_is_kept_verbatim() {
        let line = citation_line("Q", "https://u", "Site", Some("sometime in June"), None);
        assert!(line.contains("Site, sometime in June."));
    }
}
