use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("title selector is valid"));
static META_PROPERTY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property][content]").expect("meta selector is valid"));

const OG_IMAGE: &str = "og:image";

/// Text of the first `<title>` element, trimmed. Blank titles count as absent.
pub fn extract_title(doc: &Html) -> Option<String> {
    doc.select(&TITLE)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `content` of the first `<meta property="og:image">`, returned verbatim.
pub fn extract_thumbnail(doc: &Html) -> Option<String> {
    doc.select(&META_PROPERTY)
        .filter(|el| {
            el.value()
                .attr("property")
                .is_some_and(|p| p.eq_ignore_ascii_case(OG_IMAGE))
        })
        .find_map(|el| el.value().attr("content").filter(|c| !c.is_empty()))
        .map(str::to_string)
}
