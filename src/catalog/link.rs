//! Cursor extraction from `Link` response headers.
//!
//! The admin API paginates with a header of the form
//!
//! ```text
//! <https://shop/admin/api/2023-10/products.json?limit=250&page_info=abc>; rel="previous",
//! <https://shop/admin/api/2023-10/products.json?limit=250&page_info=def>; rel="next"
//! ```

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Query parameter that carries the opaque pagination cursor.
pub const PAGE_INFO_PARAM: &str = "page_info";

/// One `<url>; param; param` entry. URLs may contain commas, so entries are
/// located by their angle brackets rather than by splitting on `,`.
static LINK_ENTRY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^>]*)>([^<]*)").unwrap());

/// Return the cursor of the `rel="next"` entry, if any.
pub fn next_cursor(link_header: &str) -> Option<String> {
    LINK_ENTRY_REGEX
        .captures_iter(link_header)
        .filter(|cap| is_next_relation(&cap[2]))
        .find_map(|cap| cursor_from_url(&cap[1]))
}

fn is_next_relation(params: &str) -> bool {
    params
        .split(';')
        .filter_map(|param| param.split_once('='))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("rel"))
        .any(|(_, value)| {
            value
                .trim()
                .trim_end_matches(',')
                .trim()
                .trim_matches('"')
                .split_whitespace()
                .any(|rel| rel.eq_ignore_ascii_case("next"))
        })
}

fn cursor_from_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let url = Url::parse(raw)
        .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(raw)))
        .ok()?;

    url.query_pairs()
        .find(|(key, _)| key == PAGE_INFO_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
