// Page scanner - Finds assignment anchors in course page HTML
use crate::domain::anchor::AssignmentAnchor;

/// Substring every assignment link href carries.
pub const ASSIGNMENT_LINK_PATTERN: &str = "mod/assign/view.php?id=";

const OVERVIEW_SECTION_MARKER: &str = "id=\"section-0\"";
const SECTION_MARKER: &str = "id=\"section-";

/// Scan `html` for `<a>` tags linking to assignments, in document order.
pub fn scan_anchors(html: &str) -> Vec<AssignmentAnchor> {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let overview = overview_range(&lower);

    let mut anchors = Vec::new();
    let mut pos = 0;
    while let Some(found) = lower[pos..].find("<a") {
        let start = pos + found;
        let after = lower.as_bytes().get(start + 2).copied();
        if !matches!(after, Some(b' ' | b'\t' | b'\n' | b'\r' | b'>')) {
            pos = start + 2;
            continue;
        }

        let Some(open_end) = lower[start..].find('>').map(|i| start + i) else {
            break;
        };
        let close = lower[open_end..]
            .find("</a>")
            .map(|i| open_end + i)
            .unwrap_or(lower.len());
        pos = (close + 4).min(lower.len());

        let attrs = &html[start + 2..open_end];
        let Some(href) = attr_value(attrs, "href") else {
            continue;
        };
        if !href.contains(ASSIGNMENT_LINK_PATTERN) {
            continue;
        }

        anchors.push(AssignmentAnchor {
            href,
            text: visible_text(&html[open_end + 1..close]),
            in_overview: overview.as_ref().is_some_and(|r| r.contains(&start)),
            offset: start,
        });
    }

    tracing::debug!("Found {} assignment links", anchors.len());
    anchors
}

/// Value of the query parameter `name` in `url`, percent-decoded.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn overview_range(lower: &str) -> Option<std::ops::Range<usize>> {
    let start = lower.find(OVERVIEW_SECTION_MARKER)?;
    let body = start + OVERVIEW_SECTION_MARKER.len();
    let end = lower[body..]
        .find(SECTION_MARKER)
        .map(|i| body + i)
        .unwrap_or(lower.len());
    Some(start..end)
}

fn attr_value(attrs: &str, name: &str) -> Option<String> {
    let lower = attrs.to_ascii_lowercase();
    let needle = format!("{}=", name);
    let mut search = 0;
    let value_start = loop {
        let at = search + lower[search..].find(&needle)?;
        let boundary = at == 0 || lower.as_bytes()[at - 1].is_ascii_whitespace();
        if boundary {
            break at + needle.len();
        }
        search = at + needle.len();
    };

    let rest = &attrs[value_start..];
    let raw = match rest.chars().next()? {
        quote @ ('"' | '\'') => {
            let inner = &rest[1..];
            &inner[..inner.find(quote).unwrap_or(inner.len())]
        }
        _ => rest.split(|c: char| c.is_whitespace() || c == '>').next().unwrap_or(""),
    };
    Some(decode_entities(raw))
}

fn visible_text(inner: &str) -> String {
    let lower = inner.to_ascii_lowercase();
    let mut kept = String::with_capacity(inner.len());
    let mut pos = 0;

    while let Some(found) = lower[pos..].find('<') {
        let tag_start = pos + found;
        kept.push_str(&inner[pos..tag_start]);
        let Some(tag_end) = lower[tag_start..].find('>').map(|i| tag_start + i) else {
            pos = inner.len();
            break;
        };
        let tag = &lower[tag_start..=tag_end];
        pos = tag_end + 1;

        if tag.starts_with("<span") && tag.contains("accesshide") {
            pos = lower[pos..]
                .find("</span>")
                .map(|i| pos + i + "</span>".len())
                .unwrap_or(inner.len());
        }
    }
    kept.push_str(&inner[pos..]);

    decode_entities(&kept)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
