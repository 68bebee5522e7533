pub mod books;
pub mod news;
pub mod notices;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// One structural selector candidate: the rule matches when the page yields
/// strictly more than `min_items` elements for the selector.
pub struct SelectorRule {
    pub selector: &'static str,
    pub min_items: usize,
}

/// Evaluate selector candidates in order; the first rule that clears its
/// minimum wins and later candidates are never consulted.
pub fn first_matching<'a>(doc: &'a Html, rules: &[SelectorRule]) -> Option<Vec<ElementRef<'a>>> {
    for rule in rules {
        let Ok(selector) = Selector::parse(rule.selector) else {
            continue;
        };
        let items: Vec<ElementRef<'a>> = doc.select(&selector).collect();
        if items.len() > rule.min_items {
            debug!(
                "selector {:?} matched {} items",
                rule.selector,
                items.len()
            );
            return Some(items);
        }
    }
    None
}

/// Concatenated, per-node-trimmed text of an element.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &[SelectorRule] = &[
        SelectorRule { selector: ".first li", min_items: 3 },
        SelectorRule { selector: ".second li", min_items: 3 },
    ];

    #[test]
    fn first_candidate_wins_when_it_clears_the_minimum() {
        let html = r#"<div class="first"><ul>
            <li>a</li><li>b</li><li>c</li><li>d</li>
        </ul></div>"#;
        let doc = Html::parse_document(html);
        let items = first_matching(&doc, RULES).unwrap();
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn falls_through_past_candidates_at_or_below_the_minimum() {
        // Three matches is not strictly more than three.
        let html = r#"
            <div class="first"><ul><li>a</li><li>b</li><li>c</li></ul></div>
            <div class="second"><ul><li>1</li><li>2</li><li>3</li><li>4</li><li>5</li></ul></div>
        "#;
        let doc = Html::parse_document(html);
        let items = first_matching(&doc, RULES).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(element_text(&items[0]), "1");
    }

    #[test]
    fn no_candidate_matches() {
        let doc = Html::parse_document("<p>nothing list-like</p>");
        assert!(first_matching(&doc, RULES).is_none());
    }
}
