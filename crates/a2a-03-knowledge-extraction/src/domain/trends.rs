use shared_types::{SearchResult, TrendReport};

/// Words that mark a result as reporting something new.
pub const TREND_WORDS: [&str; 7] = [
    "emerging",
    "novel",
    "breakthrough",
    "innovative",
    "recent",
    "latest",
    "new",
];

/// Counts, per trend word, the results whose title or snippet contain it
/// as a whole word. Trends are ordered by count, then by [`TREND_WORDS`] order.
pub fn identify_trends(results: &[SearchResult]) -> TrendReport {
    let mut report = TrendReport::default();
    for result in results {
        let content = format!("{} {}", result.snippet, result.title).to_lowercase();
        let words: Vec<&str> = content
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        for trend in TREND_WORDS {
            if words.contains(&trend) {
                *report.keyword_counts.entry(trend.to_string()).or_default() += 1;
            }
        }
    }

    let mut ranked: Vec<(usize, &str)> = TREND_WORDS
        .iter()
        .enumerate()
        .filter(|(_, w)| report.keyword_counts.contains_key(**w))
        .map(|(i, w)| (i, *w))
        .collect();
    ranked.sort_by(|a, b| {
        let count = |w: &str| report.keyword_counts.get(w).copied().unwrap_or(0);
        count(b.1).cmp(&count(a.1)).then(a.0.cmp(&b.0))
    });
    report.trends = ranked.into_iter().map(|(_, w)| w.to_string()).collect();
    report
}
