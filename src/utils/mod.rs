/// Names from `candidates` closest to `query`, best first. Candidates scoring
/// below the cut-off are left out.
pub fn suggest<'a>(query: &str, candidates: &'a [String], limit: usize) -> Vec<&'a str> {
    let query = query.to_lowercase();
    let mut scored: Vec<(f64, &str)> = candidates
        .iter()
        .map(|c| (strsim::jaro_winkler(&query, &c.to_lowercase()), c.as_str()))
        .filter(|(score, _)| *score >= SUGGESTION_CUTOFF)
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().take(limit).map(|(_, name)| name).collect()
}

const SUGGESTION_CUTOFF: f64 = 0.8;

/// "W-D-L" record, e.g. `18-4-4`.
pub fn format_record(wins: i32, draws: i32, losses: i32) -> String {
    format!("{}-{}-{}", wins, draws, losses)
}

/// Cuts `text` to at most `width` characters, marking the cut with `~`.
pub fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('~');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_ranks_close_names_first() {
        let teams = vec![
            "Arsenal".to_string(),
            "Aston Villa".to_string(),
            "Barcelona".to_string(),
        ];
        let hits = suggest("arsenl", &teams, 2);
        assert_eq!(hits.first(), Some(&"Arsenal"));
        assert!(!hits.contains(&"Barcelona"));
        assert!(suggest("zzzz", &teams, 3).is_empty());
    }

    #[test]
    fn test_format_record() {
        assert_eq!(format_record(18, 4, 4), "18-4-4");
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("Arsenal", 10), "Arsenal");
        assert_eq!(fit("Tottenham Hotspur", 8), "Tottenh~");
    }
}
