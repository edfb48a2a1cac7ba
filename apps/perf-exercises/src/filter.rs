//! City search ranking.
//!
//! A name matches when it contains the query, ignoring case. Matches are
//! ranked exact, then prefix, then word prefix, then anywhere; ties sort
//! alphabetically.

use std::cmp::Ordering;
use std::thread;
use std::time::Duration;

use perfkit_core::CancelToken;

use crate::cities::{all_cities, City};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchRank {
    Exact,
    Prefix,
    WordPrefix,
    Substring,
}

pub fn match_rank(name: &str, query: &str) -> Option<MatchRank> {
    let name = name.to_lowercase();
    let query = query.to_lowercase();
    if name == query {
        Some(MatchRank::Exact)
    } else if name.starts_with(&query) {
        Some(MatchRank::Prefix)
    } else if name
        .split(|c: char| c.is_whitespace() || c == '-' || c == '\'')
        .any(|word| word.starts_with(&query))
    {
        Some(MatchRank::WordPrefix)
    } else if name.contains(&query) {
        Some(MatchRank::Substring)
    } else {
        None
    }
}

/// Ranks `cities` against `query`. A blank query keeps every city.
pub fn rank_cities(cities: &[City], query: &str) -> Vec<City> {
    let query = query.trim();
    let mut ranked: Vec<(MatchRank, City)> = cities
        .iter()
        .filter_map(|city| {
            if query.is_empty() {
                Some((MatchRank::Substring, *city))
            } else {
                match_rank(city.name, query).map(|rank| (rank, *city))
            }
        })
        .collect();
    ranked.sort_by(|(rank_a, a), (rank_b, b)| match rank_a.cmp(rank_b) {
        Ordering::Equal => a.name.cmp(b.name),
        other => other,
    });
    ranked.into_iter().map(|(_, city)| city).collect()
}

pub fn filter_cities(query: &str) -> Vec<City> {
    rank_cities(all_cities(), query)
}

/// Worker-side filter. Sleeps `latency` first to stand in for a slow
/// worker and gives up once `token` is cancelled.
pub fn filter_cities_in_worker(
    query: &str,
    latency: Duration,
    token: &CancelToken,
) -> Result<Vec<City>, String> {
    const STEP: Duration = Duration::from_millis(2);
    let mut waited = Duration::ZERO;
    while waited < latency {
        if token.is_cancelled() {
            return Err(format!("filter for {query:?} cancelled"));
        }
        let step = STEP.min(latency - waited);
        thread::sleep(step);
        waited += step;
    }
    if token.is_cancelled() {
        return Err(format!("filter for {query:?} cancelled"));
    }
    Ok(filter_cities(query))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cities: &[City]) -> Vec<&'static str> {
        cities.iter().map(|city| city.name).collect()
    }

    #[test]
    fn blank_query_keeps_everything_sorted() {
        let all = filter_cities("  ");
        assert_eq!(all.len(), all_cities().len());
        assert!(all.windows(2).all(|pair| pair[0].name <= pair[1].name));
    }

    #[test]
    fn exact_beats_prefix_beats_word_prefix_beats_substring() {
        let ranked = filter_cities("san");
        let ranked_names = names(&ranked);
        let position = |name: &str| ranked_names.iter().position(|n| *n == name).expect(name);
        // "San Diego" starts with the query, "Busan" only contains it.
        assert!(position("San Diego") < position("Busan"));
        // "Santo Domingo" starts with the query, "Los Angeles" does not match.
        assert!(position("San Francisco") < position("Santo Domingo"));
        assert!(!ranked_names.contains(&"Los Angeles"));

        let ranked = filter_cities("york");
        assert_eq!(names(&ranked), vec!["New York"]);
        assert_eq!(match_rank("New York", "york"), Some(MatchRank::WordPrefix));
        assert_eq!(match_rank("Paris", "PARIS"), Some(MatchRank::Exact));
    }

    #[test]
    fn unknown_query_yields_nothing() {
        assert!(filter_cities("zzzz").is_empty());
    }

    #[test]
    fn live_worker_returns_results() {
        let token = CancelToken::never();
        assert!(filter_cities_in_worker("rome", Duration::ZERO, &token).is_ok());
    }
}
