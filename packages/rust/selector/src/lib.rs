//! Topic selector.
//!
//! Pure decision logic: given a catalog and the selection history,
//! pick the next topic. Deterministic for a given catalog, history,
//! and run date — the weighted draw is seeded from the date via
//! [`seed::day_seed`].

pub mod seed;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use tracing::{debug, info, instrument};

use draftmill_shared::{Catalog, DraftmillError, Result, SelectionState, Topic};

pub use seed::day_seed;

/// Options controlling a selection.
#[derive(Debug, Clone)]
pub struct SelectorOptions {
    /// Run date; drives the RNG seed.
    pub date: NaiveDate,
    /// Minimum cooldown gap. `None` derives `catalog.len() / 2`.
    pub min_gap: Option<usize>,
}

/// How many selections ago a topic was last in conflict with the history.
///
/// A record conflicts if it names the same topic id or the recorded topic
/// shares a tag with `topic`. The most recent record counts as distance 1;
/// `None` means the topic never conflicted.
pub fn cooldown(topic: &Topic, catalog: &Catalog, state: &SelectionState) -> Option<usize> {
    for (distance, record) in state.recent().enumerate() {
        if record.topic_id == topic.id {
            return Some(distance + 1);
        }
        // Tag overlap only counts when the recorded topic is still in the
        // catalog; retired topics no longer constrain the pool.
        if let Some(past) = catalog.get(&record.topic_id) {
            if topic.shares_tag(past) {
                return Some(distance + 1);
            }
        }
    }
    None
}

/// Select the next topic.
///
/// Topics whose cooldown exceeds the minimum gap are eligible; if every
/// topic is on cooldown the draw falls back to the full catalog rather
/// than failing — continuity of output takes priority over strict
/// spacing. Within the candidate set the draw is weighted by
/// `Topic::weight`, seeded from the run date, with candidates ordered by
/// id so the result does not depend on catalog file order.
#[instrument(skip_all, fields(date = %options.date, topics = catalog.len()))]
pub fn select<'a>(
    catalog: &'a Catalog,
    state: &SelectionState,
    options: &SelectorOptions,
) -> Result<&'a Topic> {
    if catalog.is_empty() {
        return Err(DraftmillError::selection("catalog is empty"));
    }

    let min_gap = options.min_gap.unwrap_or(catalog.len() / 2);

    let mut eligible: Vec<&Topic> = catalog
        .topics()
        .iter()
        .filter(|t| cooldown(t, catalog, state).is_none_or(|c| c > min_gap))
        .collect();

    if eligible.is_empty() {
        info!(min_gap, "all topics on cooldown, falling back to full catalog");
        eligible = catalog.topics().iter().collect();
    }

    // Stable order by id so equal-weight draws are reproducible across
    // catalog file orderings given the same seed.
    eligible.sort_by(|a, b| a.id.cmp(&b.id));

    let weights: Vec<f64> = eligible.iter().map(|t| t.weight).collect();
    let index = WeightedIndex::new(&weights)
        .map_err(|e| DraftmillError::selection(format!("invalid weights: {e}")))?;

    let seed = day_seed(options.date);
    let mut rng = StdRng::seed_from_u64(seed);
    let chosen = eligible[index.sample(&mut rng)];

    debug!(
        topic_id = %chosen.id,
        eligible = eligible.len(),
        min_gap,
        seed,
        "topic selected"
    );

    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use draftmill_catalog::parse_catalog;
    use draftmill_shared::SelectionRecord;

    fn catalog3() -> Catalog {
        parse_catalog(
            r#"
[[topics]]
id = "a"
title = "Widgets"
tags = ["ui"]

[[topics]]
id = "b"
title = "Layout"
tags = ["ui"]

[[topics]]
id = "c"
title = "Testing"
tags = ["quality"]
"#,
        )
        .unwrap()
    }

    fn record(id: &str) -> SelectionRecord {
        SelectionRecord {
            topic_id: id.into(),
            selected_at: Utc::now(),
            draft_path: format!("drafts/2026-01-01-{id}"),
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn options(d: &str) -> SelectorOptions {
        SelectorOptions {
            date: date(d),
            min_gap: None,
        }
    }

    #[test]
    fn empty_history_selects_from_catalog() {
        let catalog = catalog3();
        let state = SelectionState::default();
        let topic = select(&catalog, &state, &options("2026-01-01")).unwrap();
        assert!(catalog.get(&topic.id).is_some());
    }

    #[test]
    fn selection_is_deterministic_per_day() {
        let catalog = catalog3();
        let state = SelectionState::default();
        let opts = options("2026-01-01");

        let first = select(&catalog, &state, &opts).unwrap().id.clone();
        for _ in 0..5 {
            assert_eq!(select(&catalog, &state, &opts).unwrap().id, first);
        }
    }

    #[test]
    fn selection_ignores_catalog_file_order() {
        let forward = catalog3();
        let reversed = parse_catalog(
            r#"
[[topics]]
id = "c"
title = "Testing"
tags = ["quality"]

[[topics]]
id = "b"
title = "Layout"
tags = ["ui"]

[[topics]]
id = "a"
title = "Widgets"
tags = ["ui"]
"#,
        )
        .unwrap();

        let state = SelectionState::default();
        let opts = options("2026-03-15");
        assert_eq!(
            select(&forward, &state, &opts).unwrap().id,
            select(&reversed, &state, &opts).unwrap().id
        );
    }

    #[test]
    fn cooldown_counts_recent_first() {
        let catalog = catalog3();
        let mut state = SelectionState::default();
        state.push_trimmed(record("a"), 0);
        state.push_trimmed(record("c"), 0);

        let a = catalog.get("a").unwrap();
        let c = catalog.get("c").unwrap();
        assert_eq!(cooldown(c, &catalog, &state), Some(1));
        assert_eq!(cooldown(a, &catalog, &state), Some(2));
    }

    #[test]
    fn cooldown_sees_shared_tags() {
        let catalog = catalog3();
        let mut state = SelectionState::default();
        state.push_trimmed(record("a"), 0);

        // "b" shares the "ui" tag with the just-selected "a".
        let b = catalog.get("b").unwrap();
        assert_eq!(cooldown(b, &catalog, &state), Some(1));

        let c = catalog.get("c").unwrap();
        assert_eq!(cooldown(c, &catalog, &state), None);
    }

    #[test]
    fn respects_cooldown_gap() {
        let catalog = catalog3();
        let mut state = SelectionState::default();
        state.push_trimmed(record("c"), 0);

        // min_gap 1: "c" was just chosen, so only "a"/"b" are eligible.
        let opts = SelectorOptions {
            date: date("2026-01-02"),
            min_gap: Some(1),
        };
        let topic = select(&catalog, &state, &opts).unwrap();
        assert_ne!(topic.id, "c");
    }

    #[test]
    fn falls_back_when_all_on_cooldown() {
        let catalog = catalog3();
        let mut state = SelectionState::default();
        for id in ["a", "b", "c"] {
            state.push_trimmed(record(id), 0);
        }

        // Every topic (or a tag-mate) appears within the gap.
        let opts = SelectorOptions {
            date: date("2026-01-04"),
            min_gap: Some(10),
        };
        let topic = select(&catalog, &state, &opts).unwrap();
        assert!(catalog.get(&topic.id).is_some());
    }

    #[test]
    fn weights_bias_the_draw() {
        let catalog = parse_catalog(
            r#"
[[topics]]
id = "heavy"
title = "Heavy"
weight = 1000.0

[[topics]]
id = "light"
title = "Light"
weight = 0.001
"#,
        )
        .unwrap();
        let state = SelectionState::default();

        let mut heavy = 0;
        for day in 1..=28 {
            let opts = SelectorOptions {
                date: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
                min_gap: Some(0),
            };
            if select(&catalog, &state, &opts).unwrap().id == "heavy" {
                heavy += 1;
            }
        }
        assert!(heavy >= 26, "heavy chosen only {heavy}/28 times");
    }

    #[test]
    fn empty_catalog_is_selection_error() {
        let catalog = Catalog::from_validated(vec![]);
        let state = SelectionState::default();
        let err = select(&catalog, &state, &options("2026-01-01")).unwrap_err();
        assert!(matches!(err, DraftmillError::Selection { .. }));
    }

    #[test]
    fn retired_topic_in_history_does_not_block_tags() {
        let catalog = catalog3();
        let mut state = SelectionState::default();
        // "z" is no longer in the catalog; only exact-id matches would apply.
        state.push_trimmed(record("z"), 0);

        let b = catalog.get("b").unwrap();
        assert_eq!(cooldown(b, &catalog, &state), None);
    }
}
