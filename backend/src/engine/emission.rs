use std::cmp::Ordering;
use std::collections::BTreeMap;

use shared::{CategoryScore, EmissionCategory, EmissionProfile};
use strum::IntoEnumIterator;

use super::ValidationError;
use super::catalog::ScoringCatalog;

pub const RECOMMENDED_ACTIONS: usize = 3;

// Folds a complete answer set into per-category scores and the top three
// recommended actions. Pure: same answers and catalog, same profile.
pub fn score(
    catalog: &ScoringCatalog,
    answers: &BTreeMap<String, String>,
) -> Result<EmissionProfile, ValidationError> {
    for id in answers.keys() {
        if catalog.question(id).is_none() {
            return Err(ValidationError::UnknownQuestion(id.clone()));
        }
    }

    let mut totals: BTreeMap<EmissionCategory, f32> =
        EmissionCategory::iter().map(|category| (category, 0.0)).collect();
    for (id, question) in catalog.questions() {
        let selected = answers
            .get(id)
            .ok_or_else(|| ValidationError::MissingAnswer(id.clone()))?;
        let option =
            question
                .options
                .get(selected)
                .ok_or_else(|| ValidationError::InvalidOption {
                    question: id.clone(),
                    option: selected.clone(),
                })?;
        if let Some(total) = totals.get_mut(&question.category) {
            *total += option.weight;
        }
    }

    let mut scores: Vec<CategoryScore> = totals
        .into_iter()
        .map(|(category, score)| CategoryScore { category, score })
        .collect();
    // Descending by score; enum declaration order breaks ties.
    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    let total: f32 = scores.iter().map(|entry| entry.score).sum();
    let actions = pick_actions(catalog, &scores);

    Ok(EmissionProfile {
        scores,
        actions,
        summary: catalog.summary_for(total).to_string(),
    })
}

// One action per top category, highest-impact entry first, skipping anything
// already selected so overlapping catalogs never produce duplicates.
fn pick_actions(catalog: &ScoringCatalog, ranked: &[CategoryScore]) -> Vec<String> {
    let mut selected: Vec<String> = Vec::with_capacity(RECOMMENDED_ACTIONS);
    for entry in ranked.iter().take(RECOMMENDED_ACTIONS) {
        if let Some(action) = catalog
            .actions(entry.category)
            .iter()
            .find(|action| !selected.contains(action))
        {
            selected.push(action.clone());
        }
    }

    // Top up from the rest of the ranking if overlap left a slot open; the
    // catalog is validated to hold at least three distinct actions.
    if selected.len() < RECOMMENDED_ACTIONS {
        'outer: for entry in ranked {
            for action in catalog.actions(entry.category) {
                if !selected.contains(action) {
                    selected.push(action.clone());
                    if selected.len() == RECOMMENDED_ACTIONS {
                        break 'outer;
                    }
                }
            }
        }
    }
    selected
}
