//! Property-based tests for extraction and fan-out
//!
//! Properties covered:
//! - Any serialization of a valid recipe extracts back to the same value
//! - Fences, trailing commas, single-element arrays and surrounding prose are
//!   recovered without changing the data
//! - Arrays with more than one element are always rejected
//! - A plan with N assignments produces exactly N specialist invocations, and
//!   synthesis runs only when at least one of them succeeds
//!
//! Case counts follow `PROPTEST_CASES` (default 64) so CI can dial them down.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{Value, json};

use brigade::extraction::{ExtractionError, ExtractionWarning, Extractor};
use brigade::llm::{LlmError, ScriptedBackend};
use brigade::{Brief, BriefScope, BuiltinPrompts, Config, Ingredient, Orchestrator, Recipe};
use brigade_orchestrator::{PLANNER_AGENT, SYNTHESIZER_AGENT, Schemas};

fn proptest_config(max_cases: Option<u32>) -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(64);
    let max_shrink_iters = std::env::var("PROPTEST_MAX_SHRINK_ITERS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000);

    ProptestConfig {
        cases: max_cases.map_or(cases, |max| cases.min(max)),
        max_shrink_iters,
        max_shrink_time: 30000,
        ..ProptestConfig::default()
    }
}

fn text() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ,.'-]{0,24}"
}

fn ingredient() -> impl Strategy<Value = Ingredient> {
    (text(), "[0-9]{1,3} ?(g|ml|cups?)?", proptest::option::of(text())).prop_map(
        |(item, quantity, notes)| Ingredient {
            item,
            quantity,
            notes,
        },
    )
}

fn recipe() -> impl Strategy<Value = Recipe> {
    (
        text(),
        text(),
        1u32..=24,
        proptest::option::of(0u32..240),
        proptest::option::of(0u32..480),
        prop::collection::vec(ingredient(), 1..6),
        prop::collection::vec(text(), 1..6),
        prop::collection::vec(text(), 0..3),
    )
        .prop_map(
            |(title, summary, servings, prep_minutes, cook_minutes, ingredients, steps, notes)| {
                Recipe {
                    title,
                    summary,
                    servings,
                    prep_minutes,
                    cook_minutes,
                    ingredients,
                    steps,
                    notes,
                }
            },
        )
}

/// Compact or pretty rendering of `value`
fn render(value: &Value, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap()
    } else {
        serde_json::to_string(value).unwrap()
    }
}

proptest! {
    #![proptest_config(proptest_config(None))]

    #[test]
    fn prop_serialized_recipe_extracts_unchanged(recipe in recipe(), pretty in any::<bool>()) {
        let schemas = Schemas::builtin().unwrap();
        let expected = serde_json::to_value(&recipe).unwrap();

        let extracted = Extractor::default()
            .extract(&render(&expected, pretty), Some(&schemas.recipe))
            .unwrap();

        prop_assert_eq!(extracted.value, expected);
        prop_assert!(extracted.warnings.is_empty());
    }

    #[test]
    fn prop_fenced_recipe_recovers(recipe in recipe(), tag in prop::sample::select(vec!["", "json", "JSON"])) {
        let schemas = Schemas::builtin().unwrap();
        let expected = serde_json::to_value(&recipe).unwrap();
        let raw = format!("```{tag}\n{}\n```", render(&expected, true));

        let extracted = Extractor::default().extract(&raw, Some(&schemas.recipe)).unwrap();

        prop_assert_eq!(extracted.value, expected);
    }

    #[test]
    fn prop_trailing_comma_recovers(recipe in recipe()) {
        let expected = serde_json::to_value(&recipe).unwrap();
        let compact = render(&expected, false);
        let raw = format!("{},}}", &compact[..compact.len() - 1]);

        let extracted = Extractor::default().extract_as::<Recipe>(&raw, None).unwrap();

        prop_assert_eq!(extracted.value, recipe);
    }

    #[test]
    fn prop_single_element_array_unwraps_with_warning(recipe in recipe(), pretty in any::<bool>()) {
        let expected = serde_json::to_value(&recipe).unwrap();
        let raw = format!("[{}]", render(&expected, pretty));

        let extracted = Extractor::default().extract(&raw, None).unwrap();

        prop_assert_eq!(extracted.value, expected);
        prop_assert_eq!(
            extracted.warnings,
            vec![ExtractionWarning::UnwrappedSingleElementArray]
        );
    }

    #[test]
    fn prop_object_embedded_in_prose_recovers(
        recipe in recipe(),
        before in "[A-Za-z ,.:]{0,40}",
        after in "[A-Za-z ,.!]{0,40}",
    ) {
        let expected = serde_json::to_value(&recipe).unwrap();
        let raw = format!("Sure! {before}\n{}\n{after}", render(&expected, false));

        let extracted = Extractor::default().extract(&raw, None).unwrap();

        prop_assert_eq!(extracted.value, expected);
        prop_assert!(extracted.warnings.contains(&ExtractionWarning::RecoveredEmbeddedObject));
    }

    #[test]
    fn prop_multiple_elements_are_rejected(recipes in prop::collection::vec(recipe(), 2..5)) {
        let raw = serde_json::to_string(&recipes).unwrap();

        let err = Extractor::default().extract(&raw, None).unwrap_err();

        let is_multiple = matches!(err, ExtractionError::MultipleElements { count, .. } if count == recipes.len());
        prop_assert!(is_multiple, "unexpected error: {err:?}");
    }
}

fn plan_for(count: usize) -> String {
    let specialists: Vec<Value> = (0..count)
        .map(|i| json!({"name": format!("s{i}"), "responsibilities": [format!("part {i}")]}))
        .collect();
    json!({"specialists": specialists, "complexity": "medium"}).to_string()
}

const CONTRIBUTION: &str = r#"{"contribution": "Season as you go."}"#;
const RECIPE: &str = r#"{"title": "Soup", "summary": "Warm.", "servings": 2,
    "ingredients": [{"item": "water", "quantity": "1 l"}], "steps": ["Boil."]}"#;

proptest! {
    #![proptest_config(proptest_config(Some(32)))]

    #[test]
    fn prop_fan_out_invokes_each_assignment_once(outcomes in prop::collection::vec(any::<bool>(), 1..8)) {
        let mut backend = ScriptedBackend::new()
            .reply(PLANNER_AGENT, plan_for(outcomes.len()))
            .reply(SYNTHESIZER_AGENT, RECIPE);
        for (i, succeeds) in outcomes.iter().enumerate() {
            let agent = format!("specialist:s{i}");
            backend = if *succeeds {
                backend.reply(&agent, CONTRIBUTION)
            } else {
                backend.fail(&agent, LlmError::ProviderError {
                    status: 400,
                    message: "rejected".to_string(),
                })
            };
        }
        let backend = Arc::new(backend);
        let orchestrator = Orchestrator::new(
            Config::default(),
            backend.clone(),
            Arc::new(BuiltinPrompts),
        )
        .unwrap();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let result = rt.block_on(orchestrator.run(&Brief::new("Soup", BriefScope::Dish), None));

        for i in 0..outcomes.len() {
            prop_assert_eq!(backend.calls(&format!("specialist:s{i}")), 1);
        }
        let any_success = outcomes.iter().any(|ok| *ok);
        prop_assert_eq!(result.is_ok(), any_success);
        prop_assert_eq!(backend.calls(SYNTHESIZER_AGENT), usize::from(any_success));
        prop_assert_eq!(
            backend.total_calls(),
            1 + outcomes.len() + usize::from(any_success)
        );
    }
}
