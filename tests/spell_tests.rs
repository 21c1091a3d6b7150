use rstest::rstest;
use std::io::Write;
use std::sync::Arc;
use wandforge::error::WandError;
use wandforge::spell::{SpellCompiler, SpellDefinition, SpellStep, SpellStepGroup, TemplateRegistry};
use wandforge::types::Direction;

mod common;
use common::{compile, step, three_step_def};

fn group(name: &str, steps: Vec<SpellStep>) -> SpellStepGroup {
    SpellStepGroup::builder().name(name).steps(steps).build()
}

fn spell(groups: Vec<SpellStepGroup>) -> SpellDefinition {
    SpellDefinition::builder()
        .id("test")
        .name("Test")
        .groups(groups)
        .build()
}

fn reason_of(def: SpellDefinition) -> String {
    match SpellCompiler::compile(Arc::new(def)) {
        Err(WandError::InvalidSpell { reason, .. }) => reason,
        Err(e) => panic!("Unexpected error kind: {}", e),
        Ok(_) => panic!("Spell should have been rejected"),
    }
}

#[test]
fn test_compile_flattens_newest_first() {
    println!("\n=== TEST: Compiled Layout ===");
    let compiled = compile(spell(vec![
        group("a", vec![step(Direction::North), step(Direction::NorthEast)]),
        group(
            "b",
            vec![
                SpellStep::pause(0.1),
                SpellStep::optional(&[Direction::East], 0.0),
                step(Direction::South),
            ],
        ),
    ]));

    let dirs: Vec<Direction> = compiled.steps_rev.iter().map(|s| s.directions[0]).collect();
    println!("  -> Reversed steps: {:?}", dirs);
    assert_eq!(
        dirs,
        vec![
            Direction::South,
            Direction::East,
            Direction::Idle,
            Direction::NorthEast,
            Direction::North
        ]
    );
    assert_eq!(compiled.step_to_group_rev, vec![1, 1, 1, 0, 0]);
    assert_eq!(compiled.group_names, vec!["a".to_string(), "b".to_string()]);

    assert_eq!(compiled.step_count(), 5);
    assert_eq!(compiled.scorable_total, 4);
    assert_eq!(compiled.required_total, 3);
    assert_eq!(compiled.optional_total, 1);
    assert_eq!(compiled.scorable_total, compiled.required_total + compiled.optional_total);
}

#[test]
fn test_compile_rejects_empty_group_without_override() {
    let reason = reason_of(spell(vec![
        group("a", vec![step(Direction::North)]),
        group("hollow", vec![]),
    ]));
    assert!(reason.contains("hollow"), "reason was: {}", reason);
}

#[test]
fn test_compile_accepts_empty_group_with_zero_override() {
    let hollow = SpellStepGroup::builder()
        .name("hollow")
        .steps(vec![])
        .min_steps(0)
        .build();
    let compiled = compile(spell(vec![group("a", vec![step(Direction::North)]), hollow]));
    assert_eq!(compiled.group_count(), 2);
}

#[test]
fn test_compile_rejects_pause_only_spell() {
    let reason = reason_of(spell(vec![group("rest", vec![SpellStep::pause(0.2)])]));
    assert!(reason.contains("required"), "reason was: {}", reason);
}

#[test]
fn test_compile_rejects_optional_only_spell() {
    let reason = reason_of(spell(vec![group(
        "maybe",
        vec![SpellStep::optional(&[Direction::West], 0.0)],
    )]));
    assert!(reason.contains("required"), "reason was: {}", reason);
}

#[rstest]
#[case::ratio_above_one(Some(1.5), None, "relative_distance")]
#[case::negative_ratio(None, Some(-0.1), "relative_duration")]
fn test_compile_rejects_bad_ratios(
    #[case] distance: Option<f32>,
    #[case] duration: Option<f32>,
    #[case] needle: &str,
) {
    let mut g = group("a", vec![step(Direction::North)]);
    g.relative_distance = distance;
    g.relative_duration = duration;
    let reason = reason_of(spell(vec![g]));
    assert!(reason.contains(needle), "reason was: {}", reason);
}

#[test]
fn test_compile_rejects_inverted_bounds() {
    let mut s = SpellStep::required(&[Direction::North], 0.5);
    s.max_duration = Some(0.2);
    assert!(reason_of(spell(vec![group("a", vec![s])])).contains("max_duration"));

    let mut def = spell(vec![group("a", vec![step(Direction::North)])]);
    def.min_total_duration = Some(3.0);
    def.max_total_duration = Some(1.0);
    assert!(reason_of(def).contains("min_total_duration"));
}

#[test]
fn test_compile_rejects_min_steps_above_scorable() {
    let g = SpellStepGroup::builder()
        .name("greedy")
        .steps(vec![step(Direction::North), SpellStep::pause(0.1)])
        .min_steps(2)
        .build();
    assert!(reason_of(spell(vec![g])).contains("greedy"));
}

#[rstest]
#[case::above_step_count(4, false)]
#[case::far_above(10, false)]
#[case::equal_to_step_count(3, true)]
fn test_compile_checks_min_total_steps(#[case] min_total_steps: usize, #[case] compiles: bool) {
    let mut def = three_step_def(1.0);
    def.min_total_steps = min_total_steps;
    let result = SpellCompiler::compile(Arc::new(def));
    assert_eq!(result.is_ok(), compiles, "min_total_steps {}", min_total_steps);
    if let Err(WandError::InvalidSpell { reason, .. }) = result {
        assert!(reason.contains("min_total_steps"), "reason was: {}", reason);
    }
}

#[test]
fn test_compile_min_total_steps_ignores_pauses() {
    let mut def = spell(vec![group(
        "a",
        vec![step(Direction::East), SpellStep::pause(0.2), step(Direction::West)],
    )]);
    def.min_total_steps = 3;
    let reason = reason_of(def);
    assert!(reason.contains("2 scorable"), "reason was: {}", reason);
}

#[test]
fn test_compile_rejects_step_without_directions() {
    let s = SpellStep::builder().directions(vec![]).build();
    assert!(reason_of(spell(vec![group("a", vec![s])])).contains("no directions"));
}

#[test]
fn test_step_acceptance() {
    let s = SpellStep::builder()
        .directions(vec![Direction::North, Direction::NorthEast])
        .min_duration(0.1)
        .max_duration(0.5)
        .build();
    assert!(s.fits_duration(0.1));
    assert!(s.fits_duration(0.5));
    assert!(!s.fits_duration(0.05));
    assert!(!s.fits_duration(0.6));
    assert_eq!(s.adjacency(Direction::East), Some(1));
    assert_eq!(s.adjacency(Direction::NorthWest), Some(1));
    assert_eq!(s.adjacency(Direction::SouthWest), Some(3));
    assert_eq!(s.adjacency(Direction::Idle), None);
}

// --- REGISTRY ---

#[test]
fn test_registry_rejects_duplicates() {
    let result = TemplateRegistry::from_definitions(vec![three_step_def(1.0), three_step_def(2.0)]);
    match result {
        Err(WandError::DuplicateSpell(id)) => assert_eq!(id, "arc"),
        other => panic!("Expected duplicate error, got {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn test_registry_lookup() {
    let reg = TemplateRegistry::from_definitions(vec![three_step_def(1.0)]).unwrap();
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.ids(), vec!["arc"]);
    assert!(reg.get("arc").is_some());
    assert!(reg.compiled("arc").is_some());
    assert!(matches!(reg.require("nope"), Err(WandError::UnknownSpell(_))));
}

#[test]
fn test_registry_loads_json_library() {
    println!("\n=== TEST: Spell Library JSON ===");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "spells": [{{
                "id": "ward",
                "name": "Ward",
                "groups": [{{
                    "name": "open",
                    "steps": [
                        {{ "directions": ["east"], "min_duration": 0.15 }},
                        {{ "directions": ["idle"], "is_pause": true }},
                        {{ "directions": ["west", "north_west"], "required": false }}
                    ],
                    "relative_distance": 1.0
                }}],
                "pre_pause": 0.2,
                "rules": {{ "check_distance_ratios": true }}
            }}]
        }}"#
    )
    .unwrap();

    let reg = TemplateRegistry::load_from_file(file.path()).unwrap();
    let ward = reg.compiled("ward").expect("ward should load");
    let def = &ward.definition;

    assert_eq!(ward.required_total, 1);
    assert_eq!(ward.optional_total, 1);
    assert_eq!(def.pre_pause, Some(0.2));
    assert_eq!(def.max_idle_gap, 1.0);
    assert_eq!(def.distance_tolerance, 0.15);
    assert!(def.rules.check_distance_ratios);
    assert!(def.rules.check_filler_duration, "Filler ceiling defaults on");
    assert!(!def.rules.check_total_distance);
    assert_eq!(
        def.groups[0].steps[2].directions,
        vec![Direction::West, Direction::NorthWest]
    );
}

#[test]
fn test_registry_reports_invalid_json_spell() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "spells": [{{ "id": "bad", "name": "Bad", "groups": [] }}] }}"#
    )
    .unwrap();

    let err = TemplateRegistry::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, WandError::InvalidSpell { ref spell_id, .. } if spell_id == "bad"));
}

#[test]
fn test_bundled_library_compiles() {
    let reg = TemplateRegistry::load_from_file("data/spells.json").expect("bundled spells");
    assert!(reg.len() >= 3);
    for compiled in reg.iter() {
        assert!(compiled.required_total > 0, "{} has no required steps", compiled.id());
    }
}
