use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::sync::Arc;
use wandforge::spell::CompiledSpell;
use wandforge::types::SpellMatch;

fn right_align(table: &mut Table, cols: std::ops::RangeInclusive<usize>) {
    for i in cols {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn on_off(flag: bool) -> Cell {
    if flag {
        Cell::new("on").fg(Color::Green)
    } else {
        Cell::new("off")
    }
}

pub fn print_spell_table(spells: &[Arc<CompiledSpell>]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Spell").add_attribute(Attribute::Bold),
        Cell::new("Name"),
        Cell::new("Groups"),
        Cell::new("Steps"),
        Cell::new("Req").fg(Color::Cyan),
        Cell::new("Opt"),
        Cell::new("Dist"),
        Cell::new("Ratios"),
        Cell::new("GrpMin"),
        Cell::new("Filler"),
    ]);
    right_align(&mut table, 2..=5);

    for s in spells {
        let d = &s.definition;
        table.add_row(vec![
            Cell::new(s.id()).add_attribute(Attribute::Bold),
            Cell::new(&d.name),
            Cell::new(s.group_count()),
            Cell::new(s.step_count()),
            Cell::new(s.required_total).fg(Color::Cyan),
            Cell::new(s.optional_total),
            on_off(d.rules.check_total_distance),
            on_off(d.rules.check_distance_ratios),
            on_off(d.rules.check_group_min_steps),
            on_off(d.rules.check_filler_duration),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_match_table(matches: &[SpellMatch]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Controller").add_attribute(Attribute::Bold),
        Cell::new("Spell"),
        Cell::new("End (ms)"),
        Cell::new("Dur (s)"),
        Cell::new("Steps"),
        Cell::new("Req"),
        Cell::new("Opt"),
        Cell::new("Filler (s)"),
        Cell::new("Cnt"),
        Cell::new("Dst"),
        Cell::new("Tim"),
        Cell::new("Accuracy").fg(Color::Cyan),
    ]);
    right_align(&mut table, 2..=11);

    for m in matches {
        let acc = Cell::new(format!("{:.1}", m.accuracy));
        let acc = if m.accuracy >= 75.0 {
            acc.fg(Color::Green)
        } else if m.accuracy >= 40.0 {
            acc.fg(Color::Yellow)
        } else {
            acc.fg(Color::Red)
        };

        table.add_row(vec![
            Cell::new(&m.controller_id).add_attribute(Attribute::Bold),
            Cell::new(&m.spell_id),
            Cell::new(m.end_ts),
            Cell::new(format!("{:.2}", m.duration)),
            Cell::new(format!("{}/{}", m.used_steps, m.total_steps)),
            Cell::new(format!("{}/{}", m.required_matched, m.required_total)),
            Cell::new(format!("{}/{}", m.optional_matched, m.optional_total)),
            Cell::new(format!("{:.2}", m.filler_duration)),
            Cell::new(format!("{:.2}", m.breakdown.count)),
            Cell::new(format!("{:.2}", m.breakdown.distance)),
            Cell::new(format!("{:.2}", m.breakdown.duration)),
            acc,
        ]);
    }
    println!("\n{}", table);
}
