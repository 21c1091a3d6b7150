use crate::reports;
use clap::Args;
use wandforge::error::{WandError, WfResult};
use wandforge::spell::TemplateRegistry;

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Only report spells whose id contains this text
    #[arg(short = 'f', long)]
    pub filter: Option<String>,
}

pub fn run(args: &ValidateArgs, registry: &TemplateRegistry) -> WfResult<()> {
    let selected: Vec<_> = registry
        .iter()
        .filter(|s| match &args.filter {
            Some(f) => s.id().to_lowercase().contains(&f.to_lowercase()),
            None => true,
        })
        .cloned()
        .collect();

    if selected.is_empty() {
        return Err(WandError::Validation(match &args.filter {
            Some(f) => format!("no spell id matches '{}'", f),
            None => "spell library is empty".to_string(),
        }));
    }

    println!("{} spell(s) compiled", selected.len());
    reports::print_spell_table(&selected);
    Ok(())
}
