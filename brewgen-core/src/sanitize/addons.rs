//! Strip every trace of add-ons the brewer did not ask for.

use super::SanitizeReport;
use crate::rules::addons::{instructs_add_on, names_add_on};
use crate::types::{AddOn, Extra, ExtraType, Recipe, ShoppingItem};

fn extra_belongs_to(add_on: AddOn, extra: &Extra) -> bool {
    let by_kind = match add_on {
        AddOn::Fruit => extra.kind == ExtraType::Fruit,
        AddOn::Spices => extra.kind == ExtraType::Spice,
        _ => false,
    };
    by_kind
        || names_add_on(add_on, &extra.name)
        || (matches!(add_on, AddOn::DryHop | AddOn::Whirlpool)
            && (names_add_on(add_on, &extra.usage) || names_add_on(add_on, &extra.time)))
}

fn shopping_name(item: &ShoppingItem) -> &str {
    match item {
        ShoppingItem::Text(text) => text,
        ShoppingItem::Item { name, .. } => name,
    }
}

/// Remove entries of excluded add-ons from every section that can carry them.
pub fn enforce_add_ons(recipe: &mut Recipe, excluded: &[AddOn], report: &mut SanitizeReport) {
    for &add_on in excluded {
        let before = recipe.hops.len()
            + recipe.extras.len()
            + recipe.fermentation_schedule.len()
            + recipe.fermentation_instructions.len()
            + recipe.shopping_list.len();

        recipe
            .hops
            .retain(|h| !(names_add_on(add_on, &h.name) || names_add_on(add_on, &h.time)));
        recipe.extras.retain(|e| !extra_belongs_to(add_on, e));
        recipe
            .fermentation_schedule
            .retain(|s| !instructs_add_on(add_on, &format!("{} {}", s.step, s.description)));
        recipe
            .fermentation_instructions
            .retain(|text| !instructs_add_on(add_on, text));
        recipe
            .shopping_list
            .retain(|item| !names_add_on(add_on, shopping_name(item)));

        let after = recipe.hops.len()
            + recipe.extras.len()
            + recipe.fermentation_schedule.len()
            + recipe.fermentation_instructions.len()
            + recipe.shopping_list.len();
        if before > after {
            tracing::debug!(add_on = ?add_on, removed = before - after, "Removed unrequested add-on");
            report.add_on_entries_removed += before - after;
        }
    }
}
