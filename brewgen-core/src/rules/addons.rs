//! Add-on directives and the keywords that identify add-on ingredients.
//!
//! Every add-on flag maps to one directive-producing function in
//! [`ADD_ON_TABLE`]. A directive exists only for flags that are set; every
//! other add-on is reported as excluded so the prompt can forbid it and the
//! sanitizer can strip it.

use serde::Serialize;

use super::style::StyleCategory;
use crate::types::{AddOn, Expertise};

/// When an add-on goes in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum AddOnStage {
    Boil { minutes: u32 },
    Whirlpool { temp_c: f64, minutes: u32 },
    DryHop { day: u32 },
    Secondary,
    Packaging,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddOnDirective {
    pub add_on: AddOn,
    pub ingredient: String,
    /// Total grams for the batch, where a fixed amount applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_grams: Option<f64>,
    pub stage: AddOnStage,
    pub note: &'static str,
}

/// Inputs the directive functions draw on.
#[derive(Debug, Clone)]
pub struct AddOnContext<'a> {
    pub batch_liters: f64,
    pub category: StyleCategory,
    pub expertise: Expertise,
    pub fruit: Option<&'a str>,
}

type DirectiveFn = fn(&AddOnContext<'_>) -> AddOnDirective;

pub const ADD_ON_TABLE: [(AddOn, DirectiveFn); 8] = [
    (AddOn::Whirlpool, whirlpool),
    (AddOn::Fruit, fruit),
    (AddOn::IrishMoss, irish_moss),
    (AddOn::AscorbicAcid, ascorbic_acid),
    (AddOn::Lactose, lactose),
    (AddOn::DryHop, dry_hop),
    (AddOn::Spices, spices),
    (AddOn::Wood, wood),
];

pub const IRISH_MOSS_G_PER_L: f64 = 0.125;
pub const ASCORBIC_ACID_G_PER_L: f64 = 0.05;
pub const LACTOSE_SMALL_BATCH_G: f64 = 250.0;
pub const LACTOSE_LARGE_BATCH_G: f64 = 500.0;
pub const LACTOSE_SMALL_BATCH_MAX_L: f64 = 20.0;
pub const WHIRLPOOL_TEMP_C: f64 = 80.0;
pub const WHIRLPOOL_MINUTES: u32 = 20;
pub const FRUIT_G_PER_L: f64 = 150.0;
pub const SPICES_G_PER_L: f64 = 0.5;
pub const OAK_G_PER_L: f64 = 1.5;

/// Dry hop rate in g/L for a style, capped for beginners.
pub fn dry_hop_rate(category: StyleCategory, expertise: Expertise) -> f64 {
    let rate: f64 = match category {
        StyleCategory::NeIpa => 10.0,
        c if c.is_ipa() => 5.0,
        _ => 3.0,
    };
    if expertise == Expertise::Beginner {
        rate.min(3.0)
    } else {
        rate
    }
}

fn whirlpool(_ctx: &AddOnContext<'_>) -> AddOnDirective {
    AddOnDirective {
        add_on: AddOn::Whirlpool,
        ingredient: "aroma hops".to_string(),
        amount_grams: None,
        stage: AddOnStage::Whirlpool {
            temp_c: WHIRLPOOL_TEMP_C,
            minutes: WHIRLPOOL_MINUTES,
        },
        note: "Cool the wort before the hop stand so the oils stay in solution.",
    }
}

fn fruit(ctx: &AddOnContext<'_>) -> AddOnDirective {
    AddOnDirective {
        add_on: AddOn::Fruit,
        ingredient: ctx
            .fruit
            .map(|f| format!("{f} puree"))
            .unwrap_or_else(|| "fruit puree (choose one that suits the style)".to_string()),
        amount_grams: Some(FRUIT_G_PER_L * ctx.batch_liters),
        stage: AddOnStage::Secondary,
        note: "Add once primary fermentation has slowed.",
    }
}

fn irish_moss(ctx: &AddOnContext<'_>) -> AddOnDirective {
    AddOnDirective {
        add_on: AddOn::IrishMoss,
        ingredient: "Irish moss".to_string(),
        amount_grams: Some(IRISH_MOSS_G_PER_L * ctx.batch_liters),
        stage: AddOnStage::Boil { minutes: 15 },
        note: "Kettle fining for clearer wort.",
    }
}

fn ascorbic_acid(ctx: &AddOnContext<'_>) -> AddOnDirective {
    AddOnDirective {
        add_on: AddOn::AscorbicAcid,
        ingredient: "ascorbic acid".to_string(),
        amount_grams: Some(ASCORBIC_ACID_G_PER_L * ctx.batch_liters),
        stage: AddOnStage::Packaging,
        note: "Antioxidant against oxygen pickup at packaging.",
    }
}

fn lactose(ctx: &AddOnContext<'_>) -> AddOnDirective {
    let grams = if ctx.batch_liters <= LACTOSE_SMALL_BATCH_MAX_L {
        LACTOSE_SMALL_BATCH_G
    } else {
        LACTOSE_LARGE_BATCH_G
    };
    AddOnDirective {
        add_on: AddOn::Lactose,
        ingredient: "lactose".to_string(),
        amount_grams: Some(grams),
        stage: AddOnStage::Boil { minutes: 10 },
        note: "Unfermentable sugar for body and sweetness.",
    }
}

fn dry_hop(ctx: &AddOnContext<'_>) -> AddOnDirective {
    let day = if ctx.category == StyleCategory::NeIpa { 2 } else { 5 };
    AddOnDirective {
        add_on: AddOn::DryHop,
        ingredient: "aroma hops".to_string(),
        amount_grams: Some(dry_hop_rate(ctx.category, ctx.expertise) * ctx.batch_liters),
        stage: AddOnStage::DryHop { day },
        note: "Limit contact to 3-4 days to avoid grassy flavors.",
    }
}

fn spices(ctx: &AddOnContext<'_>) -> AddOnDirective {
    AddOnDirective {
        add_on: AddOn::Spices,
        ingredient: "spices".to_string(),
        amount_grams: Some(SPICES_G_PER_L * ctx.batch_liters),
        stage: AddOnStage::Boil { minutes: 5 },
        note: "Choose spices that suit the style and keep them subtle.",
    }
}

fn wood(ctx: &AddOnContext<'_>) -> AddOnDirective {
    AddOnDirective {
        add_on: AddOn::Wood,
        ingredient: "oak chips".to_string(),
        amount_grams: Some(OAK_G_PER_L * ctx.batch_liters),
        stage: AddOnStage::Secondary,
        note: "Taste every few days and remove once the oak is noticeable.",
    }
}

/// Directives for the allowed add-ons plus the list of excluded ones, both
/// in table order.
pub fn directives(
    allowed: impl Fn(AddOn) -> bool,
    ctx: &AddOnContext<'_>,
) -> (Vec<AddOnDirective>, Vec<AddOn>) {
    let mut included = Vec::new();
    let mut excluded = Vec::new();
    for (add_on, produce) in ADD_ON_TABLE {
        if allowed(add_on) {
            included.push(produce(ctx));
        } else {
            excluded.push(add_on);
        }
    }
    (included, excluded)
}

pub const FRUIT_NAMES: &[&str] = &[
    "raspberry",
    "raspberries",
    "strawberry",
    "strawberries",
    "cherry",
    "cherries",
    "peach",
    "apricot",
    "mango",
    "passion fruit",
    "passionfruit",
    "blueberry",
    "blueberries",
    "blackberry",
    "blackberries",
    "pineapple",
    "guava",
    "plum",
    "rhubarb",
    "cranberry",
    "cranberries",
    "boysenberry",
    "blackcurrant",
    "yuzu",
    "himbeere",
    "kirsche",
];

/// First fruit named in the text, in the order it appears.
pub fn find_fruit(text: &str) -> Option<&'static str> {
    let text = text.to_lowercase();
    FRUIT_NAMES
        .iter()
        .filter_map(|name| find_word(&text, name).map(|pos| (pos, *name)))
        .min_by_key(|(pos, name)| (*pos, std::cmp::Reverse(name.len())))
        .map(|(_, name)| name)
}

/// Words that identify an add-on on their own, wherever they appear.
fn technique_keywords(add_on: AddOn) -> &'static [&'static str] {
    match add_on {
        AddOn::Whirlpool => &[
            "whirlpool",
            "hop stand",
            "hopstand",
            "hop-stand",
        ],
        AddOn::Fruit => &["fruit", "puree", "purée"],
        AddOn::IrishMoss => &["irish moss", "whirlfloc", "protafloc", "carrageenan"],
        AddOn::AscorbicAcid => &["ascorbic", "vitamin c"],
        AddOn::Lactose => &["lactose", "milk sugar", "milchzucker"],
        AddOn::DryHop => &[
            "dry hop",
            "dry-hop",
            "dryhop",
            "dry hopped",
            "dry-hopped",
            "dry hopping",
            "dry-hopping",
            "hopfenstopfen",
            "kalthopfung",
        ],
        AddOn::Spices => &["spices", "spice addition"],
        AddOn::Wood => &["oak", "wood", "barrel", "eiche"],
    }
}

/// Ingredient names that belong to an add-on. These are matched against
/// ingredient names directly but need addition context in free text, since
/// tasting notes mention them too ("clove-like phenols").
fn ingredient_keywords(add_on: AddOn) -> &'static [&'static str] {
    match add_on {
        AddOn::Fruit => FRUIT_NAMES,
        AddOn::Spices => &[
            "coriander",
            "cinnamon",
            "nutmeg",
            "clove",
            "ginger",
            "cardamom",
            "vanilla",
            "star anise",
            "peppercorn",
            "orange peel",
            "lemon peel",
            "chili",
        ],
        _ => &[],
    }
}

const ADDITION_WORDS: &[&str] = &[
    "add",
    "added",
    "adding",
    "stir in",
    "stirred in",
    "steep",
    "steeped",
    "soak",
    "soaked",
    "zugabe",
    "zugeben",
];

/// Position of `word` in lowercase `text` as a whole word. A plural "s" or
/// "es" may follow, so "fruits" matches "fruit" but "fruity" does not.
fn find_word(text: &str, word: &str) -> Option<usize> {
    let boundary = |rest: &str| rest.chars().next().map_or(true, |c| !c.is_alphanumeric());
    text.match_indices(word).map(|(pos, _)| pos).find(|&pos| {
        let starts_word = text[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let rest = &text[pos + word.len()..];
        starts_word
            && (boundary(rest)
                || rest.strip_prefix('s').is_some_and(boundary)
                || rest.strip_prefix("es").is_some_and(boundary))
    })
}

pub(crate) fn contains_word(text: &str, word: &str) -> bool {
    find_word(text, word).is_some()
}

/// Does an ingredient name or time label belong to this add-on?
pub fn names_add_on(add_on: AddOn, text: &str) -> bool {
    let text = text.to_lowercase();
    technique_keywords(add_on)
        .iter()
        .chain(ingredient_keywords(add_on))
        .any(|k| contains_word(&text, k))
}

/// Does a free-text instruction introduce this add-on?
pub fn instructs_add_on(add_on: AddOn, text: &str) -> bool {
    let text = text.to_lowercase();
    if technique_keywords(add_on).iter().any(|k| contains_word(&text, k)) {
        return true;
    }
    ingredient_keywords(add_on).iter().any(|k| contains_word(&text, k))
        && ADDITION_WORDS.iter().any(|w| contains_word(&text, w))
}
