//! Style classification and the per-category rule table.
//!
//! Classification is a first-match scan over [`PRECEDENCE`]. The order of that
//! list is the precedence policy for overlapping names: "Belgian IPA" is
//! Belgian, "Berliner Weisse" is Sour, "Hazy IPA" is a New England IPA.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleCategory {
    Sour,
    Stout,
    Lager,
    Wheat,
    Barleywine,
    Belgian,
    NeIpa,
    WestCoastIpa,
    Ipa,
    PaleAle,
    Generic,
}

impl StyleCategory {
    pub fn is_ipa(self) -> bool {
        matches!(
            self,
            StyleCategory::NeIpa | StyleCategory::WestCoastIpa | StyleCategory::Ipa
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            StyleCategory::Sour => "Sour",
            StyleCategory::Stout => "Stout / Porter",
            StyleCategory::Lager => "Lager",
            StyleCategory::Wheat => "Wheat",
            StyleCategory::Barleywine => "Barleywine / Strong Ale",
            StyleCategory::Belgian => "Belgian",
            StyleCategory::NeIpa => "New England IPA",
            StyleCategory::WestCoastIpa => "West Coast IPA",
            StyleCategory::Ipa => "IPA",
            StyleCategory::PaleAle => "Pale Ale",
            StyleCategory::Generic => "Ale",
        }
    }

    pub fn rules(self) -> &'static StyleRules {
        match self {
            StyleCategory::Sour => &SOUR,
            StyleCategory::Stout => &STOUT,
            StyleCategory::Lager => &LAGER,
            StyleCategory::Wheat => &WHEAT,
            StyleCategory::Barleywine => &BARLEYWINE,
            StyleCategory::Belgian => &BELGIAN,
            StyleCategory::NeIpa => &NEIPA,
            StyleCategory::WestCoastIpa => &WEST_COAST_IPA,
            StyleCategory::Ipa => &IPA,
            StyleCategory::PaleAle => &PALE_ALE,
            StyleCategory::Generic => &GENERIC,
        }
    }
}

/// Keyword groups in precedence order. IPA sub-variants come before the
/// plain IPA group so the more specific archetype wins.
const PRECEDENCE: &[(StyleCategory, &[&str])] = &[
    (
        StyleCategory::Sour,
        &[
            "sour", "gose", "lambic", "gueuze", "geuze", "berliner", "flanders", "wild ale",
        ],
    ),
    (StyleCategory::Stout, &["stout", "porter"]),
    // German wheat names carry lager words ("dunkelweizen", "weizenbock").
    (
        StyleCategory::Wheat,
        &["weizen", "weissbier", "weißbier", "hefe"],
    ),
    (
        StyleCategory::Lager,
        &[
            "lager",
            "pilsner",
            "pils",
            "bock",
            "helles",
            "märzen",
            "marzen",
            "dunkel",
            "schwarzbier",
            "kölsch",
            "kolsch",
        ],
    ),
    (
        StyleCategory::Wheat,
        &["wheat", "weizen", "weissbier", "weisse", "hefe", "witbier"],
    ),
    (
        StyleCategory::Barleywine,
        &["barleywine", "barley wine", "old ale"],
    ),
    (
        StyleCategory::Belgian,
        &["belgian", "saison", "tripel", "dubbel", "quad", "abbey"],
    ),
    (
        StyleCategory::NeIpa,
        &["neipa", "new england", "hazy", "juicy"],
    ),
    (StyleCategory::WestCoastIpa, &["west coast"]),
    (StyleCategory::Ipa, &["ipa", "india pale"]),
    (
        StyleCategory::PaleAle,
        &["pale", "amber", "brown", "bitter", "red ale"],
    ),
];

/// NEIPA and West Coast keywords only count when the text is an IPA at all.
fn requires_ipa(category: StyleCategory) -> bool {
    matches!(category, StyleCategory::NeIpa | StyleCategory::WestCoastIpa)
}

fn is_ipa_text(text: &str) -> bool {
    text.contains("ipa") || text.contains("india pale")
}

/// Classify lowercase style text. Never fails; unknown text is [`StyleCategory::Generic`].
pub fn classify(text: &str) -> StyleCategory {
    let text = text.to_lowercase();
    let ipa = is_ipa_text(&text);

    PRECEDENCE
        .iter()
        .find(|(category, keywords)| {
            (!requires_ipa(*category) || ipa) && keywords.iter().any(|k| text.contains(k))
        })
        .map(|(category, _)| *category)
        .unwrap_or(StyleCategory::Generic)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YeastCategory {
    CleanAle,
    EnglishAle,
    Lager,
    Hefeweizen,
    BelgianAle,
    Sour,
}

impl YeastCategory {
    pub fn dry_example(self) -> &'static str {
        match self {
            YeastCategory::CleanAle => "SafAle US-05",
            YeastCategory::EnglishAle => "SafAle S-04",
            YeastCategory::Lager => "SafLager W-34/70",
            YeastCategory::Hefeweizen => "SafAle WB-06",
            YeastCategory::BelgianAle => "SafAle BE-256",
            YeastCategory::Sour => "LalBrew WildBrew Philly Sour",
        }
    }

    pub fn liquid_example(self) -> &'static str {
        match self {
            YeastCategory::CleanAle => "WLP001 California Ale",
            YeastCategory::EnglishAle => "Wyeast 1968 London ESB",
            YeastCategory::Lager => "WLP830 German Lager",
            YeastCategory::Hefeweizen => "Wyeast 3068 Weihenstephan Weizen",
            YeastCategory::BelgianAle => "WLP530 Abbey Ale",
            YeastCategory::Sour => "Wyeast 5335 Lactobacillus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HopTechnique {
    /// Hops in the background, mostly a single bittering charge.
    Restrained,
    /// Bittering plus a modest flavor addition.
    Balanced,
    /// Hop-forward with substantial late-boil additions.
    LateHopped,
    /// Almost all hops in the last minutes of the boil, soft bitterness.
    AromaFocused,
}

impl HopTechnique {
    pub fn guidance(self) -> &'static str {
        match self {
            HopTechnique::Restrained => {
                "Keep hops in the background: one bittering addition, optionally a small flavor addition."
            }
            HopTechnique::Balanced => {
                "Use a bittering addition at 60 min and a moderate flavor addition at 10-15 min."
            }
            HopTechnique::LateHopped => {
                "Hop-forward: clean bittering at 60 min plus substantial additions in the last 10 minutes."
            }
            HopTechnique::AromaFocused => {
                "Soft bitterness: keep the 60 min charge small and place most hops in the last 5 minutes."
            }
        }
    }
}

/// Structured brewing rules for one style category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleRules {
    pub base_malts: &'static [&'static str],
    /// Upper bound on specialty malts as a share of the grist.
    pub specialty_malt_max_pct: u32,
    pub yeast: YeastCategory,
    pub ferment_temp_c: (f64, f64),
    pub ibu_range: (u32, u32),
    pub srm_range: (u32, u32),
    pub hop_technique: HopTechnique,
    /// Grams CO2 per litre.
    pub carbonation: f64,
    pub conditioning_days: (u32, u32),
    pub notes: &'static [&'static str],
}

static SOUR: StyleRules = StyleRules {
    base_malts: &["Pilsner malt", "Wheat malt"],
    specialty_malt_max_pct: 5,
    yeast: YeastCategory::Sour,
    ferment_temp_c: (18.0, 22.0),
    ibu_range: (3, 8),
    srm_range: (2, 4),
    hop_technique: HopTechnique::Restrained,
    carbonation: 5.8,
    conditioning_days: (14, 42),
    notes: &[
        "Keep IBU very low: hop acids inhibit lactic bacteria.",
        "Aim for a final pH of 3.2-3.5.",
    ],
};

static STOUT: StyleRules = StyleRules {
    base_malts: &["Maris Otter", "Pale Ale malt"],
    specialty_malt_max_pct: 25,
    yeast: YeastCategory::EnglishAle,
    ferment_temp_c: (17.0, 20.0),
    ibu_range: (25, 50),
    srm_range: (30, 45),
    hop_technique: HopTechnique::Restrained,
    carbonation: 4.2,
    conditioning_days: (14, 28),
    notes: &[
        "Roasted barley and chocolate malt carry the flavor; keep black malt small.",
        "Flaked oats add body and smoothness.",
    ],
};

static LAGER: StyleRules = StyleRules {
    base_malts: &["Pilsner malt", "Vienna malt", "Munich malt"],
    specialty_malt_max_pct: 10,
    yeast: YeastCategory::Lager,
    ferment_temp_c: (9.0, 13.0),
    ibu_range: (18, 40),
    srm_range: (2, 25),
    hop_technique: HopTechnique::Balanced,
    carbonation: 5.2,
    conditioning_days: (28, 56),
    notes: &[
        "Ferment cold and finish with a diacetyl rest at 16-18 °C.",
        "Lager near freezing for crisp clarity.",
    ],
};

static WHEAT: StyleRules = StyleRules {
    base_malts: &["Wheat malt", "Pilsner malt"],
    specialty_malt_max_pct: 5,
    yeast: YeastCategory::Hefeweizen,
    ferment_temp_c: (17.0, 22.0),
    ibu_range: (8, 15),
    srm_range: (2, 8),
    hop_technique: HopTechnique::Restrained,
    carbonation: 6.5,
    conditioning_days: (7, 14),
    notes: &[
        "Use 50-70 % wheat malt.",
        "Fermentation temperature steers the banana/clove balance.",
    ],
};

static BARLEYWINE: StyleRules = StyleRules {
    base_malts: &["Maris Otter", "Pale Ale malt"],
    specialty_malt_max_pct: 15,
    yeast: YeastCategory::EnglishAle,
    ferment_temp_c: (17.0, 20.0),
    ibu_range: (35, 80),
    srm_range: (10, 22),
    hop_technique: HopTechnique::Balanced,
    carbonation: 3.8,
    conditioning_days: (60, 180),
    notes: &[
        "High gravity: pitch generously and oxygenate well.",
        "Long conditioning rounds out the alcohol.",
    ],
};

static BELGIAN: StyleRules = StyleRules {
    base_malts: &["Pilsner malt", "Pale Ale malt"],
    specialty_malt_max_pct: 10,
    yeast: YeastCategory::BelgianAle,
    ferment_temp_c: (19.0, 26.0),
    ibu_range: (18, 40),
    srm_range: (3, 20),
    hop_technique: HopTechnique::Balanced,
    carbonation: 6.0,
    conditioning_days: (21, 42),
    notes: &[
        "Candi sugar lightens the body of stronger examples.",
        "Let the temperature free-rise to build ester character.",
    ],
};

static NEIPA: StyleRules = StyleRules {
    base_malts: &["Pale Ale malt", "Pilsner malt"],
    specialty_malt_max_pct: 30,
    yeast: YeastCategory::EnglishAle,
    ferment_temp_c: (18.0, 21.0),
    ibu_range: (25, 50),
    srm_range: (3, 6),
    hop_technique: HopTechnique::AromaFocused,
    carbonation: 4.8,
    conditioning_days: (7, 14),
    notes: &[
        "Oats and wheat make up to 30 % of the grist for haze and mouthfeel.",
        "Aim for a chloride-forward water profile.",
    ],
};

static WEST_COAST_IPA: StyleRules = StyleRules {
    base_malts: &["Pale Ale malt", "Pilsner malt"],
    specialty_malt_max_pct: 5,
    yeast: YeastCategory::CleanAle,
    ferment_temp_c: (17.0, 19.0),
    ibu_range: (50, 75),
    srm_range: (4, 8),
    hop_technique: HopTechnique::LateHopped,
    carbonation: 4.8,
    conditioning_days: (10, 21),
    notes: &[
        "Dry, crisp finish: mash low and keep crystal malt minimal.",
        "Aim for a sulfate-forward water profile.",
    ],
};

static IPA: StyleRules = StyleRules {
    base_malts: &["Pale Ale malt"],
    specialty_malt_max_pct: 10,
    yeast: YeastCategory::CleanAle,
    ferment_temp_c: (17.0, 20.0),
    ibu_range: (40, 70),
    srm_range: (6, 14),
    hop_technique: HopTechnique::LateHopped,
    carbonation: 4.8,
    conditioning_days: (10, 21),
    notes: &["A touch of crystal malt balances the bitterness."],
};

static PALE_ALE: StyleRules = StyleRules {
    base_malts: &["Pale Ale malt", "Maris Otter"],
    specialty_malt_max_pct: 15,
    yeast: YeastCategory::CleanAle,
    ferment_temp_c: (17.0, 20.0),
    ibu_range: (25, 45),
    srm_range: (5, 20),
    hop_technique: HopTechnique::Balanced,
    carbonation: 4.6,
    conditioning_days: (10, 21),
    notes: &["Crystal malts set the color from gold to brown."],
};

static GENERIC: StyleRules = StyleRules {
    base_malts: &["Pale Ale malt"],
    specialty_malt_max_pct: 15,
    yeast: YeastCategory::CleanAle,
    ferment_temp_c: (17.0, 20.0),
    ibu_range: (20, 40),
    srm_range: (4, 15),
    hop_technique: HopTechnique::Balanced,
    carbonation: 4.8,
    conditioning_days: (14, 28),
    notes: &[],
};
