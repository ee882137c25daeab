use serde::Serialize;

/// Professions offered in the panel, grouped by category.
const PROFESSIONS_BY_CATEGORY: &[(&str, &[&str])] = &[
    (
        "Arts & Creative",
        &[
            "Writer",
            "Painter",
            "Musician",
            "Cartographer",
            "Glassblower",
            "Lacemaker",
            "Perfumier",
        ],
    ),
    (
        "Academic & Exploration",
        &["Scholar", "Traveler", "Alchemist", "Docter"],
    ),
    (
        "Services & Maintenance",
        &[
            "Lamplighter",
            "Water Carrier",
            "Chimney Sweep",
            "Telegraph Operator",
            "Ice Cutter",
            "Ragpicker",
        ],
    ),
    (
        "Manufacturing & Production",
        &[
            "Blacksmith",
            "Silversmith",
            "Shoemaker",
            "Saddler",
            "Carpenter",
            "Tanner",
            "Oyster Shucker",
            "Baker",
        ],
    ),
    ("Agriculture & Nature", &["Farmer", "Gardener", "Miner"]),
    ("Clothing & Fashion", &["Tailor", "Haberdasher"]),
    ("Royalty & Power", &["King", "Queen", "Emperor"]),
];

/// Entry of a select input.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SelectOption {
    pub index: usize,
    pub value: String,
    pub label: String,
}

impl SelectOption {
    fn new(index: usize, text: &str) -> Self {
        Self {
            index,
            value: text.to_string(),
            label: text.to_string(),
        }
    }
}

/// Read-only lookup from profession category to its ordered job names.
#[derive(Debug, Clone, Copy)]
pub struct CategoryJobIndex {
    table: &'static [(&'static str, &'static [&'static str])],
}

impl Default for CategoryJobIndex {
    fn default() -> Self {
        Self {
            table: PROFESSIONS_BY_CATEGORY,
        }
    }
}

impl CategoryJobIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories(&self) -> Vec<SelectOption> {
        self.table
            .iter()
            .enumerate()
            .map(|(index, (category, _))| SelectOption::new(index, category))
            .collect()
    }

    /// Jobs of `category`, or an empty list when the category is unknown.
    pub fn jobs_for(&self, category: &str) -> Vec<SelectOption> {
        self.table
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, jobs)| {
                jobs.iter()
                    .enumerate()
                    .map(|(index, job)| SelectOption::new(index, job))
                    .collect()
            })
            .unwrap_or_default()
    }
}
