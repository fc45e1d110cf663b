use serde::{Deserialize, Serialize};

/// Icon shown for expenses whose category cannot be found.
pub(crate) const FALLBACK_ICON: &str = "pricetag";
/// Accent color for unmatched expenses in transaction lists.
pub(crate) const FALLBACK_LIST_COLOR: &str = "#2563eb";
/// Accent color for categories stored without a color.
pub(crate) const FALLBACK_COLOR: &str = "#6b7280";
/// Category used by the entry form when none exist yet.
pub(crate) const DEFAULT_CATEGORY_NAME: &str = "Otros";

/// Colors offered by the category creator, as (name, hex).
pub(crate) const PALETTE: &[(&str, &str)] = &[
    ("Orange", "#ea580c"),
    ("Emerald", "#10b981"),
    ("Indigo", "#4f46e5"),
    ("Red", "#dc2626"),
    ("Pink", "#db2777"),
    ("Purple", "#9333ea"),
    ("Gray", "#4b5563"),
    ("Blue", "#2563eb"),
];

/// Icons offered by the category creator.
pub(crate) const ICONS: &[&str] = &[
    "fast-food",
    "cart",
    "home",
    "medical",
    "paw",
    "beer",
    "cash",
    "cafe",
    "airplane",
    "gift",
    "musical-notes",
    "book",
    "briefcase",
    "game-controller",
    "phone-portrait",
    "construct",
    "star",
    "car",
    "card",
    "checkmark",
    "fitness",
];

pub(crate) const DEFAULT_ICON: &str = "star";

const DEFAULTS: &[(&str, &str, &str)] = &[
    ("Alimentación", "#ea580c", "fast-food"),
    ("Supermercado", "#10b981", "cart"),
    ("Casa", "#4f46e5", "home"),
    ("Salud", "#dc2626", "medical"),
    ("Juno", "#172c3d", "paw"),
    ("Salidas", "#9333ea", "pizza"),
    ("Gastos fijos", "#ebcf34", "receipt"),
    ("Vacaciones", "#9bc7b5", "airplane"),
    ("Transporte", "#472247", "car"),
    ("Otros", "#4b5563", "cash"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Category {
    #[serde(skip)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "hex", default)]
    pub color: String,
    #[serde(rename = "iconName", default)]
    pub icon: String,
}

impl Category {
    pub(crate) fn new(name: String, color: String, icon: String) -> Self {
        Self {
            id: None,
            name,
            color,
            icon,
        }
    }

    /// Categories written to a fresh account on first sync.
    pub(crate) fn defaults() -> Vec<Category> {
        DEFAULTS
            .iter()
            .map(|(name, hex, icon)| Category::new(name.to_string(), hex.to_string(), icon.to_string()))
            .collect()
    }

    /// Expenses reference categories by exact name.
    pub(crate) fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        categories.iter().find(|c| c.name == name)
    }

    pub(crate) fn color_or_default(&self) -> &str {
        if self.color.is_empty() {
            FALLBACK_COLOR
        } else {
            &self.color
        }
    }

    pub(crate) fn icon_or_default(&self) -> &str {
        if self.icon.is_empty() {
            FALLBACK_ICON
        } else {
            &self.icon
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// How an expense row is decorated. Dangling category names get the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryStyle {
    pub icon: String,
    pub color: String,
    pub known: bool,
}

impl CategoryStyle {
    pub(crate) fn resolve(categories: &[Category], name: &str) -> Self {
        match Category::find_by_name(categories, name) {
            Some(cat) => Self {
                icon: cat.icon_or_default().to_string(),
                color: if cat.color.is_empty() {
                    FALLBACK_LIST_COLOR.to_string()
                } else {
                    cat.color.clone()
                },
                known: true,
            },
            None => Self {
                icon: FALLBACK_ICON.to_string(),
                color: FALLBACK_LIST_COLOR.to_string(),
                known: false,
            },
        }
    }
}
