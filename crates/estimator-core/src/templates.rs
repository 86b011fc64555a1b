//! Built-in estimate templates.
//!
//! A template is an ordered list of line item names. Seeding an estimate from
//! one inserts a zero-valued item per name, in list order.

use serde::Serialize;

/// A named list of default line items.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Template {
    pub key: &'static str,
    pub label: &'static str,
    pub items: &'static [&'static str],
}

const BATHROOM: &[&str] = &[
    "Demolition",
    "Plumbing",
    "Electrical",
    "Drywall & Painting",
    "Tile & Flooring",
    "Fixtures",
    "Cabinetry & Vanity",
    "Shower/Tub",
    "Permits & Admin",
    "Cleanup",
];

const KITCHEN: &[&str] = &[
    "Demolition",
    "Plumbing",
    "Electrical",
    "Cabinetry",
    "Countertops",
    "Backsplash & Tile",
    "Flooring",
    "Appliances",
    "Drywall & Painting",
    "Fixtures & Hardware",
    "Permits & Admin",
    "Cleanup",
];

const REMODEL: &[&str] = &[
    "Demolition",
    "Framing & Structural",
    "Plumbing",
    "Electrical",
    "HVAC",
    "Drywall & Painting",
    "Flooring",
    "Finish Carpentry",
    "Permits & Admin",
    "Cleanup",
];

const ADDITION: &[&str] = &[
    "Site Work",
    "Foundation",
    "Framing",
    "Roofing",
    "Plumbing",
    "Electrical",
    "HVAC",
    "Insulation",
    "Drywall & Painting",
    "Flooring",
    "Finish Carpentry",
    "Permits & Admin",
    "Cleanup",
];

const NEW_CONSTRUCTION: &[&str] = &[
    "Site Work",
    "Foundation",
    "Framing",
    "Roofing",
    "Plumbing",
    "Electrical",
    "HVAC",
    "Insulation",
    "Drywall",
    "Painting",
    "Flooring",
    "Cabinetry",
    "Countertops",
    "Fixtures",
    "Finish Carpentry",
    "Landscaping",
    "Permits & Admin",
    "Cleanup",
];

const WINDOWS: &[&str] = &[
    "Window Removal & Disposal",
    "Window Supply",
    "Window Installation",
    "Interior Trim & Casing",
    "Exterior Trim & Capping",
    "Painting & Touch-Up",
    "Cleanup",
    "Permits & Admin",
];

/// Every built-in template, in display order.
pub const TEMPLATES: &[Template] = &[
    Template {
        key: "bathroom",
        label: "Bathroom",
        items: BATHROOM,
    },
    Template {
        key: "kitchen",
        label: "Kitchen",
        items: KITCHEN,
    },
    Template {
        key: "remodel",
        label: "Remodel",
        items: REMODEL,
    },
    Template {
        key: "addition",
        label: "Addition",
        items: ADDITION,
    },
    Template {
        key: "new_construction",
        label: "New Construction",
        items: NEW_CONSTRUCTION,
    },
    Template {
        key: "windows",
        label: "Windows Replacement",
        items: WINDOWS,
    },
];

/// Look up a template by key.
pub fn find(key: &str) -> Option<&'static Template> {
    let key = key.trim();
    TEMPLATES.iter().find(|t| t.key == key)
}

/// Item names for a key. Unknown keys yield an empty list.
pub fn template_items(key: &str) -> &'static [&'static str] {
    find(key).map(|t| t.items).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ProjectType;

    #[test]
    fn test_kitchen_template_order() {
        let items = template_items("kitchen");
        assert_eq!(items.len(), 12);
        assert_eq!(items[0], "Demolition");
        assert_eq!(items[11], "Cleanup");
    }

    #[test]
    fn test_unknown_key_is_empty() {
        assert!(template_items("treehouse").is_empty());
        assert!(find("").is_none());
    }

    #[test]
    fn test_project_types_map_to_templates() {
        for project_type in ProjectType::ALL {
            let expected = *project_type != ProjectType::Other;
            assert_eq!(find(project_type.as_str()).is_some(), expected);
        }
    }

    #[test]
    fn test_windows_label() {
        assert_eq!(find("windows").unwrap().label, "Windows Replacement");
    }
}
