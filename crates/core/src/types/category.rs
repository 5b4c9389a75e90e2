//! Product and store categories.

use serde::Serialize;

/// A browsable category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Slug sent as the `category` query parameter.
    pub slug: &'static str,
    /// Display name.
    pub name: &'static str,
}

impl Category {
    /// The pseudo-category that disables category filtering.
    pub const ALL: &'static str = "all";
}

/// Categories offered by the marketplace, in menu order.
pub const CATEGORIES: &[Category] = &[
    Category { slug: "all", name: "All" },
    Category { slug: "mens_clothes", name: "Men Clothes" },
    Category { slug: "ladies_clothes", name: "Ladies Clothes" },
    Category { slug: "kids_clothes", name: "Kids Clothes" },
    Category { slug: "beauty", name: "Beauty" },
    Category { slug: "body_accessories", name: "Body Accessories" },
    Category { slug: "clothing_extras", name: "Clothing Extras" },
    Category { slug: "bags", name: "Bags" },
    Category { slug: "wigs", name: "Wigs" },
    Category { slug: "body_scents", name: "Body Scents" },
];

/// Turn a category slug into a readable label.
///
/// ```
/// use covu_core::humanize_category;
///
/// assert_eq!(humanize_category("mens_clothes"), "Men's Clothes");
/// assert_eq!(humanize_category("ladies_clothes"), "Women Clothes");
/// assert_eq!(humanize_category("body_scents"), "Body Scents");
/// ```
#[must_use]
pub fn humanize_category(slug: &str) -> String {
    slug.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| match word {
            "mens" => "Men's".to_owned(),
            "ladies" => "Women".to_owned(),
            "kids" => "Kids'".to_owned(),
            "womens" => "Women's".to_owned(),
            other => {
                let mut chars = other.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
