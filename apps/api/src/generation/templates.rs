//! Content templates: predefined prompt wrappers selectable before generation.
//!
//! Resolution happens once, up front. Everything downstream only ever sees the
//! resolved prompt.

use serde::Serialize;

/// The single substitution point in every template.
pub const PROMPT_PLACEHOLDER: &str = "{{prompt}}";
/// Template id meaning "use the raw prompt".
pub const NO_TEMPLATE: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemplateCategory {
    #[serde(rename = "General")]
    General,
    #[serde(rename = "Marketing & Sales")]
    MarketingAndSales,
    #[serde(rename = "Community & Engagement")]
    CommunityAndEngagement,
}

impl TemplateCategory {
    pub const ALL: [TemplateCategory; 3] = [
        TemplateCategory::General,
        TemplateCategory::MarketingAndSales,
        TemplateCategory::CommunityAndEngagement,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentTemplate {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(skip)]
    pub category: TemplateCategory,
    pub content: &'static str,
}

pub static CATALOG: &[ContentTemplate] = &[
    ContentTemplate {
        id: NO_TEMPLATE,
        name: "No Template",
        category: TemplateCategory::General,
        content: "{{prompt}}",
    },
    ContentTemplate {
        id: "question",
        name: "Engaging Question",
        category: TemplateCategory::General,
        content: "Based on the idea \"{{prompt}}\", formulate an engaging question for the audience to spark discussion.",
    },
    ContentTemplate {
        id: "bts",
        name: "Behind the Scenes",
        category: TemplateCategory::General,
        content: "Provide a \"behind-the-scenes\" look related to \"{{prompt}}\". The tone should be authentic and give a sense of exclusivity.",
    },
    ContentTemplate {
        id: "holiday",
        name: "Holiday Greeting",
        category: TemplateCategory::General,
        content: "Craft a warm holiday greeting related to \"{{prompt}}\". Mention the specific holiday if relevant, otherwise keep it general.",
    },
    ContentTemplate {
        id: "product-launch",
        name: "Product Launch",
        category: TemplateCategory::MarketingAndSales,
        content: "Announce the launch of a new product: \"{{prompt}}\". Focus on the main benefits, the problem it solves, and include a clear call-to-action.",
    },
    ContentTemplate {
        id: "promo",
        name: "Special Promotion",
        category: TemplateCategory::MarketingAndSales,
        content: "Create a post for a special promotion about \"{{prompt}}\". Emphasize the value, scarcity, and a clear expiration date to create urgency.",
    },
    ContentTemplate {
        id: "testimonial",
        name: "Customer Testimonial",
        category: TemplateCategory::MarketingAndSales,
        content: "Write a post highlighting a customer testimonial. The core message of the testimonial is: \"{{prompt}}\". Frame it to build social proof and trust.",
    },
    ContentTemplate {
        id: "tip",
        name: "Tip or Trick",
        category: TemplateCategory::CommunityAndEngagement,
        content: "Share a helpful tip or trick about \"{{prompt}}\". The content should be valuable, actionable, and easy to understand.",
    },
    ContentTemplate {
        id: "myth",
        name: "Myth Busting",
        category: TemplateCategory::CommunityAndEngagement,
        content: "Bust a common myth related to \"{{prompt}}\". Present the myth first, then reveal the truth with a clear explanation.",
    },
];

pub fn find_template(id: &str) -> Option<&'static ContentTemplate> {
    CATALOG.iter().find(|t| t.id == id)
}

/// Templates belonging to one category, in catalog order.
pub fn templates_in(category: TemplateCategory) -> impl Iterator<Item = &'static ContentTemplate> {
    CATALOG.iter().filter(move |t| t.category == category)
}

/// Substitutes the raw prompt into the chosen template.
///
/// Single substitution, no escaping, no recursive expansion. `none`, a missing
/// id, or an unknown id all return the raw prompt unchanged.
pub fn resolve_prompt(raw_prompt: &str, template_id: Option<&str>) -> String {
    match template_id
        .filter(|id| *id != NO_TEMPLATE)
        .and_then(find_template)
    {
        Some(template) => template.content.replacen(PROMPT_PLACEHOLDER, raw_prompt, 1),
        None => raw_prompt.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        let raw = "  eco sneakers {{prompt}} \"quoted\"  ";
        assert_eq!(resolve_prompt(raw, Some(NO_TEMPLATE)), raw);
        assert_eq!(resolve_prompt(raw, None), raw);
    }

    #[test]
    fn test_unknown_template_is_identity() {
        assert_eq!(resolve_prompt("eco sneakers", Some("does-not-exist")), "eco sneakers");
    }

    #[test]
    fn test_product_launch_substitution() {
        assert_eq!(
            resolve_prompt("eco sneakers", Some("product-launch")),
            "Announce the launch of a new product: \"eco sneakers\". Focus on the main benefits, \
             the problem it solves, and include a clear call-to-action."
        );
    }

    #[test]
    fn test_placeholder_in_prompt_is_not_expanded_again() {
        let resolved = resolve_prompt("{{prompt}}", Some("tip"));
        assert_eq!(resolved.matches(PROMPT_PLACEHOLDER).count(), 1);
        assert!(resolved.starts_with("Share a helpful tip or trick about \"{{prompt}}\""));
    }

    #[test]
    fn test_every_template_has_exactly_one_placeholder() {
        for template in CATALOG {
            assert_eq!(
                template.content.matches(PROMPT_PLACEHOLDER).count(),
                1,
                "template {} must have one placeholder",
                template.id
            );
        }
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        for template in CATALOG {
            assert_eq!(CATALOG.iter().filter(|t| t.id == template.id).count(), 1);
        }
    }

    #[test]
    fn test_category_grouping() {
        let general: Vec<_> = templates_in(TemplateCategory::General).map(|t| t.id).collect();
        assert_eq!(general, vec!["none", "question", "bts", "holiday"]);
        assert_eq!(templates_in(TemplateCategory::MarketingAndSales).count(), 3);
        assert_eq!(templates_in(TemplateCategory::CommunityAndEngagement).count(), 2);
    }
}
