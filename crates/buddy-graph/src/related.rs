//! Related product category extraction

use buddy_ai::ToolSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tool the model calls with the three related categories
pub const GET_RELATED_PRODUCTS_TOOL: &str = "get_related_products";

/// System instruction for the related-category model call
pub const RELATED_TEMPLATE: &str = "
Task: Provide Product Categories Based on Customer Preferences

Your objective is to extract three product categories based on the provided product preference data.

Instructions:

Review the recommended product preference carefully.
Identify the three most relevant product categories.
Include the associated accessories that align with product preference category.
Output Format:

Product Category: Specify the type of electronic product the related accessories belong to.
Please ensure your categories are well-defined and directly related to the preferences given.
";

/// Schema for the `get_related_products` tool
pub fn get_related_products_schema() -> ToolSchema {
    ToolSchema::new(
        GET_RELATED_PRODUCTS_TOOL,
        "Record three product categories related to the recommended product",
        serde_json::json!({
            "type": "object",
            "properties": {
                "product_category_1": {
                    "type": "string",
                    "description": "Most relevant related product category"
                },
                "product_category_2": {
                    "type": "string",
                    "description": "Second related product category"
                },
                "product_category_3": {
                    "type": "string",
                    "description": "Third related product category"
                }
            },
            "required": ["product_category_1", "product_category_2", "product_category_3"]
        }),
    )
}

/// Three related category names, in relevance order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedPreference {
    pub product_category_1: String,
    pub product_category_2: String,
    pub product_category_3: String,
}

impl RelatedPreference {
    /// The categories as labeled lines, in declared order.
    ///
    /// These lines are the queries fed to the related searches.
    pub fn to_list(&self) -> Vec<String> {
        vec![
            format!("Product Category 1: {}", self.product_category_1),
            format!("Product Category 2: {}", self.product_category_2),
            format!("Product Category 3: {}", self.product_category_3),
        ]
    }
}

/// Parse `get_related_products` tool-call arguments; all three categories
/// are required
pub fn parse_related_preference(args: &serde_json::Value) -> Result<RelatedPreference> {
    Ok(RelatedPreference {
        product_category_1: required_field(args, "product_category_1")?,
        product_category_2: required_field(args, "product_category_2")?,
        product_category_3: required_field(args, "product_category_3")?,
    })
}

fn required_field(args: &serde_json::Value, key: &'static str) -> Result<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or(Error::MalformedToolCall {
            tool: GET_RELATED_PRODUCTS_TOOL,
            missing: key,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_list_order() {
        let preference = RelatedPreference {
            product_category_1: "mouse".to_string(),
            product_category_2: "keyboard".to_string(),
            product_category_3: "monitor".to_string(),
        };
        assert_eq!(
            preference.to_list(),
            vec![
                "Product Category 1: mouse",
                "Product Category 2: keyboard",
                "Product Category 3: monitor",
            ]
        );
    }

    #[test]
    fn test_parse_full_arguments() {
        let args = json!({
            "product_category_1": "mouse",
            "product_category_2": "keyboard",
            "product_category_3": "monitor"
        });
        let preference = parse_related_preference(&args).unwrap();
        assert_eq!(preference.product_category_1, "mouse");
        assert_eq!(preference.product_category_3, "monitor");
    }

    #[test]
    fn test_parse_missing_category_is_malformed() {
        let args = json!({
            "product_category_1": "mouse",
            "product_category_3": "monitor"
        });
        match parse_related_preference(&args) {
            Err(Error::MalformedToolCall { tool, missing }) => {
                assert_eq!(tool, GET_RELATED_PRODUCTS_TOOL);
                assert_eq!(missing, "product_category_2");
            }
            other => panic!("expected MalformedToolCall, got {other:?}"),
        }
    }
}
