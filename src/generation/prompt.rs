use crate::oracle::types::{Product, ViewerProfile};

/// Substitute `{company, product_name, product_category, summary_before,
/// summary_after, user_interests, user_demographics, content_type,
/// content_genre, clip_duration}` into the configured template. Absent
/// fields substitute a neutral default, mirroring the source's
/// `product_info.get(..., default)` fallbacks.
pub fn build_prompt(
    template: &str,
    product: &Product,
    summary_before: &str,
    summary_after: &str,
    profile: &ViewerProfile,
    content_type: &str,
    content_genre: &str,
    clip_duration: f64,
) -> String {
    let interests = if profile.interests.is_empty() {
        "general audience".to_string()
    } else {
        profile.interests.join(", ")
    };
    let demographics = serde_json::to_string(&profile.demographics).unwrap_or_default();

    template
        .replace("{company}", &product.company)
        .replace("{product_name}", &product.product)
        .replace("{product_category}", &product.category)
        .replace(
            "{summary_before}",
            if summary_before.is_empty() { "Scene in progress." } else { summary_before },
        )
        .replace(
            "{summary_after}",
            if summary_after.is_empty() { "Scene continues." } else { summary_after },
        )
        .replace("{user_interests}", &interests)
        .replace("{user_demographics}", &demographics)
        .replace("{content_type}", content_type)
        .replace("{content_genre}", content_genre)
        .replace("{clip_duration}", &format!("{clip_duration:.1}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_all_placeholders() {
        let template = "{product_name} by {company} ({product_category}) for {clip_duration}s. \
                         {summary_before} {summary_after} Interests: {user_interests}. Demo: {user_demographics}. \
                         {content_type}/{content_genre}";
        let product = Product {
            company: "Tesla".to_string(),
            product: "Model 3".to_string(),
            category: "automotive".to_string(),
        };
        let profile = ViewerProfile {
            interests: vec!["tech".to_string(), "cars".to_string()],
            ..Default::default()
        };
        let out = build_prompt(template, &product, "before", "after", &profile, "TV Show", "Comedy", 20.0);
        assert!(out.contains("Model 3 by Tesla (automotive)"));
        assert!(out.contains("20.0s"));
        assert!(out.contains("tech, cars"));
        assert!(out.contains("TV Show/Comedy"));
    }

    #[test]
    fn falls_back_to_neutral_defaults_for_empty_summaries() {
        let template = "{summary_before} {summary_after}";
        let product = Product {
            company: "X".to_string(),
            product: "Y".to_string(),
            category: "Z".to_string(),
        };
        let profile = ViewerProfile::default();
        let out = build_prompt(template, &product, "", "", &profile, "Movie", "Drama", 10.0);
        assert_eq!(out, "Scene in progress. Scene continues.");
    }
}
