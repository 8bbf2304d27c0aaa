use std::collections::HashSet;

use crate::decimal::Rate;

/// share of the name's tokens found in the description
///
/// Tokens are lowercase alphanumeric runs. A description containing the whole
/// normalized name scores one regardless of token boundaries.
pub fn name_similarity(name: &str, description: &str) -> Rate {
    let name_tokens = tokens(name);
    if name_tokens.is_empty() {
        return Rate::ZERO;
    }

    let normalized_name = name_tokens.join(" ");
    let description_tokens = tokens(description);
    if description_tokens.join(" ").contains(&normalized_name) {
        return Rate::ONE;
    }

    let description_set: HashSet<&str> = description_tokens.iter().map(String::as_str).collect();
    let unique_name: HashSet<&str> = name_tokens.iter().map(String::as_str).collect();
    let hits = unique_name
        .iter()
        .filter(|token| description_set.contains(*token))
        .count();

    Rate::from_ratio(hits, unique_name.len())
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
