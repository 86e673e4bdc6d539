//! Name normalization and nickname equivalence.

use crate::lexicon::is_honorific;

/// Nickname → formal given name. Lookups are lower-case.
const NICKNAMES: &[(&str, &str)] = &[
    ("bob", "robert"),
    ("bobby", "robert"),
    ("rob", "robert"),
    ("robbie", "robert"),
    ("bill", "william"),
    ("billy", "william"),
    ("will", "william"),
    ("willie", "william"),
    ("jim", "james"),
    ("jimmy", "james"),
    ("jamie", "james"),
    ("mike", "michael"),
    ("mick", "michael"),
    ("mikey", "michael"),
    ("dave", "david"),
    ("davy", "david"),
    ("steve", "stephen"),
    ("tom", "thomas"),
    ("tommy", "thomas"),
    ("chris", "christopher"),
    ("dan", "daniel"),
    ("danny", "daniel"),
    ("nick", "nicholas"),
    ("tony", "anthony"),
    ("andy", "andrew"),
    ("drew", "andrew"),
    ("rich", "richard"),
    ("rick", "richard"),
    ("ricky", "richard"),
    ("dick", "richard"),
    ("joe", "joseph"),
    ("joey", "joseph"),
    ("ben", "benjamin"),
    ("sam", "samuel"),
    ("matt", "matthew"),
    ("pete", "peter"),
    ("alex", "alexander"),
    ("ed", "edward"),
    ("eddie", "edward"),
    ("ted", "edward"),
    ("kate", "katherine"),
    ("katie", "katherine"),
    ("kathy", "katherine"),
    ("liz", "elizabeth"),
    ("lizzie", "elizabeth"),
    ("beth", "elizabeth"),
    ("jen", "jennifer"),
    ("jenny", "jennifer"),
    ("sue", "susan"),
    ("maggie", "margaret"),
    ("meg", "margaret"),
    ("pat", "patrick"),
    ("tim", "timothy"),
    ("greg", "gregory"),
    ("jon", "john"),
    ("johnny", "john"),
    ("jack", "john"),
    ("gaz", "gary"),
    ("jeff", "jeffrey"),
    ("ken", "kenneth"),
    ("kenny", "kenneth"),
    ("ron", "ronald"),
    ("don", "donald"),
    ("phil", "philip"),
    ("charlie", "charles"),
    ("harry", "henry"),
    ("fred", "frederick"),
    ("freddie", "frederick"),
    ("stu", "stuart"),
    ("vicky", "victoria"),
];

/// Formal form of a given name (`"Bob"` → `"robert"`), lower-cased.
pub fn canonical_given_name(given: &str) -> String {
    let lower = given.to_lowercase();
    NICKNAMES
        .iter()
        .find(|(nick, _)| *nick == lower)
        .map(|(_, formal)| formal.to_string())
        .unwrap_or(lower)
}

/// Every lower-case spelling equivalent to `given`, itself included.
pub fn given_name_variants(given: &str) -> Vec<String> {
    let formal = canonical_given_name(given);
    let mut variants = vec![formal.clone()];
    for (nick, f) in NICKNAMES {
        if *f == formal {
            variants.push(nick.to_string());
        }
    }
    let lower = given.to_lowercase();
    if !variants.contains(&lower) {
        variants.push(lower);
    }
    variants
}

/// Clean a surface name into its display form.
///
/// Trims, collapses whitespace, drops honorifics, expands bare initials
/// (`M Zubair` → `M. Zubair`), and fixes all-lower/all-upper tokens.
pub fn normalize_name(raw: &str) -> String {
    let tokens: Vec<&str> = raw
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '(' | ')' | '"')))
        .filter(|t| !t.is_empty())
        .collect();

    let start = tokens.iter().take_while(|t| is_honorific(t)).count();
    // A lone honorific is still a (poor) name; keep it.
    let tokens = if start == tokens.len() { &tokens[..] } else { &tokens[start..] };

    tokens
        .iter()
        .map(|t| normalize_token_case(t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_token_case(token: &str) -> String {
    let letters: Vec<char> = token.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() == 1 && token.chars().count() <= 2 {
        return format!("{}.", letters[0].to_uppercase());
    }

    let all_lower = letters.iter().all(|c| c.is_lowercase());
    let all_upper = letters.len() > 1 && letters.iter().all(|c| c.is_uppercase());
    if !(all_lower || all_upper) {
        return token.to_string();
    }

    let mut out = String::with_capacity(token.len());
    let mut capitalize = true;
    for c in token.chars() {
        if capitalize && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            capitalize = false;
        } else {
            out.extend(c.to_lowercase());
        }
        if c == '-' || c == '\'' {
            capitalize = true;
        }
    }
    out
}

/// Comparison key: case-folded, dots removed, given name mapped through the
/// nickname table. `"Bob Smith"` and `"robert smith"` share a key.
pub fn comparison_key(name: &str) -> String {
    let normalized = normalize_name(name);
    let mut parts: Vec<String> = normalized
        .split_whitespace()
        .map(|t| t.replace('.', "").to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    if parts.len() > 1 {
        if let Some(first) = parts.first_mut() {
            *first = canonical_given_name(first);
        }
    }
    parts.join(" ")
}

/// First and last name tokens of a normalized name, lower-cased and without
/// dots. Initials come back as single letters.
pub fn name_parts(name: &str) -> Option<(String, String)> {
    let normalized = normalize_name(name);
    let tokens: Vec<String> = normalized
        .split_whitespace()
        .map(|t| t.replace('.', "").to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    match tokens.as_slice() {
        [first, .., last] => Some((first.clone(), last.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_initials_and_drops_honorifics() {
        assert_eq!(normalize_name("Mr M Zubair"), "M. Zubair");
        assert_eq!(normalize_name("  M.   Zubair "), "M. Zubair");
        assert_eq!(normalize_name("Dr. Jane K Doe"), "Jane K. Doe");
    }

    #[test]
    fn fixes_shouting_and_lower_case() {
        assert_eq!(normalize_name("JOHN SMITH"), "John Smith");
        assert_eq!(normalize_name("mary-jane o'neill"), "Mary-Jane O'Neill");
        assert_eq!(normalize_name("David McAllister"), "David McAllister");
    }

    #[test]
    fn nickname_equivalence_in_keys() {
        assert_eq!(comparison_key("Bob Clarke"), comparison_key("Robert Clarke"));
        assert_eq!(comparison_key("M Zubair"), comparison_key("Mr. M. Zubair"));
        assert_ne!(comparison_key("Sarah Jones"), comparison_key("Sarah Jonas"));
    }

    #[test]
    fn variants_cover_both_directions() {
        let from_formal = given_name_variants("Robert");
        assert!(from_formal.contains(&"bob".to_string()));
        let from_nick = given_name_variants("Bob");
        assert!(from_nick.contains(&"robert".to_string()));
        assert!(from_nick.contains(&"rob".to_string()));
        assert_eq!(given_name_variants("Zubair"), vec!["zubair".to_string()]);
    }

    #[test]
    fn parts_of_names() {
        assert_eq!(name_parts("M. Zubair"), Some(("m".into(), "zubair".into())));
        assert_eq!(
            name_parts("Gary Thompson"),
            Some(("gary".into(), "thompson".into()))
        );
        assert_eq!(name_parts("Zubair"), None);
    }
}
