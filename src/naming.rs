//! Field and collection naming heuristics

use regex::Regex;
use std::sync::OnceLock;

/// What a field name suggests about its contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameHint {
    /// Primary or foreign key (`_id`, `userId`, `author_id`)
    Identifier,
    /// Low-cardinality enumeration (`status`, `type`)
    Category,
    /// Value usually sorted on (`priority`, `rank`)
    Ordering,
    /// Timestamp (`createdAt`, `due_date`)
    Temporal,
    /// Unique contact handle (`email`, `username`)
    Contact,
    /// Bulky, rarely read data (`description`, `history`)
    Cold,
}

/// Traffic profile suggested by a collection name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionHint {
    Transactional,
    Social,
    Profile,
    General,
}

static FIELD_RULES: OnceLock<Vec<(NameHint, Regex)>> = OnceLock::new();
static COLLECTION_RULES: OnceLock<Vec<(CollectionHint, Regex)>> = OnceLock::new();

fn compile<T: Copy>(patterns: &[(T, &str)]) -> Vec<(T, Regex)> {
    patterns
        .iter()
        .filter_map(|(hint, pattern)| Regex::new(pattern).ok().map(|re| (*hint, re)))
        .collect()
}

fn field_rules() -> &'static [(NameHint, Regex)] {
    FIELD_RULES.get_or_init(|| {
        compile(&[
            (NameHint::Identifier, r"^_?[iI][dD]$|_ids?$|[a-z0-9]Ids?$"),
            (NameHint::Category, r"(?i)status|type|category|state|role|kind|level|tier"),
            (NameHint::Ordering, r"(?i)status|priority|rank|score|position|sequence|sortorder"),
            (NameHint::Temporal, r"(?i:date|time)|[a-z]At$|(?i:_at)$"),
            (NameHint::Contact, r"(?i)email|username|phone|slug|handle|sku"),
            (NameHint::Cold, r"(?i)description|notes?$|metadata|legacy|history|logs?$|audit|bio$"),
        ])
    })
}

fn collection_rules() -> &'static [(CollectionHint, Regex)] {
    COLLECTION_RULES.get_or_init(|| {
        compile(&[
            (
                CollectionHint::Transactional,
                r"(?i)transaction|event|log|ticket|order|payment|message",
            ),
            (CollectionHint::Social, r"(?i)review|comment|rating|like|post"),
            (CollectionHint::Profile, r"(?i)user|profile|account|customer|member"),
        ])
    })
}

/// Whether the field name carries `hint`
pub fn has_hint(name: &str, hint: NameHint) -> bool {
    field_rules()
        .iter()
        .any(|(h, re)| *h == hint && re.is_match(name))
}

/// First matching traffic profile for a collection name
pub fn collection_hint(name: &str) -> CollectionHint {
    collection_rules()
        .iter()
        .find(|(_, re)| re.is_match(name))
        .map(|(hint, _)| *hint)
        .unwrap_or(CollectionHint::General)
}

/// Guess the collection a foreign key points at (`userId` → `users`)
pub fn referenced_collection(field: &str) -> Option<String> {
    let stem = ["_ids", "_id", "Ids", "Id"]
        .iter()
        .find_map(|suffix| field.strip_suffix(suffix))
        .filter(|stem| !stem.is_empty() && *stem != "_")?;

    let mut chars = stem.chars();
    let first = chars.next()?;
    let base: String = first.to_lowercase().chain(chars).collect();

    let plural = if base.ends_with('s') {
        base
    } else if let Some(head) = base
        .strip_suffix('y')
        .filter(|h| !h.ends_with(['a', 'e', 'i', 'o', 'u']))
    {
        format!("{}ies", head)
    } else {
        format!("{}s", base)
    };
    Some(plural)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_names() {
        for name in ["_id", "id", "userId", "author_id", "tagIds"] {
            assert!(has_hint(name, NameHint::Identifier), "{}", name);
        }
        for name in ["valid", "idea", "paid"] {
            assert!(!has_hint(name, NameHint::Identifier), "{}", name);
        }
    }

    #[test]
    fn test_temporal_names() {
        assert!(has_hint("createdAt", NameHint::Temporal));
        assert!(has_hint("due_date", NameHint::Temporal));
        assert!(has_hint("updated_at", NameHint::Temporal));
        assert!(!has_hint("format", NameHint::Temporal));
    }

    #[test]
    fn test_collection_hints() {
        assert_eq!(collection_hint("orders"), CollectionHint::Transactional);
        assert_eq!(collection_hint("productReviews"), CollectionHint::Social);
        assert_eq!(collection_hint("users"), CollectionHint::Profile);
        assert_eq!(collection_hint("products"), CollectionHint::General);
    }

    #[test]
    fn test_referenced_collection() {
        assert_eq!(referenced_collection("userId").as_deref(), Some("users"));
        assert_eq!(referenced_collection("category_id").as_deref(), Some("categories"));
        assert_eq!(referenced_collection("dayId").as_deref(), Some("days"));
        assert_eq!(referenced_collection("_id"), None);
        assert_eq!(referenced_collection("name"), None);
    }
}
