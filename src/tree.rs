use serde::Deserialize;

pub const YEAR_PLACEHOLDER: &str = "?";

/// One person record in the wire shape served by the tree endpoint.
///
/// Every field except `id` and `first_name` is nullable in the store, and
/// `children` may be missing entirely for leaf records, so the whole shape
/// deserializes leniently.
#[derive(Debug, Clone, Deserialize)]
pub struct Person {
    pub id: Option<i64>,
    #[serde(default)]
    pub first_name: String,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub color: Option<String>,
    pub font_color: Option<String>,
    pub font_size: Option<String>,
    pub font_family: Option<String>,
    pub children: Option<Vec<Person>>,
}

/// A normalized tree, ready for layout.
#[derive(Debug, Clone, PartialEq)]
pub enum FamilyTree {
    /// No usable root record; the chart shows an informational message.
    Empty,
    Root(Member),
}

/// A fully-defaulted person node: children always present, display fields
/// derived, style overrides carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: i64,
    pub display_name: String,
    pub display_year: String,
    pub color: Option<String>,
    pub font_color: Option<String>,
    pub font_size: Option<String>,
    pub font_family: Option<String>,
    pub children: Vec<Member>,
}

/// Deep-copies the raw tree into canonical form. A missing root or a root
/// without an id yields [`FamilyTree::Empty`]; nothing here ever fails.
pub fn normalize(root: Option<&Person>) -> FamilyTree {
    match root {
        Some(person) if person.id.is_some() => FamilyTree::Root(normalize_member(person)),
        _ => FamilyTree::Empty,
    }
}

fn normalize_member(person: &Person) -> Member {
    let display_name = match person.last_name.as_deref() {
        Some(last) if !last.trim().is_empty() => {
            format!("{} {}", person.first_name, last.trim())
        }
        _ => person.first_name.clone(),
    };

    Member {
        id: person.id.unwrap_or(0),
        display_name,
        display_year: display_year(person.birth_date.as_deref()),
        color: person.color.clone(),
        font_color: person.font_color.clone(),
        font_size: person.font_size.clone(),
        font_family: person.font_family.clone(),
        children: person
            .children
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(normalize_member)
            .collect(),
    }
}

/// Extracts the display year from an ISO-style date. Both "1904-06-21" and
/// plain "1904" carry the year up front; anything else degrades to "?".
fn display_year(birth_date: Option<&str>) -> String {
    let Some(date) = birth_date else {
        return YEAR_PLACEHOLDER.to_string();
    };

    let digits: String = date
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.len() == 4 {
        digits
    } else {
        YEAR_PLACEHOLDER.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: Option<i64>) -> Person {
        Person {
            id,
            first_name: "Ada".to_string(),
            last_name: None,
            birth_date: None,
            color: None,
            font_color: None,
            font_size: None,
            font_family: None,
            children: None,
        }
    }

    #[test]
    fn missing_root_is_empty() {
        assert_eq!(normalize(None), FamilyTree::Empty);
    }

    #[test]
    fn root_without_id_is_empty() {
        assert_eq!(normalize(Some(&person(None))), FamilyTree::Empty);
    }

    #[test]
    fn missing_children_default_to_empty_vec() {
        let FamilyTree::Root(member) = normalize(Some(&person(Some(1)))) else {
            panic!("expected a root");
        };
        assert!(member.children.is_empty());
    }

    #[test]
    fn display_name_joins_last_name_when_present() {
        let mut p = person(Some(1));
        p.last_name = Some("Lovelace".to_string());
        let FamilyTree::Root(member) = normalize(Some(&p)) else {
            panic!("expected a root");
        };
        assert_eq!(member.display_name, "Ada Lovelace");
    }

    #[test]
    fn blank_last_name_is_ignored() {
        let mut p = person(Some(1));
        p.last_name = Some("   ".to_string());
        let FamilyTree::Root(member) = normalize(Some(&p)) else {
            panic!("expected a root");
        };
        assert_eq!(member.display_name, "Ada");
    }

    #[test]
    fn display_year_parses_iso_dates() {
        assert_eq!(display_year(Some("1904-06-21")), "1904");
        assert_eq!(display_year(Some("1904")), "1904");
        assert_eq!(display_year(Some(" 1815-12-10 ")), "1815");
    }

    #[test]
    fn display_year_degrades_to_placeholder() {
        assert_eq!(display_year(None), YEAR_PLACEHOLDER);
        assert_eq!(display_year(Some("unknown")), YEAR_PLACEHOLDER);
        assert_eq!(display_year(Some("06/21/1904")), YEAR_PLACEHOLDER);
        assert_eq!(display_year(Some("")), YEAR_PLACEHOLDER);
    }

    #[test]
    fn wire_shape_deserializes_with_sparse_fields() {
        let json = r#"{
            "id": 3,
            "first_name": "Mira",
            "birth_date": "1950-01-02",
            "children": [{"id": 7, "first_name": "Tess"}]
        }"#;
        let parsed: Person = serde_json::from_str(json).unwrap();
        let FamilyTree::Root(member) = normalize(Some(&parsed)) else {
            panic!("expected a root");
        };
        assert_eq!(member.display_year, "1950");
        assert_eq!(member.children.len(), 1);
        assert_eq!(member.children[0].display_year, YEAR_PLACEHOLDER);
    }
}
