use locpatch_types::rules::{Rule, RuleSet};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

/// On-disk shape of a rule document.
///
/// Unknown fields are ignored and `file`/`replacements` may be absent; the apply
/// step reports such documents as skipped rather than the loader rejecting them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleDocument {
    #[serde(default)]
    pub file: Option<String>,

    /// Replacements in declaration order.
    #[serde(default, deserialize_with = "ordered_replacements")]
    pub replacements: Vec<(String, String)>,

    #[serde(default)]
    pub deprecated: bool,
}

impl RuleDocument {
    pub fn into_rule_set(self) -> RuleSet {
        let mut set = RuleSet::new(
            self.file.unwrap_or_default(),
            self.replacements
                .into_iter()
                .map(|(find, replace)| Rule::new(find, replace))
                .collect(),
        );
        set.deprecated = self.deprecated;
        set
    }
}

/// Parse one rule document into a [`RuleSet`].
pub fn parse_rule_set(contents: &str) -> Result<RuleSet, serde_json::Error> {
    let doc: RuleDocument = serde_json::from_str(contents)?;
    Ok(doc.into_rule_set())
}

fn ordered_replacements<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_option(OptionalReplacements)
}

struct OptionalReplacements;

impl<'de> Visitor<'de> for OptionalReplacements {
    type Value = Vec<(String, String)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping find text to replacement text")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ReplacementsVisitor)
    }
}

struct ReplacementsVisitor;

impl<'de> Visitor<'de> for ReplacementsVisitor {
    type Value = Vec<(String, String)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping find text to replacement text")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
        let mut seen = HashSet::new();
        while let Some((find, replace)) = map.next_entry::<String, String>()? {
            if !seen.insert(find.clone()) {
                return Err(de::Error::custom(format!("duplicate find key `{find}`")));
            }
            out.push((find, replace));
        }
        Ok(out)
    }
}
