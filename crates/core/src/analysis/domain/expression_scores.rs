use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Expression label → score, in the order the analyzer reported them.
///
/// Scores need not sum to 1; only their relative order matters. The
/// report order is kept because it breaks ties in [`dominant`].
///
/// [`dominant`]: ExpressionScores::dominant
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpressionScores {
    entries: Vec<(String, f64)>,
}

impl ExpressionScores {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Label with the strictly highest score. On ties the earliest
    /// reported label wins; NaN scores never win.
    pub fn dominant(&self) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (label, score) in self.iter() {
            if score.is_nan() {
                continue;
            }
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((label, score)),
            }
        }
        best.map(|(label, _)| label)
    }
}

impl Serialize for ExpressionScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, score) in &self.entries {
            map.serialize_entry(label, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ExpressionScores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = ExpressionScores;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of expression label to score")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(7));
                while let Some((label, score)) = access.next_entry::<String, f64>()? {
                    entries.push((label, score));
                }
                Ok(ExpressionScores { entries })
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}
