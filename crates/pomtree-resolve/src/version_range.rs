//! Artifact versions and version ranges (`[1.8]`, `[11,)`, `(,1.6],[1.8,)`).

use std::cmp::Ordering;
use std::fmt;

/// A parsed artifact version.
///
/// Versions are split into items on `.`, `-` and digit/letter transitions. Numeric
/// items compare numerically, qualifiers by their well-known order
/// (`alpha < beta < milestone < rc < snapshot < release < sp`, unknown qualifiers after
/// `sp`, lexically). Missing items count as `0` / release, so `1.8 == 1.8.0`.
#[derive(Debug, Clone)]
pub struct ArtifactVersion {
    raw: String,
    items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Number(u64),
    Qualifier(String),
}

impl ArtifactVersion {
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim();
        let mut items = Vec::new();
        for part in raw.split(['.', '-']) {
            split_alnum(part, &mut items);
        }
        Self {
            raw: raw.to_string(),
            items,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn split_alnum(part: &str, out: &mut Vec<Item>) {
    let mut start = 0;
    let bytes = part.as_bytes();
    for i in 1..=bytes.len() {
        let boundary =
            i == bytes.len() || bytes[i].is_ascii_digit() != bytes[i - 1].is_ascii_digit();
        if boundary {
            let token = &part[start..i];
            out.push(match token.parse::<u64>() {
                Ok(n) => Item::Number(n),
                Err(_) => Item::Qualifier(token.to_ascii_lowercase()),
            });
            start = i;
        }
    }
}

fn qualifier_rank(qualifier: &str) -> (u8, &str) {
    match qualifier {
        "alpha" | "a" => (0, ""),
        "beta" | "b" => (1, ""),
        "milestone" | "m" => (2, ""),
        "rc" | "cr" => (3, ""),
        "snapshot" => (4, ""),
        "" | "ga" | "final" | "release" => (5, ""),
        "sp" => (6, ""),
        other => (7, other),
    }
}

fn compare_items(left: Option<&Item>, right: Option<&Item>) -> Ordering {
    match (left, right) {
        (Some(Item::Number(a)), Some(Item::Number(b))) => a.cmp(b),
        (Some(Item::Number(_)), Some(Item::Qualifier(_))) => Ordering::Greater,
        (Some(Item::Qualifier(_)), Some(Item::Number(_))) => Ordering::Less,
        (Some(Item::Qualifier(a)), Some(Item::Qualifier(b))) => {
            qualifier_rank(a).cmp(&qualifier_rank(b))
        }
        (Some(Item::Number(a)), None) => a.cmp(&0),
        (None, Some(Item::Number(b))) => 0.cmp(b),
        (Some(Item::Qualifier(a)), None) => qualifier_rank(a).cmp(&qualifier_rank("")),
        (None, Some(Item::Qualifier(b))) => qualifier_rank("").cmp(&qualifier_rank(b)),
        (None, None) => Ordering::Equal,
    }
}

impl Ord for ArtifactVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.items.len().max(other.items.len());
        (0..len)
            .map(|i| compare_items(self.items.get(i), other.items.get(i)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ArtifactVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ArtifactVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for ArtifactVersion {}

impl fmt::Display for ArtifactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version range `{range}`: {reason}")]
pub struct InvalidVersionRange {
    pub range: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone)]
struct Bound {
    version: ArtifactVersion,
    inclusive: bool,
}

#[derive(Debug, Clone)]
struct Restriction {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl Restriction {
    fn contains(&self, version: &ArtifactVersion) -> bool {
        let above_lower = match &self.lower {
            None => true,
            Some(bound) if bound.inclusive => *version >= bound.version,
            Some(bound) => *version > bound.version,
        };
        let below_upper = match &self.upper {
            None => true,
            Some(bound) if bound.inclusive => *version <= bound.version,
            Some(bound) => *version < bound.version,
        };
        above_lower && below_upper
    }
}

/// A union of version restrictions.
#[derive(Debug, Clone)]
pub struct VersionRange {
    restrictions: Vec<Restriction>,
}

impl VersionRange {
    /// Parses one or more comma-separated restriction sets.
    ///
    /// A bare version without brackets is read as the exact range `[v]`.
    pub fn parse(input: &str) -> Result<Self, InvalidVersionRange> {
        let invalid = |reason: &'static str| InvalidVersionRange {
            range: input.to_string(),
            reason,
        };

        let mut rest = input.trim();
        if rest.is_empty() {
            return Err(invalid("empty range"));
        }
        if !rest.starts_with(['[', '(']) {
            if rest.contains([',', '[', ']', '(', ')']) {
                return Err(invalid("unbracketed range"));
            }
            let version = ArtifactVersion::new(rest);
            return Ok(Self {
                restrictions: vec![Restriction {
                    lower: Some(Bound {
                        version: version.clone(),
                        inclusive: true,
                    }),
                    upper: Some(Bound {
                        version,
                        inclusive: true,
                    }),
                }],
            });
        }

        let mut restrictions = Vec::new();
        while !rest.is_empty() {
            let lower_inclusive = match rest.chars().next() {
                Some('[') => true,
                Some('(') => false,
                _ => return Err(invalid("expected `[` or `(`")),
            };
            let close = rest
                .find([']', ')'])
                .ok_or_else(|| invalid("unterminated restriction"))?;
            let upper_inclusive = rest[close..].starts_with(']');
            let inner = &rest[1..close];
            if inner.contains(['[', '(']) {
                return Err(invalid("nested brackets"));
            }
            restrictions.push(parse_restriction(
                inner,
                lower_inclusive,
                upper_inclusive,
                &invalid,
            )?);

            rest = rest[close + 1..].trim_start();
            if let Some(stripped) = rest.strip_prefix(',') {
                rest = stripped.trim_start();
                if rest.is_empty() {
                    return Err(invalid("trailing comma"));
                }
            } else if !rest.is_empty() {
                return Err(invalid("restrictions must be separated by `,`"));
            }
        }

        Ok(Self { restrictions })
    }

    pub fn contains(&self, version: &ArtifactVersion) -> bool {
        self.restrictions.iter().any(|r| r.contains(version))
    }
}

fn parse_restriction(
    inner: &str,
    lower_inclusive: bool,
    upper_inclusive: bool,
    invalid: &dyn Fn(&'static str) -> InvalidVersionRange,
) -> Result<Restriction, InvalidVersionRange> {
    let Some((lower, upper)) = inner.split_once(',') else {
        let version = inner.trim();
        if version.is_empty() {
            return Err(invalid("empty restriction"));
        }
        if !lower_inclusive || !upper_inclusive {
            return Err(invalid("a single version must be enclosed in `[]`"));
        }
        let version = ArtifactVersion::new(version);
        return Ok(Restriction {
            lower: Some(Bound {
                version: version.clone(),
                inclusive: true,
            }),
            upper: Some(Bound {
                version,
                inclusive: true,
            }),
        });
    };
    if upper.contains(',') {
        return Err(invalid("too many bounds"));
    }

    let bound = |text: &str, inclusive| {
        let text = text.trim();
        (!text.is_empty()).then(|| Bound {
            version: ArtifactVersion::new(text),
            inclusive,
        })
    };
    let lower = bound(lower, lower_inclusive);
    let upper = bound(upper, upper_inclusive);

    if let (Some(lo), Some(hi)) = (&lower, &upper) {
        match lo.version.cmp(&hi.version) {
            Ordering::Greater => return Err(invalid("lower bound is above upper bound")),
            Ordering::Equal if !(lo.inclusive && hi.inclusive) => {
                return Err(invalid("empty range"));
            }
            _ => {}
        }
    }

    Ok(Restriction { lower, upper })
}
