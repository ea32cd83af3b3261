use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::{LoadError, Result};
use crate::normalize::fold;
use crate::types::{AffixEntry, RootEntry};

/// Read-only root/affix lexicon plus the morphotactic category ordering.
///
/// Built once, never mutated afterwards; share it behind an `Arc`.
#[derive(Debug)]
pub struct LexiconStore {
    roots: Vec<RootEntry>,
    root_index: HashMap<String, usize>,
    affixes: Vec<AffixEntry>,
    /// Category index of each affix, parallel to `affixes`.
    affix_categories: Vec<usize>,
    /// Surface → affix ids, in declaration order.
    affix_index: HashMap<String, Vec<usize>>,
    categories: Vec<String>,
}

/// An affix whose surface prefix-matched a remainder.
#[derive(Debug, Clone, Copy)]
pub struct AffixMatch<'a> {
    pub entry: &'a AffixEntry,
    pub category_index: usize,
}

impl LexiconStore {
    /// Load the three JSON tables. All-or-nothing: either every table parses
    /// into a consistent store or a [`LoadError`] is returned.
    pub fn load<R1, R2, R3>(roots: R1, affixes: R2, rules: R3) -> Result<Self>
    where
        R1: Read,
        R2: Read,
        R3: Read,
    {
        let categories = parse_rules(read_json("rules", rules)?)?;
        let roots = parse_roots(read_json("roots", roots)?)?;
        let affixes = parse_affixes(read_json("affixes", affixes)?)?;
        Self::from_entries(roots, affixes, categories)
    }

    /// Load the tables from files. Handles are closed before returning.
    pub fn from_paths(roots: &Path, affixes: &Path, rules: &Path) -> Result<Self> {
        Self::load(open(roots)?, open(affixes)?, open(rules)?)
    }

    /// Build a store from already-parsed entries.
    ///
    /// Surfaces are folded. Rows with an empty surface, a duplicate root
    /// surface or an affix category missing from `categories` are skipped
    /// with a warning. A category listed twice is an error.
    pub fn from_entries(
        roots: Vec<RootEntry>,
        affixes: Vec<AffixEntry>,
        categories: Vec<String>,
    ) -> Result<Self> {
        let mut category_index = HashMap::with_capacity(categories.len());
        for (i, name) in categories.iter().enumerate() {
            if category_index.insert(name.clone(), i).is_some() {
                return Err(LoadError::DuplicateCategory(name.clone()));
            }
        }

        let mut kept_roots = Vec::with_capacity(roots.len());
        let mut root_index = HashMap::with_capacity(roots.len());
        for mut root in roots {
            root.surface = fold(&root.surface);
            if root.surface.is_empty() {
                log::warn!("roots: skipping entry {:?}: empty surface form", root.lemma);
                continue;
            }
            if root_index.contains_key(&root.surface) {
                log::warn!("roots: skipping duplicate surface form {:?}", root.surface);
                continue;
            }
            root_index.insert(root.surface.clone(), kept_roots.len());
            kept_roots.push(root);
        }

        let mut kept_affixes = Vec::with_capacity(affixes.len());
        let mut affix_categories = Vec::with_capacity(affixes.len());
        let mut affix_index: HashMap<String, Vec<usize>> = HashMap::new();
        for mut affix in affixes {
            affix.surface = fold(&affix.surface);
            if affix.surface.is_empty() {
                log::warn!("affixes: skipping {:?}: empty surface form", affix.tag);
                continue;
            }
            let Some(&cat) = category_index.get(&affix.category) else {
                log::warn!(
                    "affixes: skipping {:?}: category {:?} is not in the rule table",
                    affix.surface,
                    affix.category
                );
                continue;
            };
            affix_index
                .entry(affix.surface.clone())
                .or_default()
                .push(kept_affixes.len());
            affix_categories.push(cat);
            kept_affixes.push(affix);
        }

        log::info!(
            "lexicon loaded: {} roots, {} affixes, {} categories",
            kept_roots.len(),
            kept_affixes.len(),
            categories.len()
        );

        Ok(Self {
            roots: kept_roots,
            root_index,
            affixes: kept_affixes,
            affix_categories,
            affix_index,
            categories,
        })
    }

    /// Roots whose surface is a prefix of `token`, longest first.
    pub fn roots_by_prefix(&self, token: &str) -> Vec<&RootEntry> {
        prefix_ends(token)
            .filter_map(|end| self.root_index.get(&token[..end]))
            .map(|&i| &self.roots[i])
            .collect()
    }

    /// Affixes whose surface is a prefix of `remainder`, longest first and in
    /// declaration order among affixes of equal surface.
    pub fn affixes_by_prefix(&self, remainder: &str) -> Vec<AffixMatch<'_>> {
        prefix_ends(remainder)
            .filter_map(|end| self.affix_index.get(&remainder[..end]))
            .flatten()
            .map(|&i| AffixMatch {
                entry: &self.affixes[i],
                category_index: self.affix_categories[i],
            })
            .collect()
    }

    /// Look up a root by its exact surface form.
    pub fn root(&self, surface: &str) -> Option<&RootEntry> {
        self.root_index.get(surface).map(|&i| &self.roots[i])
    }

    /// The rule table, in morphotactic order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn roots(&self) -> &[RootEntry] {
        &self.roots
    }

    pub fn affixes(&self) -> &[AffixEntry] {
        &self.affixes
    }
}

/// Byte offsets of every non-empty prefix of `s`, longest first.
fn prefix_ends(s: &str) -> impl Iterator<Item = usize> + '_ {
    s.char_indices().rev().map(|(i, c)| i + c.len_utf8())
}

pub(crate) fn open(path: &Path) -> Result<BufReader<File>> {
    if path.is_dir() {
        return Err(LoadError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "expected a file, found a directory"),
        ));
    }
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| LoadError::io(path, e))
}

pub(crate) fn read_json<R: Read>(source_name: &'static str, rdr: R) -> Result<Value> {
    serde_json::from_reader(rdr).map_err(|e| LoadError::json(source_name, e))
}

/// Split a table into `(key, row)` pairs. Objects are keyed by surface form;
/// arrays carry the surface inside each row.
pub(crate) fn table_rows(source_name: &'static str, value: Value) -> Result<Vec<(Option<String>, Value)>> {
    match value {
        Value::Object(map) => Ok(map.into_iter().map(|(k, v)| (Some(k), v)).collect()),
        Value::Array(rows) => Ok(rows.into_iter().map(|v| (None, v)).collect()),
        _ => Err(LoadError::invalid_format(
            source_name,
            "expected an object keyed by surface form or an array of rows",
        )),
    }
}

#[derive(Deserialize)]
struct RootRow {
    #[serde(default)]
    form: Option<String>,
    pos: String,
    #[serde(default)]
    lemma: Option<String>,
    #[serde(default)]
    gloss: Option<String>,
}

#[derive(Deserialize)]
struct AffixRow {
    #[serde(default)]
    form: Option<String>,
    tag: String,
    #[serde(default)]
    category: Option<String>,
}

fn parse_roots(value: Value) -> Result<Vec<RootEntry>> {
    let mut out = Vec::new();
    for (i, (key, row)) in table_rows("roots", value)?.into_iter().enumerate() {
        let row: RootRow = match serde_json::from_value(row) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("roots: skipping row {}: {e}", row_label(i, &key));
                continue;
            }
        };
        let Some(surface) = key.or(row.form) else {
            log::warn!("roots: skipping row {i}: no surface form");
            continue;
        };
        out.push(RootEntry {
            lemma: row.lemma.unwrap_or_else(|| surface.clone()),
            surface,
            pos: row.pos,
            gloss: row.gloss.filter(|g| !g.is_empty()),
        });
    }
    Ok(out)
}

fn parse_affixes(value: Value) -> Result<Vec<AffixEntry>> {
    let mut out = Vec::new();
    for (i, (key, row)) in table_rows("affixes", value)?.into_iter().enumerate() {
        let row: AffixRow = match serde_json::from_value(row) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("affixes: skipping row {}: {e}", row_label(i, &key));
                continue;
            }
        };
        let Some(surface) = key.or(row.form) else {
            log::warn!("affixes: skipping row {i}: no surface form");
            continue;
        };
        out.push(AffixEntry {
            surface,
            category: row.category.unwrap_or_else(|| row.tag.clone()),
            tag: row.tag,
        });
    }
    Ok(out)
}

fn parse_rules(value: Value) -> Result<Vec<String>> {
    let order = match value {
        Value::Object(mut map) => match map.remove("valid_order") {
            Some(v) => v,
            None => return Err(LoadError::invalid_format("rules", "missing \"valid_order\"")),
        },
        v => v,
    };
    let Value::Array(items) = order else {
        return Err(LoadError::invalid_format("rules", "category ordering must be an array"));
    };
    items
        .into_iter()
        .map(|v| match v {
            Value::String(s) => Ok(s),
            other => Err(LoadError::invalid_format(
                "rules",
                format!("category names must be strings, found {other}"),
            )),
        })
        .collect()
}

pub(crate) fn row_label(i: usize, key: &Option<String>) -> String {
    match key {
        Some(k) => format!("{k:?}"),
        None => i.to_string(),
    }
}
