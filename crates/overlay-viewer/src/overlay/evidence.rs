use crate::overlay::geometry::{CoordinateRecord, RawRect, Rect};
use crate::overlay::numbered_text;
use serde::Deserialize;
use std::collections::HashMap;

/// One referenced item inside an evidence group: either an index into the
/// numbered sentence list or a direct page-scoped rectangle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EvidenceRef {
    Sentence(usize),
    Region {
        page: usize,
        #[serde(flatten)]
        rect: RawRect,
    },
}

/// Caller-supplied association between one rendered answer panel and the
/// sentences/regions backing it. Supplied fresh on every pass; the
/// renderer keeps no copy that could desync.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceGroup {
    pub name: String,
    pub refs: Vec<EvidenceRef>,
    pub is_open: bool,
}

/// Output of a resolution pass. Values are indices into the group slice
/// the pass was run over.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvidenceIndex {
    pub text_key_to_groups: HashMap<String, Vec<usize>>,
    pub coord_key_to_groups: HashMap<String, Vec<usize>>,
}

/// Normalized key for coordinate-based linking: page plus the four
/// corners rounded to two decimals, so float noise between the group's
/// copy of a rectangle and the extraction's copy does not break equality.
pub fn coord_key(page: usize, rect: &Rect) -> String {
    format!(
        "{}|{:.2}-{:.2}-{:.2}-{:.2}",
        page, rect.ulx, rect.uly, rect.lrx, rect.lry
    )
}

/// Derive the text-key and coordinate-key maps for the given groups.
///
/// Text linking is by exact trimmed string equality across the whole
/// document; duplicate sentence text over-links on purpose, since the
/// upstream data carries no per-occurrence identity.
pub fn resolve(sentences: &[Option<String>], groups: &[EvidenceGroup]) -> EvidenceIndex {
    let mut index = EvidenceIndex::default();

    for (group_idx, group) in groups.iter().enumerate() {
        for evidence_ref in &group.refs {
            match evidence_ref {
                EvidenceRef::Sentence(sentence_idx) => {
                    let Some(sentence) = numbered_text::sentence_at(sentences, *sentence_idx)
                    else {
                        continue;
                    };
                    push_unique(
                        index
                            .text_key_to_groups
                            .entry(sentence.to_string())
                            .or_default(),
                        group_idx,
                    );
                }
                EvidenceRef::Region { page, rect } => {
                    let key = coord_key(*page, &Rect::from(*rect));
                    push_unique(index.coord_key_to_groups.entry(key).or_default(), group_idx);
                }
            }
        }
    }

    index
}

/// Indices of all groups linked to a coordinate record, via either its
/// trimmed text or its coordinate key.
pub fn groups_for_record(record: &CoordinateRecord, index: &EvidenceIndex) -> Vec<usize> {
    let mut linked: Vec<usize> = Vec::new();

    if let Some(by_text) = index.text_key_to_groups.get(record.text.trim()) {
        for &group_idx in by_text {
            push_unique(&mut linked, group_idx);
        }
    }

    let key = coord_key(record.page, &record.rect());
    if let Some(by_coord) = index.coord_key_to_groups.get(&key) {
        for &group_idx in by_coord {
            push_unique(&mut linked, group_idx);
        }
    }

    linked
}

fn push_unique(groups: &mut Vec<usize>, group_idx: usize) {
    if !groups.contains(&group_idx) {
        groups.push(group_idx);
    }
}
