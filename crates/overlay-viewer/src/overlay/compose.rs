use crate::constants::*;
use crate::overlay::color::color_for_group;
use crate::overlay::evidence::{self, EvidenceGroup, EvidenceIndex};
use crate::overlay::geometry::{self, CoordinateRecord, PageSize, PixelRect, Viewport};
use egui::Color32;
use std::collections::HashMap;

/// Visual treatment of an overlay box. Open groups take precedence over
/// closed ones; unlinked boxes only appear in show-all mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStyle {
    Open,
    Closed,
    Unlinked,
}

/// One positioned box ready for painting, in pixels relative to the
/// page's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayElement {
    pub rect: PixelRect,
    pub style: OverlayStyle,
    pub fill: Color32,
    pub stroke: Color32,
    pub label: String,
}

impl OverlayStyle {
    pub fn is_dashed(self) -> bool {
        !matches!(self, Self::Open)
    }

    fn fill_alpha(self) -> u8 {
        match self {
            Self::Open => OPEN_FILL_ALPHA,
            Self::Closed => CLOSED_FILL_ALPHA,
            Self::Unlinked => UNLINKED_FILL_ALPHA,
        }
    }
}

fn truncated_label(group_name: Option<&str>, text: &str) -> String {
    let clipped: String = text.trim().chars().take(TOOLTIP_MAX_CHARS).collect();
    match group_name {
        Some(name) => format!("{}: {}", name, clipped),
        None => clipped,
    }
}

fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Build the overlay elements for one page.
///
/// With `show_all` false only records linked to at least one evidence
/// group survive; with it true every record on the page is emitted,
/// unlinked ones in the dashed amber treatment. Records whose page has no
/// realized viewport yet are skipped silently.
pub fn compose(
    page: usize,
    show_all: bool,
    records: &[CoordinateRecord],
    groups: &[EvidenceGroup],
    index: &EvidenceIndex,
    page_sizes: &[PageSize],
    viewports: &HashMap<usize, Viewport>,
) -> Vec<OverlayElement> {
    let mut elements = Vec::new();

    for record in records.iter().filter(|r| r.page == page) {
        let linked = evidence::groups_for_record(record, index);
        if !show_all && linked.is_empty() {
            continue;
        }

        let open_here = linked.iter().any(|&idx| groups[idx].is_open);
        let chosen = if open_here {
            linked.iter().copied().find(|&idx| groups[idx].is_open)
        } else {
            linked.first().copied()
        };

        let style = match (chosen, open_here) {
            (Some(_), true) => OverlayStyle::Open,
            (Some(_), false) => OverlayStyle::Closed,
            (None, _) => OverlayStyle::Unlinked,
        };

        let base_color = chosen
            .map(|idx| color_for_group(&groups[idx].name))
            .unwrap_or(FALLBACK_AMBER);

        let Some(rect) = geometry::project(record, page_sizes, viewports) else {
            continue;
        };

        elements.push(OverlayElement {
            rect,
            style,
            fill: with_alpha(base_color, style.fill_alpha()),
            stroke: base_color,
            label: truncated_label(chosen.map(|idx| groups[idx].name.as_str()), &record.text),
        });
    }

    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::evidence::{EvidenceRef, resolve};
    use crate::overlay::geometry::RawRect;
    use crate::overlay::numbered_text::parse_numbered_text;

    fn record(page: usize, text: &str) -> CoordinateRecord {
        CoordinateRecord {
            page,
            text: text.to_string(),
            rect: RawRect::Corners {
                ulx: 10.0,
                uly: 10.0,
                lrx: 100.0,
                lry: 30.0,
            },
        }
    }

    fn group(name: &str, sentence: usize, is_open: bool) -> EvidenceGroup {
        EvidenceGroup {
            name: name.to_string(),
            refs: vec![EvidenceRef::Sentence(sentence)],
            is_open,
        }
    }

    fn one_page() -> (Vec<PageSize>, HashMap<usize, Viewport>) {
        let sizes = vec![PageSize {
            width: 612.0,
            height: 792.0,
        }];
        let mut viewports = HashMap::new();
        viewports.insert(
            1,
            Viewport {
                width: 612.0,
                height: 792.0,
            },
        );
        (sizes, viewports)
    }

    #[test]
    fn test_no_groups_and_no_show_all_is_empty() {
        let (sizes, viewports) = one_page();
        let records = vec![record(1, "A sentence."), record(1, "Another sentence.")];
        let index = resolve(&[], &[]);

        let elements = compose(1, false, &records, &[], &index, &sizes, &viewports);
        assert!(elements.is_empty());
    }

    #[test]
    fn test_show_all_emits_unlinked_as_amber() {
        let (sizes, viewports) = one_page();
        let records = vec![record(1, "A sentence.")];
        let index = resolve(&[], &[]);

        let elements = compose(1, true, &records, &[], &index, &sizes, &viewports);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].style, OverlayStyle::Unlinked);
        assert!(elements[0].style.is_dashed());
        assert_eq!(elements[0].stroke, FALLBACK_AMBER);
        assert_eq!(elements[0].label, "A sentence.");
    }

    #[test]
    fn test_open_group_takes_precedence_over_closed() {
        let (sizes, viewports) = one_page();
        let sentences = parse_numbered_text("[0] Shared sentence.");
        let groups = vec![
            group("Closed question", 0, false),
            group("Open question", 0, true),
        ];
        let index = resolve(&sentences, &groups);
        let records = vec![record(1, "Shared sentence.")];

        let elements = compose(1, false, &records, &groups, &index, &sizes, &viewports);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].style, OverlayStyle::Open);
        assert!(!elements[0].style.is_dashed());
        // The first open group supplies color and label.
        assert_eq!(elements[0].stroke, color_for_group("Open question"));
        assert_eq!(elements[0].label, "Open question: Shared sentence.");
    }

    #[test]
    fn test_closed_group_gets_closed_style() {
        let (sizes, viewports) = one_page();
        let sentences = parse_numbered_text("[0] Shared sentence.");
        let groups = vec![group("Closed question", 0, false)];
        let index = resolve(&sentences, &groups);
        let records = vec![record(1, "Shared sentence.")];

        let elements = compose(1, false, &records, &groups, &index, &sizes, &viewports);
        assert_eq!(elements[0].style, OverlayStyle::Closed);
        assert!(elements[0].style.is_dashed());
        assert_eq!(elements[0].fill.a(), CLOSED_FILL_ALPHA);
    }

    #[test]
    fn test_other_pages_are_filtered_out() {
        let (sizes, viewports) = one_page();
        let records = vec![record(1, "On one."), record(2, "On two.")];
        let index = resolve(&[], &[]);

        let elements = compose(1, true, &records, &[], &index, &sizes, &viewports);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].label, "On one.");
    }

    #[test]
    fn test_unrendered_page_emits_nothing() {
        let sizes = vec![
            PageSize {
                width: 612.0,
                height: 792.0,
            };
            2
        ];
        let viewports = HashMap::new();
        let records = vec![record(2, "Not yet rendered.")];
        let index = resolve(&[], &[]);

        let elements = compose(2, true, &records, &[], &index, &sizes, &viewports);
        assert!(elements.is_empty());
    }

    #[test]
    fn test_label_truncates_long_text() {
        let (sizes, viewports) = one_page();
        let long_text = "x".repeat(400);
        let records = vec![record(1, &long_text)];
        let index = resolve(&[], &[]);

        let elements = compose(1, true, &records, &[], &index, &sizes, &viewports);
        assert_eq!(elements[0].label.chars().count(), TOOLTIP_MAX_CHARS);
    }

    #[test]
    fn test_open_fill_is_stronger_than_closed() {
        assert!(OPEN_FILL_ALPHA > CLOSED_FILL_ALPHA);
        assert!(CLOSED_FILL_ALPHA > UNLINKED_FILL_ALPHA);
    }
}
