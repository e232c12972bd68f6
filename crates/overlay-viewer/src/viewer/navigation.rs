use crate::constants::{PAGE_SPACING, SCROLL_LEAD_MARGIN};
use crate::overlay::geometry::{CoordinateRecord, PageSize, Viewport};
use crate::overlay::numbered_text;
use std::collections::HashMap;

/// Vertical offset of each page's top edge in the stacked layout, at the
/// given zoom. Layout heights come from the decoder's page sizes so that
/// unrendered pages still occupy their final extent.
pub fn page_tops(doc_page_sizes: &[PageSize], zoom: f32) -> Vec<f32> {
    let mut tops = Vec::with_capacity(doc_page_sizes.len());
    let mut cursor = 0.0;
    for size in doc_page_sizes {
        tops.push(cursor);
        cursor += size.height * zoom + PAGE_SPACING;
    }
    tops
}

pub fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}

/// Scroll offset that aligns page `page`'s top near the top of the
/// container. `None` when no pages exist yet.
pub fn page_scroll_offset(page: usize, page_count: usize, tops: &[f32]) -> Option<f32> {
    if tops.is_empty() {
        return None;
    }
    let clamped = clamp_page(page, page_count);
    tops.get(clamped - 1).copied()
}

/// Scroll offset for an absolute coordinate: the rectangle's top edge
/// within its page, projected through the page's realized scale factors,
/// minus a fixed lead margin. `None` while the page's viewport or
/// document-unit size is unknown — the caller treats that as a no-op.
pub fn coord_scroll_offset(
    record: &CoordinateRecord,
    annotation_pages: &[PageSize],
    viewports: &HashMap<usize, Viewport>,
    tops: &[f32],
) -> Option<f32> {
    if record.page == 0 {
        return None;
    }
    let page_size = annotation_pages.get(record.page - 1)?;
    let viewport = viewports.get(&record.page)?;
    let top = tops.get(record.page - 1)?;

    if page_size.height <= 0.0 {
        return None;
    }

    let scale_y = viewport.height / page_size.height;
    let offset = top + record.rect().uly * scale_y - SCROLL_LEAD_MARGIN;
    Some(offset.max(0.0))
}

/// First coordinate record anywhere in the document whose trimmed text
/// equals the given sentence. A silent miss is expected when upstream
/// data has no box for the sentence.
pub fn record_for_sentence<'a>(
    sentence_index: usize,
    sentences: &[Option<String>],
    records: &'a [CoordinateRecord],
) -> Option<&'a CoordinateRecord> {
    let sentence = numbered_text::sentence_at(sentences, sentence_index)?;
    records.iter().find(|record| record.text.trim() == sentence)
}
