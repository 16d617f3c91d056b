use crate::wiki::ItemDetail;

/// Returns true if the detail can be shown in the feed
///
/// A feed entry needs both a summary and an image. Incomplete detail is
/// dropped rather than written, so a complete row from an earlier pass is
/// never replaced by an incomplete one.
pub fn is_complete(detail: &ItemDetail) -> bool {
    !detail.extract.is_empty() && !detail.media.is_empty()
}
