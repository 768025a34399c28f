/// Vertical extent of one rendered list row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemRect {
    pub top: f32,
    pub height: f32,
    /// Ordinal position of the row's record in the list.
    pub index: usize,
}

impl ItemRect {
    pub fn new(top: f32, height: f32, index: usize) -> Self {
        ItemRect { top, height, index }
    }

    pub fn middle(&self) -> f32 {
        self.top + self.height / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSide {
    Above,
    Below,
}

/// Where to draw the insertion marker: on which row and on which edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropMarker {
    pub index: usize,
    pub side: MarkerSide,
}

/// Picks the row whose midpoint is nearest the pointer. A pointer exactly on
/// the midpoint counts as below it.
pub fn resolve_drop_marker(pointer_y: f32, rects: &[ItemRect]) -> Option<DropMarker> {
    let nearest = rects.iter().min_by(|a, b| {
        (a.middle() - pointer_y)
            .abs()
            .total_cmp(&(b.middle() - pointer_y).abs())
    })?;
    let side = if pointer_y < nearest.middle() {
        MarkerSide::Above
    } else {
        MarkerSide::Below
    };
    Some(DropMarker {
        index: nearest.index,
        side,
    })
}

/// Ordinal index a dropped item should be inserted at. Rows are ordered by
/// `top`; an empty list resolves to 0 and a pointer below the last row to the
/// position after it.
pub fn resolve_insertion_index(pointer_y: f32, rects: &[ItemRect]) -> usize {
    let Some(marker) = resolve_drop_marker(pointer_y, rects) else {
        return 0;
    };
    match marker.side {
        MarkerSide::Above => marker.index,
        MarkerSide::Below => {
            let position = rects.iter().position(|r| r.index == marker.index);
            position
                .and_then(|p| rects.get(p + 1))
                .map(|next| next.index)
                .unwrap_or(marker.index + 1)
        }
    }
}
