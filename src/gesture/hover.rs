use crate::device::Viewport;

// Tooltip box is roughly 150x100, keep it on screen
const TOOLTIP_WIDTH: i32 = 150;
const TOOLTIP_HEIGHT: i32 = 100;
const OFFSET: i32 = 10;
const FLIP_X: i32 = -160;
const FLIP_Y: i32 = -110;

/// Where the controls tooltip goes for a pointer at `(x, y)`: just below-right
/// of the pointer, flipped to the other side when it would run off an edge.
pub fn tooltip_anchor(x: i32, y: i32, viewport: Viewport) -> (i32, i32) {
    let dx = if x + TOOLTIP_WIDTH > viewport.width as i32 {
        FLIP_X
    } else {
        OFFSET
    };
    let dy = if y + TOOLTIP_HEIGHT > viewport.height as i32 {
        FLIP_Y
    } else {
        OFFSET
    };
    (x + dx, y + dy)
}

/// Mouse hover state: the quote reveals the video, the photo shows the
/// controls tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoverState {
    pub photo_hovered: bool,
    pub text_hovered: bool,
    pub tooltip: Option<(i32, i32)>,
}

impl HoverState {
    pub fn enter_photo(&mut self) {
        self.photo_hovered = true;
    }

    pub fn leave_photo(&mut self) {
        self.photo_hovered = false;
        self.tooltip = None;
    }

    pub fn pointer_moved(&mut self, x: i32, y: i32, viewport: Viewport) {
        if self.photo_hovered {
            self.tooltip = Some(tooltip_anchor(x, y, viewport));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tooltip_flips_near_edges() {
        let viewport = Viewport::new(1200, 800);
        assert_eq!(tooltip_anchor(100, 100, viewport), (110, 110));
        assert_eq!(tooltip_anchor(1100, 100, viewport), (940, 110));
        assert_eq!(tooltip_anchor(100, 750, viewport), (110, 640));
        assert_eq!(tooltip_anchor(1100, 750, viewport), (940, 640));
    }

    #[test]
    fn tooltip_only_while_photo_hovered() {
        let viewport = Viewport::new(1200, 800);
        let mut hover = HoverState::default();
        hover.pointer_moved(10, 10, viewport);
        assert_eq!(hover.tooltip, None);

        hover.enter_photo();
        hover.pointer_moved(10, 10, viewport);
        assert_eq!(hover.tooltip, Some((20, 20)));

        hover.leave_photo();
        assert_eq!(hover.tooltip, None);
    }
}
