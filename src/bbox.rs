//! Bounding-box geometry used by the resize transforms

use crate::voc::VocObject;

/// Distance in pixels below which a box counts as touching an image border
pub const BORDER_TOLERANCE: f64 = 3.5;

/// Boxes with a side shorter than this are dropped when saving
pub const DEFAULT_MIN_SIZE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub name: String,
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    pub fn new(name: &str, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            name: name.to_string(),
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn from_object(object: &VocObject) -> Self {
        Self::new(
            &object.name.to_lowercase(),
            object.bndbox.xmin,
            object.bndbox.ymin,
            object.bndbox.xmax,
            object.bndbox.ymax,
        )
    }

    /// Convert back to a VOC object with integral (half-to-even) coordinates,
    /// never `-0`
    pub fn to_object(&self) -> VocObject {
        VocObject::new(
            &self.name,
            self.xmin.round_ties_even() + 0.0,
            self.ymin.round_ties_even() + 0.0,
            self.xmax.round_ties_even() + 0.0,
            self.ymax.round_ties_even() + 0.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn center_x(&self) -> f64 {
        (self.xmin + self.xmax) / 2.0
    }

    pub fn center_y(&self) -> f64 {
        (self.ymin + self.ymax) / 2.0
    }

    pub fn scale(&mut self, scale_x: f64, scale_y: f64) {
        self.xmin *= scale_x;
        self.ymin *= scale_y;
        self.xmax *= scale_x;
        self.ymax *= scale_y;
    }

    /// Scale relative to the point (`center_x`, `center_y`)
    pub fn scale_to_center(&mut self, scale_x: f64, scale_y: f64, center_x: f64, center_y: f64) {
        self.xmin = center_x + (self.xmin - center_x) * scale_x;
        self.ymin = center_y + (self.ymin - center_y) * scale_y;
        self.xmax = center_x + (self.xmax - center_x) * scale_x;
        self.ymax = center_y + (self.ymax - center_y) * scale_y;
    }

    /// Move the box into the coordinate system of a window starting at (`x`, `y`)
    pub fn translate(&mut self, x: f64, y: f64) {
        self.xmin -= x;
        self.ymin -= y;
        self.xmax -= x;
        self.ymax -= y;
    }

    pub fn clamp(&mut self, image_width: f64, image_height: f64) {
        self.xmin = clamp(self.xmin, 0.0, image_width);
        self.ymin = clamp(self.ymin, 0.0, image_height);
        self.xmax = clamp(self.xmax, 0.0, image_width);
        self.ymax = clamp(self.ymax, 0.0, image_height);
    }

    pub fn is_empty(&self, min_size: f64) -> bool {
        self.width() < min_size || self.height() < min_size
    }

    pub fn is_touching_left_border(&self) -> bool {
        self.xmin <= BORDER_TOLERANCE
    }

    pub fn is_touching_top_border(&self) -> bool {
        self.ymin <= BORDER_TOLERANCE
    }

    pub fn is_touching_right_border(&self, image_width: f64) -> bool {
        self.xmax >= image_width - BORDER_TOLERANCE
    }

    pub fn is_touching_bottom_border(&self, image_height: f64) -> bool {
        self.ymax >= image_height - BORDER_TOLERANCE
    }

    pub fn is_touching_border(&self, image_width: f64, image_height: f64) -> bool {
        self.is_touching_left_border()
            || self.is_touching_top_border()
            || self.is_touching_right_border(image_width)
            || self.is_touching_bottom_border(image_height)
    }

    /// Share of `image_width` covered by the box, with `padding` added on
    /// every side that does not touch the border
    pub fn percent_w(&self, image_width: f64, padding: f64) -> f64 {
        let open_sides = u8::from(!self.is_touching_left_border())
            + u8::from(!self.is_touching_right_border(image_width));
        (self.width() + f64::from(open_sides) * padding) / image_width
    }

    pub fn percent_h(&self, image_height: f64, padding: f64) -> f64 {
        let open_sides = u8::from(!self.is_touching_top_border())
            + u8::from(!self.is_touching_bottom_border(image_height));
        (self.height() + f64::from(open_sides) * padding) / image_height
    }

    /// Smallest unnamed box enclosing all `boxes`, `None` for an empty slice
    pub fn union(boxes: &[BoundingBox]) -> Option<BoundingBox> {
        let first = boxes.first()?;
        let combined = boxes.iter().skip(1).fold(first.clone(), |acc, b| {
            BoundingBox::new(
                "",
                acc.xmin.min(b.xmin),
                acc.ymin.min(b.ymin),
                acc.xmax.max(b.xmax),
                acc.ymax.max(b.ymax),
            )
        });
        Some(BoundingBox {
            name: String::new(),
            ..combined
        })
    }
}

/// `max(min, min(max, value))`; never panics when `min > max`, `min` wins
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    let upper = if value > max { max } else { value };
    if upper < min {
        min
    } else {
        upper
    }
}
