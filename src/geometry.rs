use bevy::math::Vec2;

/// Axis-aligned box for cursor hit tests. Min edges are inclusive, max
/// edges exclusive, so adjacent boxes never both claim a point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub size: Vec2,
}

impl Bounds {
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size / 2.0,
            size,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x < self.min.x + self.size.x
            && point.y >= self.min.y
            && point.y < self.min.y + self.size.y
    }
}
