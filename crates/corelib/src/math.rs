pub use glam::*;

/// Pixel rectangle. `origin` is inside the rect, `origin + size` is not.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub origin: IVec2,
    pub size: IVec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            origin: IVec2::new(x, y),
            size: IVec2::new(width, height),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: IVec2, size: IVec2) -> Self {
        Self { origin, size }
    }

    /// Rect covering the whole `size` starting at zero
    #[inline]
    pub fn from_size(size: UVec2) -> Self {
        Self::new(0, 0, size.x as _, size.y as _)
    }

    #[inline]
    pub fn from_min_max(min: IVec2, max: IVec2) -> Self {
        Self {
            origin: min,
            size: max - min,
        }
    }

    /// Rect of `size` whose center is as close as possible to `center`
    #[inline]
    pub fn from_center(center: IVec2, size: IVec2) -> Self {
        Self {
            origin: center - size / 2,
            size,
        }
    }

    #[inline]
    pub const fn x(&self) -> i32 {
        self.origin.x
    }

    #[inline]
    pub const fn y(&self) -> i32 {
        self.origin.y
    }

    #[inline]
    pub const fn width(&self) -> i32 {
        self.size.x
    }

    #[inline]
    pub const fn height(&self) -> i32 {
        self.size.y
    }

    #[inline]
    pub fn min(&self) -> IVec2 {
        self.origin
    }

    #[inline]
    pub fn max(&self) -> IVec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn center(&self) -> IVec2 {
        self.origin + self.size / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    /// Overlapping area of both rects, `None` if they do not share a pixel
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let min = self.min().max(other.min());
        let max = self.max().min(other.max());
        let rect = Rect::from_min_max(min, max);
        (!rect.is_empty()).then_some(rect)
    }

    #[inline]
    pub fn translate(&self, offset: IVec2) -> Rect {
        Rect {
            origin: self.origin + offset,
            size: self.size,
        }
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {}x{})",
            self.origin.x, self.origin.y, self.size.x, self.size.y
        )
    }
}
