use core::ops::{BitOr, BitOrAssign};

use crate::{Bounds, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Classification of the geometry a probe can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Layer {
    Floor,
    Prop,
    Door,
}

impl Layer {
    pub const fn mask(self) -> LayerMask {
        match self {
            Layer::Floor => LayerMask::FLOOR,
            Layer::Prop => LayerMask::PROPS,
            Layer::Door => LayerMask::DOORS,
        }
    }
}

/// Set of layers a probe should consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const FLOOR: Self = Self(1 << 20);
    pub const PROPS: Self = Self(1 << 22);
    pub const DOORS: Self = Self(1 << 23);

    pub const fn contains(self, layer: Layer) -> bool {
        self.0 & layer.mask().0 != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for LayerMask {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// Opaque handle to an engine-owned world object (tile, crate, door...).
///
/// The navigation core stores these but never dereferences them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProbeHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub layer: Layer,
    pub object: Option<ObjectId>,
}

/// Vertical raycast capability supplied by the host world.
pub trait SurfaceProbe {
    /// Cast a ray straight down from `origin`, up to `max_distance` units.
    ///
    /// Returns the nearest hit among `mask` layers, if any.
    fn cast_down(&self, origin: Vec3, max_distance: f32, mask: LayerMask) -> Option<ProbeHit>;
}

/// World-space extent of the area bots may navigate.
pub trait NavigableArea {
    fn bounds(&self) -> Bounds;
}

impl<T: SurfaceProbe + ?Sized> SurfaceProbe for &T {
    fn cast_down(&self, origin: Vec3, max_distance: f32, mask: LayerMask) -> Option<ProbeHit> {
        (**self).cast_down(origin, max_distance, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_union_contains_members_only() {
        let mask = LayerMask::FLOOR | LayerMask::DOORS;
        assert!(mask.contains(Layer::Floor));
        assert!(mask.contains(Layer::Door));
        assert!(!mask.contains(Layer::Prop));
        assert!(!LayerMask::NONE.contains(Layer::Floor));
    }
}
