//! Bounding primitives.
//!
//! [`TVec3`], [`BVec3`], [`Aabb`]

use std::{
    array::from_fn,
    fmt::{Debug, Display},
    mem,
    ops::{Add, AddAssign, Mul, Sub, SubAssign},
};

use num::{cast, Float, NumCast};

/// Scalar type of the tree's geometry.
///
/// Implemented for `f32` and `f64`.
pub trait Real: Float + NumCast + AddAssign + SubAssign + Display + Debug + Default {}
impl Real for f32 {}
impl Real for f64 {}

/// Tree Vec3.
///
/// Inner type should be any [`Real`]: `f32` or `f64`.
#[derive(Default, Debug, PartialEq, Clone, Copy)]
pub struct TVec3<R: Real> {
    pub x: R,
    pub y: R,
    pub z: R,
}

impl<R: Real> Add for TVec3<R> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        TVec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl<R: Real> Sub for TVec3<R> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        TVec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl<R: Real> AddAssign for TVec3<R> {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl<R: Real> SubAssign for TVec3<R> {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl<R: Real> Mul<R> for TVec3<R> {
    type Output = Self;

    fn mul(self, scalar: R) -> Self {
        TVec3 {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl<R: Real> Display for TVec3<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TVec3: x: {}, y: {}, z: {}", self.x, self.y, self.z)
    }
}

impl<R: Real> TVec3<R> {
    pub fn new(x: R, y: R, z: R) -> Self {
        TVec3 { x, y, z }
    }

    pub fn splat(value: R) -> Self {
        TVec3 {
            x: value,
            y: value,
            z: value,
        }
    }

    pub fn zero() -> Self {
        TVec3::splat(R::zero())
    }

    /// Euclidean length.
    pub fn length(&self) -> R {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Componentwise minimum.
    pub fn min(&self, other: Self) -> Self {
        TVec3 {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
            z: self.z.min(other.z),
        }
    }

    /// Componentwise maximum.
    pub fn max(&self, other: Self) -> Self {
        TVec3 {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
            z: self.z.max(other.z),
        }
    }

    pub fn lt(&self, other: Self) -> BVec3 {
        BVec3::new(self.x < other.x, self.y < other.y, self.z < other.z)
    }

    pub fn gt(&self, other: Self) -> BVec3 {
        BVec3::new(self.x > other.x, self.y > other.y, self.z > other.z)
    }

    pub fn le(&self, other: Self) -> BVec3 {
        BVec3::new(self.x <= other.x, self.y <= other.y, self.z <= other.z)
    }

    pub fn ge(&self, other: Self) -> BVec3 {
        BVec3::new(self.x >= other.x, self.y >= other.y, self.z >= other.z)
    }
}

/// Boolean Vec3 mask.
#[derive(Default, Clone, Copy, PartialEq, Debug)]
pub struct BVec3 {
    x: bool,
    y: bool,
    z: bool,
}

impl BVec3 {
    fn new(x: bool, y: bool, z: bool) -> Self {
        BVec3 { x, y, z }
    }

    pub fn all(&self) -> bool {
        self.x && self.y && self.z
    }

    pub fn any(&self) -> bool {
        self.x || self.y || self.z
    }

    pub fn none(&self) -> bool {
        !self.x && !self.y && !self.z
    }
}

/// Axis Aligned Bounding Box.
///
/// Holds the invariant `mins[axis] <= maxs[axis]` on every axis.
/// Construction from two arbitrary corners repairs inverted axes
/// by swapping the offending components ([`Aabb::fix`]).
///
/// Equality is exact component comparison. Do not rely on it for boxes
/// produced by differing sequences of float arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb<R: Real> {
    pub mins: TVec3<R>,
    pub maxs: TVec3<R>,
}

impl<R: Real> Default for Aabb<R> {
    fn default() -> Self {
        Self {
            mins: TVec3::zero(),
            maxs: TVec3::splat(R::one()),
        }
    }
}

impl<R: Real> Display for Aabb<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Aabb(mins: {}, maxs: {})", self.mins, self.maxs)
    }
}

impl<R: Real> Aabb<R> {
    /// Creates a new [`Aabb`] from two arbitrary corners.
    ///
    /// Inverted axes are repaired, so the corners may be given in any order.
    pub fn new(a: TVec3<R>, b: TVec3<R>) -> Self {
        let mut aabb = Aabb { mins: a, maxs: b };
        aabb.fix();
        aabb
    }

    /// Creates a new [`Aabb`] without repairing the corner order.
    pub fn new_unchecked(mins: TVec3<R>, maxs: TVec3<R>) -> Self {
        Aabb { mins, maxs }
    }

    /// Swaps any inverted min/max axis pair. Idempotent.
    pub fn fix(&mut self) {
        if self.mins.x > self.maxs.x {
            mem::swap(&mut self.mins.x, &mut self.maxs.x);
        }
        if self.mins.y > self.maxs.y {
            mem::swap(&mut self.mins.y, &mut self.maxs.y);
        }
        if self.mins.z > self.maxs.z {
            mem::swap(&mut self.mins.z, &mut self.maxs.z);
        }
    }

    /// Expands the box componentwise to include `point`.
    pub fn expand(&mut self, point: TVec3<R>) {
        self.mins = self.mins.min(point);
        self.maxs = self.maxs.max(point);
    }

    /// Inclusive containment test on all three axes.
    pub fn is_inside(&self, point: TVec3<R>) -> bool {
        self.mins.le(point).all() && self.maxs.ge(point).all()
    }

    pub fn centre(&self) -> TVec3<R> {
        (self.mins + self.maxs) * cast(0.5).unwrap()
    }

    /// Half-size per axis: `maxs - centre`.
    pub fn extents(&self) -> TVec3<R> {
        self.maxs - self.centre()
    }

    /// Euclidean distance from `mins` to `maxs`.
    ///
    /// Used as a node size proxy by subdivision heuristics.
    pub fn diagonal(&self) -> R {
        (self.maxs - self.mins).length()
    }

    pub fn volume(&self) -> R {
        let d = self.maxs - self.mins;
        d.x * d.y * d.z
    }

    /// The 8 corners in a fixed winding: top face (`maxs.z`) clockwise,
    /// then bottom face (`mins.z`) clockwise.
    ///
    /// Wireframe renderers rely on this order.
    pub fn corners(&self) -> [TVec3<R>; 8] {
        [
            TVec3::new(self.mins.x, self.mins.y, self.maxs.z),
            TVec3::new(self.mins.x, self.maxs.y, self.maxs.z),
            TVec3::new(self.maxs.x, self.maxs.y, self.maxs.z),
            TVec3::new(self.maxs.x, self.mins.y, self.maxs.z),
            TVec3::new(self.mins.x, self.mins.y, self.mins.z),
            TVec3::new(self.mins.x, self.maxs.y, self.mins.z),
            TVec3::new(self.maxs.x, self.maxs.y, self.mins.z),
            TVec3::new(self.maxs.x, self.mins.y, self.mins.z),
        ]
    }

    /// Child box for octant `index` in `0..8`.
    ///
    /// Bit 0 selects the x corner, bit 1 the y corner, bit 2 the z corner
    /// (`0` = `mins`, `1` = `maxs`). The selected corner is combined with
    /// the centre and repaired into min/max order.
    pub fn octant(&self, index: usize) -> Aabb<R> {
        let corner = TVec3::new(
            if index & 0b1 != 0 { self.maxs.x } else { self.mins.x },
            if index & 0b10 != 0 { self.maxs.y } else { self.mins.y },
            if index & 0b100 != 0 { self.maxs.z } else { self.mins.z },
        );
        Aabb::new(corner, self.centre())
    }

    /// All 8 octants in table order.
    #[inline]
    pub fn split(&self) -> [Aabb<R>; 8] {
        from_fn(|i| self.octant(i))
    }

    /// Inclusive box/box overlap test.
    pub fn overlaps(&self, other: &Aabb<R>) -> bool {
        self.mins.le(other.maxs).all() && self.maxs.ge(other.mins).all()
    }

    /// The overlapping region of two boxes, if any.
    pub fn intersection(&self, other: &Aabb<R>) -> Option<Aabb<R>> {
        let mins = self.mins.max(other.mins);
        let maxs = self.maxs.min(other.maxs);
        if mins.le(maxs).all() {
            Some(Aabb::new_unchecked(mins, maxs))
        } else {
            None
        }
    }
}

/// Union: grows a box to cover another box's corners.
impl<R: Real> Add for Aabb<R> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Aabb::new_unchecked(self.mins.min(other.mins), self.maxs.max(other.maxs))
    }
}

impl<R: Real> AddAssign for Aabb<R> {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}
