use num::{Float, Num};
use std::fmt::Display;
use std::ops::{Add, Mul, Sub};

/// A 2D vector generic over any numeric type.
///
/// Used for the planar position of the vehicle. Positions are unbounded, so
/// no wrapping or clamping happens here.
///
/// # Type Parameters
/// * `T` - The functionality for the vector depends on traits implemented by `T`.
/// Serialized as an `(x, y)` pair.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, serde::Serialize, serde::Deserialize)]
#[serde(
    into = "(T, T)",
    from = "(T, T)",
    bound(serialize = "T: Copy + serde::Serialize", deserialize = "T: serde::Deserialize<'de>")
)]
pub struct Vec2D<T> {
    /// The x-component of the vector, the primary axis for evasive shifts.
    x: T,
    /// The y-component of the vector.
    y: T,
}

impl<T: Copy> Vec2D<T> {
    /// Creates a new vector with the given x and y components.
    pub const fn new(x: T, y: T) -> Self { Self { x, y } }

    /// Returns the x-component of the vector.
    pub const fn x(&self) -> T { self.x }

    /// Returns the y-component of the vector.
    pub const fn y(&self) -> T { self.y }
}

impl<T: Num + Copy> Vec2D<T> {
    /// Creates a zero vector (x = 0, y = 0).
    pub fn zero() -> Self { Self::new(T::zero(), T::zero()) }

    /// Returns a copy of this vector shifted along the x-axis only.
    pub fn shifted_x(self, dx: T) -> Self { Self::new(self.x + dx, self.y) }
}

impl<T: Float> Vec2D<T> {
    /// Computes the magnitude (absolute value) of the vector.
    pub fn abs(&self) -> T { (self.x.powi(2) + self.y.powi(2)).sqrt() }

    /// Computes the Euclidean distance between the current vector and another vector.
    pub fn euclid_distance(&self, other: &Self) -> T { (*self - *other).abs() }

    /// Checks if the current vector is within a radius of another vector.
    /// A radius of zero demands exact equality.
    pub fn in_radius_of(&self, other: &Self, rad: T) -> bool {
        self.euclid_distance(other) <= rad
    }

    /// `true` if neither component is `NaN` or infinite.
    pub fn is_finite(&self) -> bool { self.x.is_finite() && self.y.is_finite() }
}

impl<T: Num> Add for Vec2D<T> {
    type Output = Vec2D<T>;

    fn add(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl<T: Num> Sub for Vec2D<T> {
    type Output = Vec2D<T>;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl<T: Num + Copy> Mul<T> for Vec2D<T> {
    type Output = Vec2D<T>;

    fn mul(self, rhs: T) -> Self::Output {
        Self::Output {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl<T> From<(T, T)> for Vec2D<T> {
    /// Creates a `Vec2D` from a tuple of (x, y) values.
    fn from(tuple: (T, T)) -> Self {
        Vec2D {
            x: tuple.0,
            y: tuple.1,
        }
    }
}

impl<T> From<Vec2D<T>> for (T, T) {
    fn from(vec: Vec2D<T>) -> Self { (vec.x, vec.y) }
}

impl<T: Display> Display for Vec2D<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}
