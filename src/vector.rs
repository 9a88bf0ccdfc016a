use std::ops::{Add, Mul};
use num_traits::Float;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vec3<T> where T: Copy {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vec3<T> where T: Copy {
    pub fn new(x: T, y: T, z: T) -> Vec3<T> {
        Vec3 {x, y, z}
    }
}

impl<T> Vec3<T> where T: Mul<Output = T> + Add<Output = T> + Copy {
    pub fn dot(&self, other: Self) -> T {
        self.x.mul(other.x).add(self.y.mul(other.y)).add(self.z.mul(other.z))
    }
}

impl<T> Vec3<T> where T: Float {
    pub fn norm_squared(&self) -> T {
        self.dot(*self)
    }

    /// Distance from the z axis.
    pub fn radius(&self) -> T {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl<T> Add for Vec3<T> where T: Add<Output = T> + Copy {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T> Mul<T> for Vec3<T> where T: Mul<Output = T> + Copy {
    type Output = Self;

    fn mul(self, rhs: T) -> Self::Output {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}
