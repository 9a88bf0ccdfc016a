use crate::layer::LayerStack;
use crate::vector::Vec3;

/// A photon packet.
#[derive(Debug, Clone, PartialEq)]
pub struct Photon {
    /// Cartesian position [cm].
    pub position: Vec3<f64>,
    /// Direction cosines.
    pub direction: Vec3<f64>,
    pub weight: f64,
    pub alive: bool,
    /// Index of the layer the packet resides in.
    pub layer: usize,
    /// Current step size [cm].
    pub s: f64,
    /// Unfinished step left after hitting a boundary, dimensionless.
    pub sleft: f64,
}

impl Photon {
    /// Launch a packet at the origin, heading straight down. If the first layer is glass the
    /// packet starts at the top of the second layer.
    pub fn launch(rspecular: f64, layers: &LayerStack) -> Photon {
        let mut photon = Photon {
            position: Vec3::new(0.0, 0.0, 0.0),
            direction: Vec3::new(0.0, 0.0, 1.0),
            weight: 1.0 - rspecular,
            alive: true,
            layer: 1,
            s: 0.0,
            sleft: 0.0,
        };

        if layers.layer(1).is_glass() {
            photon.layer = 2;
            photon.position.z = layers.layer(2).z0;
        }
        photon
    }

    /// Move the packet `s` along its direction.
    pub fn hop(&mut self) {
        self.position = self.position + self.direction * self.s;
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }
}
