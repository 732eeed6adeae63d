use rand::Rng;

/// Canvas dots per particle along the horizontal axis.
pub const DOTS_PER_PARTICLE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub speed_x: f64,
    pub speed_y: f64,
    pub size: f64,
    pub alpha: f64,
}

/// Drifting background dots. Plain Euler steps with elastic bounces off the
/// four edges; nothing here knows about audio.
#[derive(Debug, Clone)]
pub struct ParticleField {
    width: f64,
    height: f64,
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_rng(width, height, &mut rand::rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(width: f64, height: f64, rng: &mut R) -> Self {
        let mut field = Self {
            width,
            height,
            particles: Vec::new(),
        };
        field.seed(rng);
        field
    }

    fn seed<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let count = (self.width / DOTS_PER_PARTICLE).floor().max(0.0) as usize;
        let (width, height) = (self.width, self.height);

        self.particles = (0..count)
            .map(|_| Particle {
                x: rng.random::<f64>() * width,
                y: rng.random::<f64>() * height,
                size: rng.random::<f64>() * 2.0 + 0.5,
                speed_x: (rng.random::<f64>() - 0.5) * 0.2,
                speed_y: (rng.random::<f64>() - 0.5) * 0.2,
                alpha: rng.random::<f64>() * 0.5 + 0.1,
            })
            .collect();
    }

    /// Replaces the whole set for the new canvas size.
    pub fn resize(&mut self, width: f64, height: f64) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.seed(&mut rand::rng());
    }

    pub fn step(&mut self) {
        for p in &mut self.particles {
            p.x += p.speed_x;
            p.y += p.speed_y;

            if p.x < 0.0 || p.x > self.width {
                p.speed_x = -p.speed_x;
            }
            if p.y < 0.0 || p.y > self.height {
                p.speed_y = -p.speed_y;
            }
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}
