use rand::Rng;
use site_config::ParticleSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Diameter in px.
    pub size: f64,
}

/// Drifting nodes that wrap around the viewport edges.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f64,
    height: f64,
    link_distance: f64,
}

fn sample<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if lo < hi {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

impl ParticleField {
    pub fn new<R: Rng>(settings: &ParticleSettings, width: f64, height: f64, rng: &mut R) -> Self {
        let particles = (0..settings.count)
            .map(|_| Particle {
                x: sample(rng, 0.0, width),
                y: sample(rng, 0.0, height),
                vx: sample(rng, -settings.max_speed, settings.max_speed),
                vy: sample(rng, -settings.max_speed, settings.max_speed),
                size: sample(rng, settings.min_size, settings.max_size),
            })
            .collect();
        Self::from_particles(particles, width, height, settings.link_distance)
    }

    pub fn from_particles(particles: Vec<Particle>, width: f64, height: f64, link_distance: f64) -> Self {
        Self {
            particles,
            width,
            height,
            link_distance,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        let (w, h) = (self.width, self.height);
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            if p.x < 0.0 {
                p.x = w;
            }
            if p.x > w {
                p.x = 0.0;
            }
            if p.y < 0.0 {
                p.y = h;
            }
            if p.y > h {
                p.y = 0.0;
            }
        }
    }

    /// Segments between every pair closer than the link distance.
    pub fn links(&self) -> Vec<(f64, f64, f64, f64)> {
        let max_sq = self.link_distance * self.link_distance;
        let mut segments = Vec::new();
        for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                let (dx, dy) = (a.x - b.x, a.y - b.y);
                if dx * dx + dy * dy < max_sq {
                    segments.push((a.x, a.y, b.x, b.y));
                }
            }
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn node(x: f64, y: f64, vx: f64, vy: f64) -> Particle {
        Particle {
            x,
            y,
            vx,
            vy,
            size: 4.0,
        }
    }

    #[test]
    fn seeded_field_respects_settings() {
        let settings = ParticleSettings::default();
        let mut rng = StdRng::seed_from_u64(7);
        let field = ParticleField::new(&settings, 800.0, 600.0, &mut rng);
        assert_eq!(field.particles().len(), 50);
        for p in field.particles() {
            assert!((0.0..800.0).contains(&p.x));
            assert!((0.0..600.0).contains(&p.y));
            assert!(p.vx >= -0.5 && p.vx < 0.5);
            assert!(p.size >= 2.0 && p.size < 6.0);
        }
    }

    #[test]
    fn nodes_wrap_at_edges() {
        let mut field = ParticleField::from_particles(
            vec![node(0.2, 50.0, -0.5, 0.0), node(99.8, 99.9, 0.5, 0.4)],
            100.0,
            100.0,
            10.0,
        );
        field.step();
        let ps = field.particles();
        assert_eq!(ps[0].x, 100.0);
        assert_eq!(ps[1].x, 0.0);
        assert_eq!(ps[1].y, 0.0);
    }

    #[test]
    fn only_close_pairs_are_linked() {
        let field = ParticleField::from_particles(
            vec![
                node(0.0, 0.0, 0.0, 0.0),
                node(60.0, 80.0, 0.0, 0.0),
                node(30.0, 0.0, 0.0, 0.0),
            ],
            500.0,
            500.0,
            100.0,
        );
        // (0,0)-(60,80) is exactly 100 apart, so not linked.
        assert_eq!(
            field.links(),
            vec![(0.0, 0.0, 30.0, 0.0), (60.0, 80.0, 30.0, 0.0)]
        );
    }

    #[test]
    fn zero_speed_settings_do_not_panic() {
        let settings = ParticleSettings {
            max_speed: 0.0,
            min_size: 3.0,
            max_size: 3.0,
            ..ParticleSettings::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = ParticleField::new(&settings, 10.0, 10.0, &mut rng);
        let before = field.particles().to_vec();
        field.step();
        assert_eq!(field.particles(), &before[..]);
    }

    #[test]
    fn clock_seeded_fields_are_reproducible() {
        let settings = ParticleSettings::default();
        let seed = 1_700_000_000_000_u64;
        let a = ParticleField::new(&settings, 640.0, 480.0, &mut StdRng::seed_from_u64(seed));
        let b = ParticleField::new(&settings, 640.0, 480.0, &mut StdRng::seed_from_u64(seed));
        assert_eq!(a.particles(), b.particles());
    }
}
