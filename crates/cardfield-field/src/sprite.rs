//! The visual side of a body: its asset and displayed opacity, including fades.

use cardfield_core::AssetRef;

/// Shape of an opacity transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseOut,
}

impl Easing {
    fn apply(self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

#[derive(Debug, Clone)]
struct Fade {
    from: f32,
    elapsed_ms: u64,
    duration_ms: u64,
    easing: Easing,
}

/// What a renderer needs to draw one card.
#[derive(Debug, Clone)]
pub struct Sprite {
    asset: AssetRef,
    opacity: f32,
    fade: Option<Fade>,
}

impl Sprite {
    pub(crate) fn new(asset: AssetRef, opacity: f32) -> Self {
        Self {
            asset,
            opacity,
            fade: None,
        }
    }

    pub fn asset(&self) -> &AssetRef {
        &self.asset
    }

    /// Currently displayed opacity.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Fully faded out with no transition left to run.
    pub fn is_hidden(&self) -> bool {
        self.fade.is_none() && self.opacity <= 0.0
    }

    /// Start fading from the current opacity to zero. Replaces any running fade.
    pub(crate) fn fade_out(&mut self, duration_ms: u64, easing: Easing) {
        self.fade = Some(Fade {
            from: self.opacity,
            elapsed_ms: 0,
            duration_ms,
            easing,
        });
        if duration_ms == 0 {
            self.advance(0);
        }
    }

    pub(crate) fn advance(&mut self, delta_ms: u64) {
        let Some(fade) = self.fade.as_mut() else {
            return;
        };

        fade.elapsed_ms = fade.elapsed_ms.saturating_add(delta_ms);
        if fade.elapsed_ms >= fade.duration_ms {
            self.opacity = 0.0;
            self.fade = None;
            return;
        }

        let t = fade.elapsed_ms as f32 / fade.duration_ms as f32;
        self.opacity = fade.from * (1.0 - fade.easing.apply(t));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite() -> Sprite {
        Sprite::new(AssetRef::Image("card.png".to_string()), 0.8)
    }

    #[test]
    fn test_linear_fade() {
        let mut sprite = sprite();
        sprite.fade_out(500, Easing::Linear);
        sprite.advance(250);
        assert!((sprite.opacity() - 0.4).abs() < 1e-5);
        assert!(sprite.is_fading());

        sprite.advance(250);
        assert_eq!(sprite.opacity(), 0.0);
        assert!(sprite.is_hidden());
    }

    #[test]
    fn test_ease_out_front_loads() {
        let mut sprite = sprite();
        sprite.fade_out(800, Easing::EaseOut);
        sprite.advance(400);
        // Ease-out has covered more than half the distance at the midpoint.
        assert!(sprite.opacity() < 0.4);
        assert!(sprite.opacity() > 0.0);
    }

    #[test]
    fn test_advance_without_fade_is_noop() {
        let mut sprite = sprite();
        sprite.advance(1000);
        assert_eq!(sprite.opacity(), 0.8);
        assert!(!sprite.is_hidden());
    }

    #[test]
    fn test_zero_duration_hides_immediately() {
        let mut sprite = sprite();
        sprite.fade_out(0, Easing::Linear);
        assert!(sprite.is_hidden());
    }
}
