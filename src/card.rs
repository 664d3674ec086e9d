use bevy::color::Color;
use bevy::log::info;

// COLORS - one per state, matched pairs go green
pub const OBTAINED_COLOR: Color = Color::srgb(0.5, 1.0, 0.5);
pub const FAILED_COLOR: Color = Color::srgb(1.0, 0.5, 0.5);
pub const OPENED_COLOR: Color = Color::srgb(0.5, 0.5, 1.0);
pub const HOVER_COLOR: Color = Color::srgb(0.0, 1.0, 1.0);

pub const HIDDEN_LABEL: &str = "???";

/// Seconds a mismatched pair stays red before flipping back over.
pub const FAIL_TIMEOUT: f32 = 1.0;

/// Face-down / opened / obtained / failed, tracked per card. `failed`
/// holds the failure timestamp so the red flash can expire on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CardState {
    pub opened: bool,
    pub obtained: bool,
    pub failed: Option<f32>,
}

impl CardState {
    /// A click toggles the card. Obtained and failed cards ignore clicks;
    /// opening (but not closing) is refused while `can_open` is false,
    /// which caps the board at two simultaneously opened cards.
    pub fn click(&mut self, can_open: bool) -> bool {
        if self.obtained || self.failed.is_some() {
            return false;
        }
        if self.opened {
            self.opened = false;
            true
        } else if can_open {
            self.opened = true;
            true
        } else {
            false
        }
    }

    /// Terminal: a matched card never transitions again.
    pub fn obtain(&mut self) {
        self.obtained = true;
        self.opened = false;
    }

    pub fn fail(&mut self, now: f32) {
        self.failed = Some(now);
        self.opened = false;
    }

    /// The red flash expires after [`FAIL_TIMEOUT`] and the card goes back
    /// face down.
    pub fn clear_failed(&mut self, now: f32) {
        if let Some(at) = self.failed {
            if now - at > FAIL_TIMEOUT {
                self.failed = None;
            }
        }
    }

    pub fn label(&self, value: &str, cheat: bool) -> String {
        if self.opened || self.obtained || self.failed.is_some() || cheat {
            value.to_string()
        } else {
            HIDDEN_LABEL.to_string()
        }
    }

    /// State-priority fill color; hidden cards pulse toward near-black and
    /// hovered ones shimmer cyan, both on wall-clock sine waves.
    pub fn fill_color(&self, hovering: bool, now: f32) -> Color {
        if self.obtained {
            OBTAINED_COLOR
        } else if self.failed.is_some() {
            FAILED_COLOR
        } else if self.opened {
            OPENED_COLOR
        } else if hovering {
            modify_color(HOVER_COLOR, 0.8 + 0.2 * (now * 9.0).sin())
        } else {
            Color::srgb(0.0, 0.0, (255.0 - 50.0 * now.sin().abs()) / 255.0)
        }
    }
}

/// Per-channel multiply with clamping; the shadow, border and label tints
/// are all derived from the fill color this way.
pub fn modify_color(color: Color, factor: f32) -> Color {
    let c = color.to_srgba();
    Color::srgb(
        (c.red * factor).clamp(0.0, 1.0),
        (c.green * factor).clamp(0.0, 1.0),
        (c.blue * factor).clamp(0.0, 1.0),
    )
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PairOutcome {
    Matched,
    Mismatched,
}

/// Match evaluator, run once per frame after click dispatch. Exactly two
/// opened cards is the only actionable state: equal values obtain both,
/// differing values fail both.
pub fn evaluate_board<'a, I>(cards: I, now: f32) -> Option<PairOutcome>
where
    I: IntoIterator<Item = (&'static str, &'a mut CardState)>,
{
    let mut opened: Vec<_> = cards
        .into_iter()
        .filter(|(_, state)| state.opened)
        .collect();
    if opened.len() != 2 {
        return None;
    }
    let Some((second_value, second)) = opened.pop() else {
        return None;
    };
    let Some((first_value, first)) = opened.pop() else {
        return None;
    };
    if first_value == second_value {
        info!("matched pair: {first_value}");
        first.obtain();
        second.obtain();
        Some(PairOutcome::Matched)
    } else {
        first.fail(now);
        second.fail(now);
        Some(PairOutcome::Mismatched)
    }
}
