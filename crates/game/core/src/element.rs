//! Elemental affinities and the damage multiplier table.
//!
//! [`calculate_elemental_damage`] is total and side-effect free. Exactly one
//! rule applies per hit, checked in this order:
//!
//! 1. either side has no element: ×1, "No elemental interaction."
//! 2. defender is weak to the attacking element: ×2
//! 3. defender resists the attacking element: ×0.5
//! 4. Light against Dark or Dark against Light: ×1.5
//! 5. otherwise: ×1, "Normal damage."

use strum::{Display, EnumIter, EnumString};

/// Elemental affinity of an attack, spell, piece of equipment or combatant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Element {
    #[default]
    #[strum(serialize = "None")]
    None,
    Fire,
    Water,
    Thunder,
    Ice,
    Earth,
    Wind,
    Light,
    Dark,
}

impl Element {
    /// All real elements, excluding [`Element::None`].
    pub const ALL: [Element; 8] = [
        Element::Fire,
        Element::Water,
        Element::Thunder,
        Element::Ice,
        Element::Earth,
        Element::Wind,
        Element::Light,
        Element::Dark,
    ];

    /// Parses generated content leniently; anything unrecognised is `None`.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.trim().parse().unwrap_or(Element::None)
    }

    /// The element this one takes double damage from.
    pub const fn weakness(self) -> Option<Element> {
        match self {
            Element::Fire => Some(Element::Water),
            Element::Water => Some(Element::Thunder),
            Element::Thunder => Some(Element::Earth),
            Element::Ice => Some(Element::Fire),
            Element::Earth => Some(Element::Wind),
            Element::Wind => Some(Element::Ice),
            Element::Light | Element::Dark | Element::None => None,
        }
    }

    /// The element this one takes half damage from.
    pub const fn resistance(self) -> Option<Element> {
        match self {
            Element::Fire => Some(Element::Ice),
            Element::Water => Some(Element::Fire),
            Element::Thunder => Some(Element::Wind),
            Element::Ice => Some(Element::Water),
            Element::Earth => Some(Element::Thunder),
            Element::Wind => Some(Element::Earth),
            Element::Light | Element::Dark | Element::None => None,
        }
    }

    pub const fn is_none(self) -> bool {
        matches!(self, Element::None)
    }

    const fn is_opposite_pair(attacker: Element, defender: Element) -> bool {
        matches!(
            (attacker, defender),
            (Element::Light, Element::Dark) | (Element::Dark, Element::Light)
        )
    }
}

/// Which elemental rule fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    NoInteraction,
    Weakness,
    Resistance,
    OppositePair,
    Normal,
}

impl Interaction {
    pub const fn multiplier(self) -> f64 {
        match self {
            Interaction::NoInteraction | Interaction::Normal => 1.0,
            Interaction::Weakness => 2.0,
            Interaction::Resistance => 0.5,
            Interaction::OppositePair => 1.5,
        }
    }
}

/// Result of an elemental damage calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementalDamage {
    pub damage: i32,
    pub interaction: Interaction,
    pub explanation: String,
}

/// Classifies an attacker/defender element pair.
pub fn interaction(attacker: Element, defender: Element) -> Interaction {
    if attacker.is_none() || defender.is_none() {
        Interaction::NoInteraction
    } else if defender.weakness() == Some(attacker) {
        Interaction::Weakness
    } else if defender.resistance() == Some(attacker) {
        Interaction::Resistance
    } else if Element::is_opposite_pair(attacker, defender) {
        Interaction::OppositePair
    } else {
        Interaction::Normal
    }
}

/// Scales `base_damage` by the elemental interaction, truncating to an integer.
pub fn calculate_elemental_damage(
    base_damage: i32,
    attacker: Element,
    defender: Element,
) -> ElementalDamage {
    let interaction = interaction(attacker, defender);
    let explanation = match interaction {
        Interaction::NoInteraction => "No elemental interaction.".to_string(),
        Interaction::Weakness => format!("{defender} is weak against {attacker}!"),
        Interaction::Resistance => format!("{defender} resists {attacker}!"),
        Interaction::OppositePair => format!("{attacker} is strong against {defender}!"),
        Interaction::Normal => "Normal damage.".to_string(),
    };
    let damage = (base_damage as f64 * interaction.multiplier()) as i32;
    ElementalDamage {
        damage,
        interaction,
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weakness_doubles_damage() {
        for defender in Element::ALL {
            if let Some(attacker) = defender.weakness() {
                let result = calculate_elemental_damage(40, attacker, defender);
                assert_eq!(result.damage, 80, "{attacker} vs {defender}");
                assert_eq!(
                    result.explanation,
                    format!("{defender} is weak against {attacker}!")
                );
            }
        }
    }

    #[test]
    fn resistance_halves_damage() {
        for defender in Element::ALL {
            if let Some(attacker) = defender.resistance() {
                let result = calculate_elemental_damage(41, attacker, defender);
                assert_eq!(result.damage, 20, "{attacker} vs {defender}");
                assert_eq!(result.interaction, Interaction::Resistance);
            }
        }
    }

    #[test]
    fn light_and_dark_are_strong_against_each_other() {
        let light = calculate_elemental_damage(10, Element::Light, Element::Dark);
        let dark = calculate_elemental_damage(10, Element::Dark, Element::Light);
        assert_eq!(light.damage, 15);
        assert_eq!(dark.damage, 15);
        assert_eq!(light.explanation, "Light is strong against Dark!");
    }

    #[test]
    fn none_on_either_side_is_neutral() {
        for element in Element::ALL {
            let a = calculate_elemental_damage(33, Element::None, element);
            let b = calculate_elemental_damage(33, element, Element::None);
            assert_eq!(a.damage, 33);
            assert_eq!(b.damage, 33);
            assert_eq!(a.explanation, "No elemental interaction.");
        }
    }

    #[test]
    fn unrelated_pair_is_normal_damage() {
        let result = calculate_elemental_damage(25, Element::Fire, Element::Earth);
        assert_eq!(result.damage, 25);
        assert_eq!(result.explanation, "Normal damage.");
    }

    #[test]
    fn lenient_parse_defaults_to_none() {
        assert_eq!(Element::parse_lenient("fire"), Element::Fire);
        assert_eq!(Element::parse_lenient(" Thunder "), Element::Thunder);
        assert_eq!(Element::parse_lenient("Plasma"), Element::None);
    }
}
