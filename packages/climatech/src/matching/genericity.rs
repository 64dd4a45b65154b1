//! Local guard against generic relations.
//!
//! Runs on related judgments regardless of the model's own score. A
//! rationale that only restates a shared abstract topic, without naming
//! entities, metrics or specific technologies, is rejected.

use lazy_static::lazy_static;
use regex::{Regex, RegexSet};

use crate::config::MatcherConfig;
use crate::text::char_len;

lazy_static! {
    static ref GENERIC_PHRASES: RegexSet = RegexSet::new([
        r"(?i)ambos hablan de",
        r"(?i)ambos mencionan",
        r"(?i)ambos tratan de",
        r"(?i)ambos se relacionan con",
        r"(?i)temas similares",
        r"(?i)temas relacionados",
        r"(?i)temática similar",
        r"(?i)temática relacionada",
        r"(?i)sin detalles específicos",
        r"(?i)no hay menciones específicas",
        r"(?i)relación general",
        r"(?i)conexión general",
        r"(?i)muy general",
        r"(?i)demasiado general",
        r"(?i)cubre muchos temas",
        r"(?i)múltiples verticales",
    ])
    .unwrap();
    static ref NAMED_ENTITY: Regex = Regex::new(
        r"(?i)(empresa|startup|tecnología|producto|proyecto|planta|instalación|país|ciudad|región)"
    )
    .unwrap();
    static ref METRIC: Regex = Regex::new(
        r"(?i)(\d+%|\d+\s*(millones?|miles?|euros?|dólares?|toneladas?|MW|GW|kWh|CO2|emisiones)|rango|reducción de|inversión de)"
    )
    .unwrap();
    static ref SPECIFIC_TECHNOLOGY: Regex = Regex::new(
        r"(?i)(CCS|captura post-combustión|captura pre-combustión|electrólisis|hidrólisis|baterías de|paneles|turbinas|reactores|filtros|membranas|algoritmos|modelos|sistemas de)"
    )
    .unwrap();
}

/// Which kinds of concrete detail a rationale mentions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetailMarkers {
    pub named_entity: bool,
    pub metric: bool,
    pub technology: bool,
}

impl DetailMarkers {
    pub fn scan(rationale: &str) -> Self {
        Self {
            named_entity: NAMED_ENTITY.is_match(rationale),
            metric: METRIC.is_match(rationale),
            technology: SPECIFIC_TECHNOLOGY.is_match(rationale),
        }
    }

    pub fn count(&self) -> usize {
        [self.named_entity, self.metric, self.technology]
            .iter()
            .filter(|m| **m)
            .count()
    }
}

/// Number of generic-phrase patterns found in `rationale`.
pub fn generic_phrase_count(rationale: &str) -> usize {
    GENERIC_PHRASES.matches(rationale).iter().count()
}

/// Why a judgment was rejected as generic, or `None` if it is specific enough.
pub fn generic_reason(rationale: &str, score: u8, config: &MatcherConfig) -> Option<&'static str> {
    if char_len(rationale.trim()) < config.min_rationale_chars {
        return Some("rationale too short");
    }

    let markers = DetailMarkers::scan(rationale);
    if generic_phrase_count(rationale) >= config.generic_phrase_hits
        && !markers.named_entity
        && !markers.metric
        && !markers.technology
    {
        return Some("generic phrasing without concrete details");
    }

    if score < config.generic_score_floor {
        return Some("score in generic range");
    }

    if markers.count() < 2 && score < config.detailed_score_floor {
        return Some("too few concrete details for a moderate score");
    }

    None
}

pub fn is_generic(rationale: &str, score: u8, config: &MatcherConfig) -> bool {
    generic_reason(rationale, score, config).is_some()
}
