//! Climatech vocabulary and the local keyword classifier.

use lazy_static::lazy_static;

use crate::text::normalize;
use crate::types::verdict::ClassificationVerdict;

/// Domain keywords, matched as accent-insensitive substrings.
pub const CLIMATECH_KEYWORDS: &[&str] = &[
    // renewables
    "solar", "eólica", "hidroeléctrica", "renovable", "energía limpia", "paneles solares",
    "turbinas eólicas", "energía verde", "sostenible", "sustentable",
    // efficiency
    "eficiencia energética", "ahorro energético", "consumo energético", "optimización",
    "edificios verdes", "certificación energética",
    // carbon
    "carbono", "co2", "emisiones", "captura", "secuestro", "neutralidad", "huella de carbono",
    "compensación", "reducción emisiones",
    // mobility
    "vehículo eléctrico", "coche eléctrico", "transporte público", "bicicleta",
    "movilidad sostenible", "transporte limpio", "autobús eléctrico",
    // agriculture
    "agricultura sostenible", "agricultura orgánica", "permacultura", "agricultura regenerativa",
    "cultivo orgánico",
    // environmental tech
    "monitoreo ambiental", "sensores", "iot ambiental", "tecnología verde",
    "innovación ambiental", "tech climático",
    // policy
    "cambio climático", "política climática", "acuerdo de parís", "cop", "regulación ambiental",
    "normativa verde", "impuestos verdes",
    // materials
    "materiales sostenibles", "biodegradable", "reciclable", "economía circular", "reutilización",
    "sostenibilidad", "materiales verdes",
    // general
    "clima", "medio ambiente", "verde", "ecológico", "ambiental", "climatech", "cleantech",
    // environment and sustainability
    "impacto ambiental", "conservación ambiental", "desarrollo sostenible", "biodiversidad",
    "ecosistemas", "humedales", "conservación natural", "recursos naturales",
    "protección ambiental", "gestión ambiental", "minería sostenible", "minería verde",
    "minería responsable", "litio", "baterías", "transición energética", "adaptación climática",
    "mitigación climática", "energías alternativas", "agua", "gestión hídrica", "sequía",
    "desertificación", "construcción verde", "edificios sostenibles", "arquitectura bioclimática",
    "logística verde", "industria 4.0", "tecnología limpia", "economía verde", "empleos verdes",
    "inversión responsable", "esg", "criterios ambientales", "finanzas verdes", "incendio forestal",
    "política ambiental", "regulación climática", "acuerdos ambientales",
];

lazy_static! {
    /// Keywords lowercased and accent-folded once.
    pub static ref NORMALIZED_KEYWORDS: Vec<(&'static str, String)> = CLIMATECH_KEYWORDS
        .iter()
        .map(|k| (*k, normalize(k)))
        .collect();
}

/// Keywords present in `text`, in list order.
pub fn keyword_hits(text: &str) -> Vec<&'static str> {
    let normalized = normalize(text);
    NORMALIZED_KEYWORDS
        .iter()
        .filter(|(_, folded)| normalized.contains(folded.as_str()))
        .map(|(original, _)| *original)
        .collect()
}

/// Keywords present in both texts (already normalized).
pub fn shared_keywords(a_normalized: &str, b_normalized: &str) -> usize {
    NORMALIZED_KEYWORDS
        .iter()
        .filter(|(_, k)| a_normalized.contains(k.as_str()) && b_normalized.contains(k.as_str()))
        .count()
}

/// Classify by keyword presence alone. Any hit is a match.
pub fn keyword_verdict(text: &str) -> ClassificationVerdict {
    let hits = keyword_hits(text);
    if hits.is_empty() {
        ClassificationVerdict::new(false, "no climatech keywords found")
    } else {
        let shown: Vec<&str> = hits.iter().take(5).copied().collect();
        ClassificationVerdict::new(true, format!("climatech keywords found: {}", shown.join(", ")))
    }
}
