//! Coarse topic labelling for articles that are not climatech.

use crate::text::normalize;

const TOPICS: &[(&str, &[&str])] = &[
    ("tecnología", &["tecnologia", "tech", "innovacion", "startup", "app", "software", "digital"]),
    ("deportes", &["futbol", "deportes", "liga", "equipo", "jugador", "partido", "gol"]),
    ("política", &["gobierno", "politica", "elecciones", "presidente", "ministro", "congreso", "ley"]),
    ("economía", &["economia", "mercado", "inversion", "bolsa", "empresa", "finanzas", "dolar"]),
    ("entretenimiento", &["pelicula", "musica", "actor", "actriz", "cine", "teatro"]),
    ("salud", &["salud", "medico", "hospital", "enfermedad", "tratamiento", "vacuna"]),
    ("educación", &["educacion", "universidad", "escuela", "estudiante", "profesor", "academico"]),
];

pub const GENERAL_TOPIC: &str = "general";

/// Topic whose keywords occur most often. Ties keep the earlier topic.
pub fn main_topic(text: &str) -> &'static str {
    let normalized = normalize(text);

    let mut best = GENERAL_TOPIC;
    let mut best_hits = 0;
    for (topic, keywords) in TOPICS {
        let hits = keywords
            .iter()
            .filter(|k| normalized.contains(*k))
            .count();
        if hits > best_hits {
            best = *topic;
            best_hits = hits;
        }
    }
    best
}
