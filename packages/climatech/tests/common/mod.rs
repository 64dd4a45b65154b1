//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use climatech::testing::MockAI;
use climatech::{Analyzer, EngineConfig, MemoryReferenceStore, ReferenceDocument};

pub const WIND_FARM: &[&str] = &[
    "YPF Luz inauguró el parque eólico General Levalle, ubicado en el sur de la provincia de Córdoba, con una potencia instalada de 155 MW.",
    "El proyecto cuenta con 25 aerogeneradores Vestas y demandó una inversión de 260 millones de dólares, según informó la compañía en un comunicado.",
    "La energía generada abastecerá a industrias a través del Mercado a Término de Energías Renovables y evitará la emisión de 400 mil toneladas de CO2 por año.",
    "Es el primer parque eólico de la empresa en Córdoba y se suma a los que ya opera en Chubut y Buenos Aires, con lo que su capacidad renovable supera los 1000 MW.",
    "Las autoridades provinciales destacaron que la obra generó más de 300 puestos de trabajo durante la etapa de construcción.",
];

pub const SOLAR_ROOFS: &[&str] = &[
    "La cooperativa eléctrica de Villa María instaló paneles solares en el techo de su sede central y en tres escuelas rurales del departamento.",
    "Según la entidad, la iniciativa permitirá una reducción de CO2 cercana al treinta por ciento en el consumo eléctrico de los edificios alcanzados.",
    "Los vecinos podrán visitar las instalaciones durante las jornadas abiertas previstas para el próximo mes.",
];

pub const SPECIFIC_RATIONALE: &str = "Ambos textos describen el parque eólico General Levalle de la empresa YPF Luz en Córdoba, con 155 MW instalados, 25 turbinas Vestas y una inversión de 260 millones de dólares.";

pub const GENERIC_RATIONALE: &str = "Ambos hablan de sostenibilidad y temas similares.";

/// Minimal news page with the given title and paragraphs.
pub fn news_page(title: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<p>{}</p>\n", p))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html><head>
<meta property="og:title" content="{title}">
<meta property="og:site_name" content="Diario de Prueba">
<meta name="author" content="Redacción">
<meta property="article:published_time" content="2024-05-02T10:30:00-03:00">
<title>{title} | Diario de Prueba</title>
</head><body>
<nav><a href="/">Inicio</a></nav>
<article class="nota">
<h1>{title}</h1>
{body}</article>
<footer>Todos los derechos reservados</footer>
</body></html>"#
    )
}

pub fn wind_farm_newsletter(id: &str) -> ReferenceDocument {
    let mut document = ReferenceDocument::new(
        id,
        "YPF Luz suma 155 MW eólicos en Córdoba",
        format!(
            "{} Analizamos qué significa para la demanda industrial del Mercado a Término.",
            WIND_FARM[..4].join(" ")
        ),
    );
    document.link = Some(format!("https://newsletter.example/{}", id));
    document
}

pub fn lithium_newsletter(id: &str) -> ReferenceDocument {
    ReferenceDocument::new(
        id,
        "Litio en Catamarca",
        "Livent amplía su planta en el Salar del Hombre Muerto para exportar carbonato.",
    )
}

pub fn judge_reply(related: &str, rationale: &str, score: u8) -> String {
    serde_json::json!({"relacionado": related, "razon": rationale, "score": score}).to_string()
}

pub fn analyzer(ai: MockAI, documents: Vec<ReferenceDocument>) -> (Arc<MockAI>, Analyzer<MockAI>) {
    let ai = Arc::new(ai);
    let corpus = Arc::new(MemoryReferenceStore::new(documents));
    let analyzer = Analyzer::new(ai.clone(), EngineConfig::default(), corpus).unwrap();
    (ai, analyzer)
}
