//! LLM prompts used by the engine.
//!
//! Prompts are in Spanish, the working language of the corpus. Placeholders
//! in braces are substituted by the `format_*` helpers.

use sha2::{Digest, Sha256};

/// System prompt for translation.
pub const TRANSLATE_SYSTEM: &str = "Eres un traductor profesional especializado en traducción técnica y de noticias. Traduce el texto del inglés al español manteniendo el significado exacto, la terminología técnica y el contexto. No agregues información adicional, solo traduce fielmente.";

/// Translation of a whole text.
pub const TRANSLATE_PROMPT: &str = "Traduce el siguiente texto del inglés al español. Mantén la terminología técnica y el contexto exacto:\n\n{text}";

/// Translation of one chunk of a longer text.
pub const TRANSLATE_CHUNK_PROMPT: &str = "Traduce el siguiente fragmento del inglés al español. Mantén la terminología técnica y el contexto exacto:\n\n{text}";

/// System prompt for climatech classification.
pub const CLASSIFY_SYSTEM: &str =
    "Eres un experto en sostenibilidad, medio ambiente y tecnologías/climatech.";

/// Rubric for climatech classification.
pub const CLASSIFY_PROMPT: &str = r#"Tu tarea es decidir si una noticia está relacionada con CLIMATECH.

Definición ampliada (clasificar como CLIMATECH si cumple AL MENOS uno):
1) Relación entre TECNOLOGÍA (cualquier tipo: digital, IA, telecomunicaciones, producción/almacenamiento de energía, sensores, satélites, materiales, etc.) y MEDIO AMBIENTE o CAMBIO CLIMÁTICO.
2) Temas SOLO de MEDIO AMBIENTE/CLIMA/SOSTENIBILIDAD con impacto relevante (p.ej.: transición energética, conservación, biodiversidad, agua, emisiones, políticas/regulación climática, economía circular, incendios/mitigación/adaptación).
3) Startups/empresas/emprendimientos del rubro climático/cleantech (incluye rondas de inversión, aceleradoras/incubadoras, lanzamientos) aunque no se mencione explícitamente una tecnología.

Ejemplos que SON CLIMATECH:
- "La IA aumenta el consumo de agua en data centers" (tecnología + ambiente)
- "Nueva ronda Serie A para startup de captura de carbono" (startup climática)
- "Conservación de humedales clave para la mitigación" (tema ambiental relevante)

Instrucciones:
1. Si cumple la definición ampliada, responde con "SI".
2. Si no cumple, responde con "NO".
3. Luego, independientemente de 'SI' o 'NO', da una breve explicación (1-3 frases) justificando.

Noticia a evaluar:
{content}"#;

/// System prompt for the pairwise relation judgment.
pub const JUDGE_SYSTEM: &str = r#"Responde solo con JSON válido. RECHAZA relaciones genéricas o vagas. La explicación en 'razon' debe ser MUY DETALLADA y ESPECÍFICA, mencionando nombres EXACTOS de empresas/startups/tecnologías/productos compartidos, lugares específicos, métricas concretas, aspectos técnicos o de negocio específicos, y evidencia concreta. Si no puedes proporcionar estos detalles específicos, marca como NO relacionado. El score debe reflejar la especificidad: 0-40 = genérico (rechazar), 41-70 = moderado, 71-100 = muy específico. Ejemplo de relación ESPECÍFICA aceptable: {"relacionado":"SI","razon":"Ambos textos tratan sobre la implementación de sistemas de captura de carbono post-combustión en plantas siderúrgicas europeas. La noticia menciona específicamente a la empresa ArcelorMittal y su proyecto piloto en Gijón, España, con una inversión de 50 millones de euros. El newsletter analiza las mismas tecnologías de captura post-combustión (CCS) aplicadas específicamente a la industria del acero, mencionando el mismo rango de reducción de emisiones (30-40% de CO2) y los mismos desafíos técnicos de costos (200-300 euros por tonelada) y escalabilidad.","score":92}. Ejemplo de relación GENÉRICA a rechazar: {"relacionado":"NO","razon":"Aunque ambos textos mencionan temas de sostenibilidad y cambio climático, no hay detalles específicos compartidos. El newsletter es muy general y cubre múltiples verticales sin profundizar en los aspectos específicos mencionados en la noticia.","score":25}"#;

/// Rubric for the pairwise relation judgment.
pub const JUDGE_PROMPT: &str = r#"Debes decidir si el resumen de una noticia está relacionado con el resumen de un newsletter.

IMPORTANTE: Rechaza relaciones GENÉRICAS o VAGAS. Solo marca como relacionado si hay una conexión ESPECÍFICA y CONCRETA.

CRITERIOS PARA RECHAZAR (marcar como NO relacionado):
- Si solo comparten temas muy generales como "ambos hablan de energía", "ambos mencionan sostenibilidad", "ambos tratan de cambio climático" sin detalles específicos
- Si el newsletter es muy genérico y cubre muchos temas sin profundizar en ninguno específico de la noticia
- Si no hay menciones concretas de empresas, tecnologías, productos, lugares, métricas o casos específicos compartidos
- Si la relación es solo temática superficial sin conexión técnica o de negocio específica

CRITERIOS PARA ACEPTAR (marcar como SI relacionado):
- Menciones específicas de la misma empresa, startup, tecnología o producto en ambos textos
- Mismos lugares geográficos, proyectos específicos, o casos de estudio concretos
- Mismas métricas, números, porcentajes o datos específicos mencionados
- Misma tecnología específica (ej: "captura de carbono post-combustión en acerías", no solo "captura de carbono")
- Mismo sector industrial específico con detalles técnicos compartidos
- Mismos eventos, anuncios, rondas de inversión o lanzamientos específicos

Responde SOLO con JSON válido con estas claves:
- relacionado ("SI" o "NO")
- razon (explicación DETALLADA y ESPECÍFICA de 5 a 10 oraciones con los nombres EXACTOS de empresas/tecnologías/productos mencionados en AMBOS textos, los temas ESPECÍFICOS que comparten, los aspectos técnicos o de negocio que los conectan y la evidencia concreta de la relación. Si no puedes proporcionar estos detalles, la relación probablemente es genérica y debes marcar como NO relacionado)
- score (0-100, donde 0-40 = relación genérica/vaga, 41-70 = relación moderada con algunos detalles, 71-100 = relación muy específica con muchos detalles concretos)
{hints}

Resumen de noticia:
{summary}

Newsletter:
{document}"#;

/// Appended to the judgment rubric when feedback history is available.
pub const FEEDBACK_HINT: &str =
    "\nContexto histórico: Evita falsos positivos similares a razones previas: {reasons}.";

/// System prompt for the relation narrative.
pub const EXPLAIN_SYSTEM: &str = "Eres un analista experto que encuentra similitudes específicas y detalladas entre textos. Tu explicación debe ser concreta, mencionando nombres de empresas, tecnologías, lugares, temas específicos compartidos, aspectos técnicos o de negocio que los conectan, y por qué la relación es relevante. Evita generalidades.";

/// Request for a longer narrative on an accepted relation.
pub const EXPLAIN_PROMPT: &str = r#"Noticia:
{summary}

Newsletter:
{document}

Proporciona una explicación DETALLADA, ESPECÍFICA y DIVIDIDA EN PÁRRAFOS de 4 a 8 oraciones sobre por qué están relacionados. Incluye: 1) Breve explicación de la noticia, 2) Qué se nombra en la noticia que también aparece en el newsletter, 3) Nombres concretos de empresas, tecnologías, productos o lugares mencionados en ambos textos, 4) Aspectos técnicos o de negocio que los conectan, 5) Contexto o implicaciones específicas de la relación, 6) Por qué esta relación es relevante."#;

/// Hash of the judgment prompts, logged with every matching run.
pub fn judge_prompt_hash() -> String {
    let mut hasher = Sha256::new();
    hasher.update(JUDGE_SYSTEM.as_bytes());
    hasher.update(JUDGE_PROMPT.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn format_translate_prompt(text: &str, chunked: bool) -> String {
    let template = if chunked {
        TRANSLATE_CHUNK_PROMPT
    } else {
        TRANSLATE_PROMPT
    };
    template.replace("{text}", text)
}

pub fn format_classify_prompt(content: &str) -> String {
    CLASSIFY_PROMPT.replace("{content}", content)
}

/// Format the judgment prompt; `reasons` are prior rejection reasons.
pub fn format_judge_prompt(summary: &str, document: &str, reasons: &[String]) -> String {
    let hints = if reasons.is_empty() {
        String::new()
    } else {
        FEEDBACK_HINT.replace("{reasons}", &reasons.join(", "))
    };

    JUDGE_PROMPT
        .replace("{hints}", &hints)
        .replace("{summary}", summary)
        .replace("{document}", document)
}

pub fn format_explain_prompt(summary: &str, document: &str) -> String {
    EXPLAIN_PROMPT
        .replace("{summary}", summary)
        .replace("{document}", document)
}
