//! Tokenizer for the lexical pre-filter.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::text::normalize;

const STOPWORDS_ES: &[&str] = &[
    "a", "acá", "ahi", "al", "algo", "algunas", "algunos", "allá", "alli", "allí", "ambos", "ante",
    "antes", "aquel", "aquella", "aquellas", "aquello", "aquellos", "aqui", "aquí", "arriba",
    "asi", "aun", "aunque", "bajo", "bastante", "bien", "cada", "casi", "como", "cómo", "con",
    "contra", "cual", "cuales", "cualquier", "cualquiera", "cualquieras", "cuan", "cuando",
    "cuanta", "cuantas", "cuanto", "cuantos", "de", "dejar", "del", "demasiado", "demás",
    "dentro", "desde", "donde", "dos", "el", "él", "ella", "ellas", "ellos", "empleais",
    "emplean", "emplear", "empleas", "en", "encima", "entonces", "entre", "era", "eramos", "eran",
    "eras", "eres", "es", "esa", "esas", "ese", "eso", "esos", "esta", "estaba", "estaban",
    "estado", "estais", "estamos", "estan", "estar", "estas", "este", "esto", "estos", "estoy",
    "fin", "fue", "fueron", "fui", "fuimos", "gueno", "ha", "hace", "haceis", "hacemos", "hacen",
    "hacer", "haces", "hacia", "hasta", "incluso", "intenta", "intentais", "intentamos",
    "intentan", "intentar", "intentas", "ir", "jamás", "junto", "juntos", "la", "lado", "las",
    "le", "les", "lo", "los", "luego", "mal", "mas", "más", "me", "menos", "mi", "mia", "mias",
    "mientras", "mio", "mios", "mis", "misma", "mismas", "mismo", "mismos", "modo", "mucha",
    "muchas", "muchísima", "muchísimas", "muchísimo", "muchísimos", "mucho", "muchos", "muy",
    "nada", "ni", "ninguna", "ningunas", "ninguno", "ningunos", "no", "nos", "nosotras",
    "nosotros", "nuestra", "nuestras", "nuestro", "nuestros", "nunca", "os", "otra", "otras",
    "otro", "otros", "para", "parecer", "pero", "poca", "pocas", "poco", "pocos", "por", "porque",
    "primero", "puede", "pueden", "pues", "que", "qué", "querer", "quien", "quién", "quienes",
    "quiénes", "quiza", "quizas", "sabe", "sabeis", "sabemos", "saben", "saber", "sabes", "se",
    "segun", "ser", "si", "sí", "siempre", "siendo", "sin", "sino", "so", "sobre", "sois",
    "solamente", "solo", "somos", "son", "soy", "su", "sus", "suya", "suyas", "suyo", "suyos",
    "tal", "también", "tampoco", "tan", "tanta", "tantas", "tanto", "tantos", "te", "teneis",
    "tenemos", "tener", "tengo", "ti", "tiempo", "tiene", "tienen", "toda", "todas", "todavia",
    "todavía", "todo", "todos", "tomar", "trabaja", "trabajais", "trabajamos", "trabajan",
    "trabajar", "trabajas", "tras", "tu", "tus", "tuya", "tuyas", "tuyo", "tuyos", "un", "una",
    "unas", "uno", "unos", "usa", "usais", "usamos", "usan", "usar", "usas", "usted", "ustedes",
    "va", "vais", "valor", "vamos", "van", "varias", "varios", "vaya", "verdad", "verdadera",
    "verdadero", "vosotras", "vosotros", "voy", "yo",
];

lazy_static! {
    /// Stop-words, accent-folded to match tokenized text.
    static ref STOPWORDS: HashSet<String> = STOPWORDS_ES.iter().map(|w| normalize(w)).collect();
    static ref NON_TOKEN: Regex = Regex::new(r"[^a-z0-9\s]").unwrap();
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Lowercase, strip diacritics and punctuation, drop stop-words and
/// single-character tokens. Order and repetitions are kept.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    NON_TOKEN
        .replace_all(&normalized, " ")
        .split_whitespace()
        .filter(|t| t.len() > 1 && !is_stopword(t))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("La startup Ñandú instaló 40 MW de energía solar en Jujuy, según el informe."),
            vec!["startup", "nandu", "instalo", "40", "mw", "energia", "solar", "jujuy", "informe"]
        );
    }

    #[test]
    fn test_accented_stopwords_are_removed() {
        assert!(tokenize("Él también está aquí, más o menos").is_empty());
    }

    proptest! {
        #[test]
        fn prop_tokenize_idempotent(text in "\\PC{0,200}") {
            let once = tokenize(&text);
            let twice = tokenize(&once.join(" "));
            prop_assert_eq!(&once, &twice);
            for token in &once {
                prop_assert!(token.len() > 1);
                prop_assert!(!is_stopword(token));
            }
        }
    }
}
