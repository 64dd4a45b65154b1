//! Free-text verdict parsing as an ordered rule table.
//!
//! Rules run top-down on the lowercased, accent-folded reply and the first
//! match wins. Negative markers come first so that "no es climatech" never
//! reaches the positive rules.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::text::normalize;

/// Tagged outcome of parsing a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Positive,
    Negative,
    Ambiguous,
}

impl Verdict {
    /// Ambiguous replies are not matches.
    pub fn is_match(&self) -> bool {
        matches!(self, Verdict::Positive)
    }
}

enum Predicate {
    Pattern(Regex),
    Check(fn(&str) -> bool),
}

impl Predicate {
    fn holds(&self, normalized: &str) -> bool {
        match self {
            Predicate::Pattern(re) => re.is_match(normalized),
            Predicate::Check(f) => f(normalized),
        }
    }
}

/// One `(predicate, verdict)` row.
pub struct VerdictRule {
    pub name: &'static str,
    predicate: Predicate,
    pub verdict: Verdict,
}

impl VerdictRule {
    fn pattern(name: &'static str, pattern: &str, verdict: Verdict) -> Self {
        Self {
            name,
            predicate: Predicate::Pattern(Regex::new(pattern).expect("verdict pattern")),
            verdict,
        }
    }

    fn check(name: &'static str, check: fn(&str) -> bool, verdict: Verdict) -> Self {
        Self {
            name,
            predicate: Predicate::Check(check),
            verdict,
        }
    }
}

/// Result of evaluating the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub verdict: Verdict,
    /// Name of the rule that fired, `None` for the fall-through
    pub rule: Option<&'static str>,
}

pub struct VerdictTable {
    rules: Vec<VerdictRule>,
}

lazy_static! {
    static ref WORD_NO: Regex = Regex::new(r"\bno\b").unwrap();
    static ref WORD_SI: Regex = Regex::new(r"\bsi\b").unwrap();
    static ref STANDARD: VerdictTable = VerdictTable::standard();
}

/// Mentions climatech without negating it, or says "si ... relacionada" briefly.
fn keyword_heuristic(reply: &str) -> bool {
    (reply.contains("climatech") && !reply.contains("no es climatech"))
        || (reply.contains("relacionada") && reply.contains("climatech") && !WORD_NO.is_match(reply))
        || (WORD_SI.is_match(reply) && reply.contains("relacionada") && reply.chars().count() < 200)
}

impl VerdictTable {
    /// The SI/NO rubric table.
    pub fn standard() -> Self {
        use Verdict::*;
        Self {
            rules: vec![
                VerdictRule::pattern("leading no", r"^no([\s.,:;!?]|$)", Negative),
                VerdictRule::pattern("no es climatech", r"\bno\b\s+es\s+climatech\b", Negative),
                VerdictRule::pattern(
                    "no relacionada con climatech",
                    r"\bno\b.*\brelacionad[ao]s?.*climatech",
                    Negative,
                ),
                VerdictRule::pattern("leading si", r"^si\b", Positive),
                VerdictRule::pattern("es climatech", r"\bes climatech\b", Positive),
                VerdictRule::pattern("esta relacionada", r"\besta relacionada.*climatech", Positive),
                VerdictRule::pattern("si ... climatech", r"\bsi\b.*climatech", Positive),
                VerdictRule::pattern(
                    "esta noticia si relacionada",
                    r"\besta noticia.*\bsi\b.*relacionada",
                    Positive,
                ),
                VerdictRule::check("keyword heuristic", keyword_heuristic, Positive),
            ],
        }
    }

    pub fn evaluate(&self, reply: &str) -> Evaluation {
        let normalized = normalize(reply.trim());
        self.rules
            .iter()
            .find(|rule| rule.predicate.holds(&normalized))
            .map(|rule| Evaluation {
                verdict: rule.verdict,
                rule: Some(rule.name),
            })
            .unwrap_or(Evaluation {
                verdict: Verdict::Ambiguous,
                rule: None,
            })
    }

    pub fn rules(&self) -> &[VerdictRule] {
        &self.rules
    }
}

/// Parse a classifier reply with the standard table.
pub fn parse_verdict(reply: &str) -> Evaluation {
    STANDARD.evaluate(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(reply: &str) -> Verdict {
        parse_verdict(reply).verdict
    }

    #[test]
    fn test_leading_markers() {
        assert_eq!(verdict("SI, es un tema de captura de carbono."), Verdict::Positive);
        assert_eq!(verdict("Sí. Trata sobre energía solar."), Verdict::Positive);
        assert_eq!(verdict("No, esta noticia es sobre deportes."), Verdict::Negative);
        assert_eq!(verdict("NO"), Verdict::Negative);
    }

    #[test]
    fn test_negation_wins_over_positive_phrases() {
        let eval = parse_verdict("La noticia no es climatech aunque menciona energía.");
        assert_eq!(eval.verdict, Verdict::Negative);
        assert_eq!(eval.rule, Some("no es climatech"));

        assert_eq!(
            verdict("Considero que no está relacionada con climatech."),
            Verdict::Negative
        );
    }

    #[test]
    fn test_positive_phrases_without_lead() {
        assert_eq!(verdict("La noticia es climatech por su enfoque."), Verdict::Positive);
        assert_eq!(
            verdict("Esta noticia está relacionada con el sector climatech."),
            Verdict::Positive
        );
    }

    #[test]
    fn test_si_is_a_word_not_a_prefix() {
        // "sin" and "sistema" must not count as "si"
        let eval = parse_verdict("Describe un sistema sin impacto; menciona climatech de pasada.");
        assert_eq!(eval.rule, Some("keyword heuristic"));
    }

    #[test]
    fn test_no_marker_is_ambiguous() {
        let eval = parse_verdict("La nota describe un partido de fútbol.");
        assert_eq!(eval.verdict, Verdict::Ambiguous);
        assert!(!eval.verdict.is_match());
        assert_eq!(eval.rule, None);
    }

    #[test]
    fn test_rule_order_is_negative_first() {
        let table = VerdictTable::standard();
        let first_positive = table
            .rules()
            .iter()
            .position(|r| r.verdict == Verdict::Positive)
            .unwrap();
        assert!(table.rules()[..first_positive]
            .iter()
            .all(|r| r.verdict == Verdict::Negative));
    }
}
