//! HTML parsing for news pages.
//!
//! Pure functions over markup: no network. Boilerplate regions are detached
//! from the tree before anything is read, so titles inside `<header>` or
//! paragraphs inside `<aside>` never leak into the article.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

use crate::config::ExtractorConfig;
use crate::text::{char_len, collapse_whitespace, truncate_chars};
use crate::types::article::ExtractionSource;

/// Regions removed before extraction.
const STRIPPED_REGIONS: &str = "script, style, noscript, iframe, img, video, audio, form, nav, header, footer, aside, .ad, .advertisement, .social, .share, .comments, .related, .sidebar";

/// Elements that carry article text.
const TEXT_ELEMENTS: &str = "p, h2, h3, h4, h5, h6, blockquote";

const TITLE_META: &[&str] = &[
    r#"meta[property="og:title"]"#,
    r#"meta[name="twitter:title"]"#,
    r#"meta[name="title"]"#,
];

const SITE_NAME_META: &[&str] = &[
    r#"meta[property="og:site_name"]"#,
    r#"meta[name="application-name"]"#,
    r#"meta[name="publisher"]"#,
];

const AUTHOR_META: &[&str] = &[
    r#"meta[name="author"]"#,
    r#"meta[property="article:author"]"#,
    r#"meta[name="byline"]"#,
];

const AUTHOR_ELEMENTS: &str = r#".author, .byline, [class*="author"], [class*="byline"]"#;

const PUBLISHED_META: &[&str] = &[
    r#"meta[property="article:published_time"]"#,
    r#"meta[name="date"]"#,
    r#"meta[itemprop="datePublished"]"#,
    r#"meta[name="publish_date"]"#,
];

const BOILERPLATE_PHRASES: &[&str] = &[
    "cookie",
    "privacy",
    "advertisement",
    "subscribe",
    "newsletter",
    "follow us",
    "share this",
    "comment",
    "©",
    "all rights reserved",
    "terms of service",
    "privacy policy",
    "te puede interesar",
    "seguí leyendo",
    "segui leyendo",
];

/// Paragraphs in containers must be longer than this.
const MIN_CONTAINER_TEXT: usize = 30;
/// Loose paragraphs must be longer than this.
const MIN_LOOSE_PARAGRAPH: usize = 50;
/// Cleaned paragraphs must be longer than this.
const MIN_CLEAN_PARAGRAPH: usize = 20;
/// Plain-text renders need at least this much body to be split into lines.
const MIN_PLAIN_BODY: usize = 100;
const MAX_PLAIN_LINES: usize = 200;

lazy_static! {
    static ref RELATED_BLOCK: Regex = Regex::new(
        r"related|recomend|recommend|sidebar|more|te\s+puede\s+interesar|mir[aá]\s+tambi[ée]n|seg[uú]i\s+leyendo"
    )
    .unwrap();
    static ref SEE_ALSO: Regex = Regex::new(r"^mir[aá]\s+tambi[ée]n").unwrap();
    static ref CSS_FRAGMENT: Regex = Regex::new(r"\{[^}]*[a-z-]+\s*:\s*[^;]+;").unwrap();
    static ref JS_FRAGMENT: Regex =
        Regex::new(r"\b(function|var|let|const)\b|console\.|document\.|window\.").unwrap();
    static ref HTML_FRAGMENT: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref URL_FRAGMENT: Regex = Regex::new(r"https?://\S+").unwrap();
    static ref EMAIL_FRAGMENT: Regex =
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap();
    static ref DISALLOWED: Regex = Regex::new(r"[^\w\s.,!?;:()]").unwrap();
}

/// Everything read from one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    pub title: Option<String>,
    pub site_name: Option<String>,
    pub author: Option<String>,
    pub published: Option<String>,
    pub paragraphs: Vec<String>,
}

/// Parse a page fetched for `host`.
pub fn parse_page(
    markup: &str,
    host: &str,
    config: &ExtractorConfig,
    source: ExtractionSource,
) -> ParsedPage {
    let mut document = Html::parse_document(markup);
    strip_regions(&mut document);

    let mut paragraphs = container_paragraphs(&document, config.selectors_for(host));
    if paragraphs.is_empty() {
        paragraphs = scoped_paragraphs(&document, "body");
    }
    if paragraphs.is_empty() {
        paragraphs = loose_paragraphs(&document);
    }
    let mut paragraphs = clean_paragraphs(paragraphs);

    if paragraphs.is_empty() && source == ExtractionSource::ReaderProxy {
        paragraphs = plain_text_lines(&document);
    }

    ParsedPage {
        title: extract_title(&document, config.max_title_chars),
        site_name: first_meta(&document, SITE_NAME_META),
        author: extract_author(&document),
        published: first_meta(&document, PUBLISHED_META),
        paragraphs,
    }
}

/// Detach script/style/navigation/ad/social/comment regions.
pub fn strip_regions(document: &mut Html) {
    let Ok(selector) = Selector::parse(STRIPPED_REGIONS) else {
        return;
    };
    let ids: Vec<_> = document.select(&selector).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Title from social meta, page meta, `<title>`, then the first `h1`/`h2`.
pub fn extract_title(document: &Html, max_chars: usize) -> Option<String> {
    let title = first_meta(document, &TITLE_META[..2])
        .or_else(|| first_meta(document, &TITLE_META[2..]))
        .or_else(|| first_text(document, "title"))
        .or_else(|| first_text(document, "h1"))
        .or_else(|| first_text(document, "h2"))?;

    Some(cap_title(&collapse_whitespace(&title), max_chars))
}

/// Cap at `max_chars` characters including the ellipsis.
pub fn cap_title(title: &str, max_chars: usize) -> String {
    if char_len(title) <= max_chars {
        return title.to_string();
    }
    let kept = truncate_chars(title, max_chars.saturating_sub(3)).trim_end();
    format!("{}...", kept)
}

fn extract_author(document: &Html) -> Option<String> {
    first_meta(document, AUTHOR_META).or_else(|| first_text(document, AUTHOR_ELEMENTS))
}

fn first_meta(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(collapse_whitespace)
            .find(|content| !content.is_empty())
    })
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| collapse_whitespace(&element_text(&el)))
        .filter(|text| !text.is_empty())
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text elements of the first container selector that yields any.
fn container_paragraphs(document: &Html, selectors: &[String]) -> Vec<String> {
    for selector in selectors {
        let Ok(container_selector) = Selector::parse(selector) else {
            continue;
        };
        let containers: Vec<ElementRef> = document.select(&container_selector).collect();
        if containers.is_empty() {
            continue;
        }

        let paragraphs = article_text(containers);
        if !paragraphs.is_empty() {
            tracing::debug!(selector = %selector, paragraphs = paragraphs.len(), "Content container found");
            return paragraphs;
        }
    }
    Vec::new()
}

fn scoped_paragraphs(document: &Html, scope: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(scope) else {
        return Vec::new();
    };
    article_text(document.select(&selector).collect())
}

/// Filtered text elements under the given containers, in document order.
fn article_text(containers: Vec<ElementRef>) -> Vec<String> {
    let Ok(text_selector) = Selector::parse(TEXT_ELEMENTS) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut paragraphs = Vec::new();
    for container in containers {
        for element in container.select(&text_selector) {
            if !seen.insert(element.id()) {
                continue;
            }
            let text = element_text(&element);
            if text.is_empty() || is_boilerplate(&text) || in_related_block(&element) {
                continue;
            }
            if char_len(&text) > MIN_CONTAINER_TEXT {
                paragraphs.push(text);
            }
        }
    }
    paragraphs
}

fn loose_paragraphs(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("p") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|el| element_text(&el))
        .filter(|text| char_len(text) > MIN_LOOSE_PARAGRAPH)
        .collect()
}

/// Line-based pseudo-paragraphs for plain-text renders.
fn plain_text_lines(document: &Html) -> Vec<String> {
    let body = document.root_element().text().collect::<String>();
    let body = body.trim();
    if char_len(body) <= MIN_PLAIN_BODY {
        return Vec::new();
    }
    body.lines()
        .map(str::trim)
        .filter(|line| char_len(line) > MIN_LOOSE_PARAGRAPH)
        .take(MAX_PLAIN_LINES)
        .map(str::to_string)
        .collect()
}

/// Case-insensitive match against cookie/privacy/share/"see also" phrases.
///
/// Short texts (section headings) are never boilerplate.
pub fn is_boilerplate(text: &str) -> bool {
    let lower = text.to_lowercase();
    if char_len(&lower) <= MIN_CONTAINER_TEXT {
        return false;
    }
    BOILERPLATE_PHRASES.iter().any(|p| lower.contains(p)) || SEE_ALSO.is_match(&lower)
}

/// Whether any ancestor looks like a related/recommended block.
fn in_related_block(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| {
            let attrs = ancestor
                .value()
                .attrs()
                .map(|(_, value)| value)
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            !attrs.is_empty() && RELATED_BLOCK.is_match(&attrs)
        })
}

/// Whether text looks like CSS, JavaScript, markup, a URL or an email address.
pub fn is_code_fragment(text: &str) -> bool {
    CSS_FRAGMENT.is_match(text)
        || JS_FRAGMENT.is_match(text)
        || HTML_FRAGMENT.is_match(text)
        || URL_FRAGMENT.is_match(text)
        || EMAIL_FRAGMENT.is_match(text)
}

fn clean_paragraphs(paragraphs: Vec<String>) -> Vec<String> {
    paragraphs
        .into_iter()
        .filter(|text| !is_code_fragment(text))
        .map(|text| {
            DISALLOWED
                .replace_all(&collapse_whitespace(&text), "")
                .trim()
                .to_string()
        })
        .filter(|text| char_len(text) > MIN_CLEAN_PARAGRAPH)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head>
  <title>Página | Diario</title>
  <meta property="og:title" content="  Una startup   argentina capta carbono ">
  <meta property="og:site_name" content="Diario Verde">
  <meta name="author" content="Ana Pérez">
  <meta property="article:published_time" content="2024-05-02T10:00:00Z">
  <script>var tracking = 1;</script>
</head><body>
  <header><h1>Portada del diario con titulares</h1></header>
  <nav><p>Inicio, Economía, Deportes, Política, Sociedad, Clima y mucho más aquí</p></nav>
  <article>
    <h2>La planta piloto de captura directa en Bahía Blanca</h2>
    <p>La empresa Carbonia inauguró una planta de captura directa de aire con capacidad de 1000 toneladas anuales.</p>
    <p>Corto.</p>
    <p>Suscribite a nuestro newsletter para recibir todas las novedades del sector.</p>
    <div class="more-news"><p>Otra nota recomendada que no pertenece al cuerpo principal del artículo.</p></div>
    <p>Escribinos a prensa@diario.com para más información sobre esta iniciativa.</p>
    <p>Según la compañía, la tecnología reduce un 30% el costo energético frente a otros procesos.</p>
  </article>
  <footer><p>© 2024 Diario Verde. All rights reserved. Todos los derechos reservados.</p></footer>
</body></html>"#;

    fn parse(markup: &str, host: &str, source: ExtractionSource) -> ParsedPage {
        parse_page(markup, host, &ExtractorConfig::default(), source)
    }

    #[test]
    fn test_metadata() {
        let page = parse(PAGE, "diario.com", ExtractionSource::Direct);
        assert_eq!(page.title.as_deref(), Some("Una startup argentina capta carbono"));
        assert_eq!(page.site_name.as_deref(), Some("Diario Verde"));
        assert_eq!(page.author.as_deref(), Some("Ana Pérez"));
        assert_eq!(page.published.as_deref(), Some("2024-05-02T10:00:00Z"));
    }

    #[test]
    fn test_body_skips_boilerplate_related_and_contacts() {
        let page = parse(PAGE, "diario.com", ExtractionSource::Direct);
        assert_eq!(
            page.paragraphs,
            vec![
                "La planta piloto de captura directa en Bahía Blanca",
                "La empresa Carbonia inauguró una planta de captura directa de aire con capacidad de 1000 toneladas anuales.",
                "Según la compañía, la tecnología reduce un 30 el costo energético frente a otros procesos.",
            ]
        );
    }

    #[test]
    fn test_title_falls_back_past_stripped_header() {
        let markup = "<html><body><header><h1>Marca</h1></header><h2>Subtítulo del artículo</h2></body></html>";
        let document = {
            let mut d = Html::parse_document(markup);
            strip_regions(&mut d);
            d
        };
        assert_eq!(extract_title(&document, 200).as_deref(), Some("Subtítulo del artículo"));
    }

    #[test]
    fn test_title_cap_includes_ellipsis() {
        let long = "a".repeat(250);
        let capped = cap_title(&long, 200);
        assert_eq!(char_len(&capped), 200);
        assert!(capped.ends_with("..."));
    }

    #[test]
    fn test_site_specific_selectors() {
        let markup = r#"<html><body>
            <div class="com-article__content"><p>Texto del cuerpo de la nota publicada en el diario.</p></div>
            <article><p>Este párrafo está fuera del contenedor específico del sitio.</p></article>
        </body></html>"#;
        let page = parse(markup, "www.lanacion.com.ar", ExtractionSource::Direct);
        assert_eq!(page.paragraphs, vec!["Texto del cuerpo de la nota publicada en el diario."]);
    }

    #[test]
    fn test_plain_text_render_is_split_into_lines() {
        let line = "Esta es una línea larga de texto plano devuelta por el lector remoto";
        let markup = format!("Title: Nota\n\n{line} uno\n{line} dos\ncorta");
        let page = parse(&markup, "example.com", ExtractionSource::ReaderProxy);
        assert_eq!(page.paragraphs.len(), 2);

        let direct = parse(&markup, "example.com", ExtractionSource::Direct);
        assert!(direct.paragraphs.is_empty());
    }

    #[test]
    fn test_code_fragments() {
        assert!(is_code_fragment(".nota { color: red; }"));
        assert!(is_code_fragment("window.dataLayer = []"));
        assert!(is_code_fragment("Ver https://example.com/nota"));
        assert!(!is_code_fragment("La variable climática: un desafío para la región."));
    }

    #[test]
    fn test_short_text_is_never_boilerplate() {
        assert!(!is_boilerplate("Newsletter"));
        assert!(is_boilerplate("Mirá también: otras noticias sobre energía renovable hoy"));
    }
}
