/// One known markup version of a listings page, described as raw-HTML
/// substring markers: every `all` marker must appear, plus at least one of
/// `any` when that list is non-empty.
pub struct PageSignature {
    pub all: &'static [&'static str],
    pub any: &'static [&'static str],
}

impl PageSignature {
    fn matches(&self, html: &str) -> bool {
        self.all.iter().all(|m| html.contains(m))
            && (self.any.is_empty() || self.any.iter().any(|m| html.contains(m)))
    }
}

/// Marker sets for the markup versions kolesa.kz has shipped. Block pages,
/// CAPTCHAs and empty error bodies carry none of these class names.
pub const LISTING_SIGNATURES: &[PageSignature] = &[
    // Current card grid.
    PageSignature {
        all: &["a-card__title", "a-card__link"],
        any: &[],
    },
    // Legacy list markup, still served on some cached paths.
    PageSignature {
        all: &["a-elem"],
        any: &["a-el-info-title", "a-el-info-price"],
    },
];

/// Decide whether a response body is a genuine listings page, as opposed to
/// a block page, CAPTCHA or error shell. Purely heuristic; a match on any
/// known signature is a pass.
pub fn is_listings_page(html: &str) -> bool {
    LISTING_SIGNATURES.iter().any(|sig| sig.matches(html))
}
