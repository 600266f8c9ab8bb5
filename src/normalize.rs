//! Text canonicalization shared by every extraction stage.
//!
//! Textbook PDFs mix full-width and ASCII forms of the same characters
//! (hyphens, rank letters, digits, punctuation). Everything downstream —
//! outline parsing, header patterns, rank validation — runs on normalized
//! text so the pattern sets only need to spell the ASCII forms.

/// Fold full-width variants to a single ASCII representation.
///
/// Idempotent and total: every output character maps to itself.
pub fn normalize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for ch in input.chars() {
        match ch {
            // full-width hyphen variants
            '－' | '―' | '−' => out.push('-'),
            // full-width rank letters
            'Ａ' => out.push('A'),
            'Ｂ' => out.push('B'),
            'Ｃ' => out.push('C'),
            // full-width punctuation used in rank annotations
            '：' => out.push(':'),
            '／' => out.push('/'),
            // NBSP and ideographic space
            '\u{00a0}' | '\u{3000}' => out.push(' '),
            // full-width digits; `str::parse` only accepts ASCII
            '０'..='９' => {
                let offset = ch as u32 - '０' as u32;
                out.push(char::from(b'0' + offset as u8));
            }
            other => out.push(other),
        }
    }

    out
}

/// Validate a difficulty rank. Returns the canonical letter, or `None`
/// for anything outside {A, B, C} — bad ranks are absence, not errors.
pub fn normalize_rank(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let folded = normalize_text(raw).trim().to_ascii_uppercase();
    match folded.as_str() {
        "A" | "B" | "C" => Some(folded),
        _ => None,
    }
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_fullwidth_variants() {
        assert_eq!(normalize_text("３－１　Ａ：Ｂ／Ｃ"), "3-1 A:B/C");
        assert_eq!(normalize_text("第１章―総論\u{00a0}"), "第1章-総論 ");
    }

    #[test]
    fn normalize_text_is_idempotent() {
        let samples = [
            "例題３－１ 材料副費の処理 ③- 7",
            "第12章　連結会計（Ａ）",
            "plain ascii -- unchanged",
            "",
        ];
        for sample in samples {
            let once = normalize_text(sample);
            assert_eq!(normalize_text(&once), once);
        }
    }

    #[test]
    fn rank_accepts_only_abc() {
        assert_eq!(normalize_rank(Some("Ａ")), Some("A".to_string()));
        assert_eq!(normalize_rank(Some(" b ")), Some("B".to_string()));
        assert_eq!(normalize_rank(Some("C")), Some("C".to_string()));
        assert_eq!(normalize_rank(Some("D")), None);
        assert_eq!(normalize_rank(Some("AB")), None);
        assert_eq!(normalize_rank(Some("")), None);
        assert_eq!(normalize_rank(None), None);
    }

    #[test]
    fn collapses_interior_whitespace() {
        assert_eq!(collapse_whitespace("  材料費   の 処理\n x "), "材料費 の 処理 x");
    }
}
