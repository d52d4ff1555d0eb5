//! URL slugs for Vietnamese titles.

/// Lowercase ASCII slug with Vietnamese diacritics folded and runs of
/// non-alphanumerics collapsed to a single `-`.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars().flat_map(char::to_lowercase) {
        let folded = fold_vietnamese(ch);
        if folded.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(folded);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Accept a caller-provided slug after normalizing it, or derive one from `fallback`.
pub fn slug_or_derive(provided: Option<&str>, fallback: &str) -> String {
    match provided.map(slugify).filter(|s| !s.is_empty()) {
        Some(slug) => slug,
        None => slugify(fallback),
    }
}

fn fold_vietnamese(ch: char) -> char {
    match ch {
        'à' | 'á' | 'ạ' | 'ả' | 'ã' | 'â' | 'ầ' | 'ấ' | 'ậ' | 'ẩ' | 'ẫ' | 'ă' | 'ằ' | 'ắ'
        | 'ặ' | 'ẳ' | 'ẵ' => 'a',
        'è' | 'é' | 'ẹ' | 'ẻ' | 'ẽ' | 'ê' | 'ề' | 'ế' | 'ệ' | 'ể' | 'ễ' => 'e',
        'ì' | 'í' | 'ị' | 'ỉ' | 'ĩ' => 'i',
        'ò' | 'ó' | 'ọ' | 'ỏ' | 'õ' | 'ô' | 'ồ' | 'ố' | 'ộ' | 'ổ' | 'ỗ' | 'ơ' | 'ờ' | 'ớ'
        | 'ợ' | 'ở' | 'ỡ' => 'o',
        'ù' | 'ú' | 'ụ' | 'ủ' | 'ũ' | 'ư' | 'ừ' | 'ứ' | 'ự' | 'ử' | 'ữ' => 'u',
        'ỳ' | 'ý' | 'ỵ' | 'ỷ' | 'ỹ' => 'y',
        'đ' => 'd',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_vietnamese_titles() {
        assert_eq!(slugify("Hoàng Trí Moto"), "hoang-tri-moto");
        assert_eq!(slugify("Độ pô xe Exciter 150"), "do-po-xe-exciter-150");
        assert_eq!(slugify("Bảo dưỡng định kỳ"), "bao-duong-dinh-ky");
    }

    #[test]
    fn collapses_separators_and_trims() {
        assert_eq!(slugify("  Nhớt -- Motul 300V!! "), "nhot-motul-300v");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn provided_slug_is_normalized_or_replaced() {
        assert_eq!(slug_or_derive(Some("My Slug"), "ignored"), "my-slug");
        assert_eq!(slug_or_derive(Some("  "), "Phụ tùng"), "phu-tung");
        assert_eq!(slug_or_derive(None, "Phụ tùng"), "phu-tung");
    }
}
