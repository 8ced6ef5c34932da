//! Fence language validation against the bundled highlighter grammars.

use std::sync::LazyLock;

use syntect::parsing::SyntaxSet;

use crate::core::block::CodeLanguage;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Tags whose grammar is registered under a different token.
const ALIASES: &[(&str, &str)] = &[
    ("shell", "sh"),
    ("zsh", "sh"),
    ("console", "sh"),
    ("py3", "py"),
    ("jsx", "js"),
    ("node", "js"),
    ("golang", "go"),
    ("c++", "cpp"),
    ("objc", "m"),
    ("yml", "yaml"),
];

/// Resolves a fence tag to a known grammar, falling back to plaintext.
pub fn resolve_language(tag: Option<&str>) -> CodeLanguage {
    let raw = tag.map(str::trim).filter(|tag| !tag.is_empty());
    let Some(raw) = raw else {
        return CodeLanguage::plaintext(None);
    };

    let lowered = raw.to_ascii_lowercase();
    let token = ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, target)| *target)
        .unwrap_or(lowered.as_str());

    let plain = SYNTAX_SET.find_syntax_plain_text();
    match SYNTAX_SET.find_syntax_by_token(token) {
        Some(syntax) if syntax.name != plain.name => {
            let name = syntax
                .file_extensions
                .first()
                .cloned()
                .unwrap_or_else(|| syntax.name.to_ascii_lowercase());
            CodeLanguage {
                name,
                tag: Some(raw.to_string()),
            }
        }
        _ => CodeLanguage::plaintext(Some(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_language;

    #[test]
    fn known_tags_resolve_to_a_grammar() {
        for tag in ["rust", "js", "python", "sh", "json"] {
            let language = resolve_language(Some(tag));
            assert!(!language.is_plaintext(), "{tag} should be recognized");
            assert_eq!(language.tag.as_deref(), Some(tag));
        }
    }

    #[test]
    fn aliases_and_case_are_normalized() {
        assert!(!resolve_language(Some("ZSH")).is_plaintext());
        assert_eq!(
            resolve_language(Some("Rust")).name,
            resolve_language(Some("rust")).name
        );
    }

    #[test]
    fn unknown_or_missing_tags_fall_back_to_plaintext() {
        assert!(resolve_language(None).is_plaintext());
        assert!(resolve_language(Some("   ")).is_plaintext());

        let unknown = resolve_language(Some("not-a-real-lang"));
        assert!(unknown.is_plaintext());
        assert_eq!(unknown.tag.as_deref(), Some("not-a-real-lang"));
    }
}
