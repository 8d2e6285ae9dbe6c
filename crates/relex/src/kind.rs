//! Token kind hierarchy.
//!
//! Kinds form a closed dotted hierarchy with fallback families: a consumer
//! that only cares about "some kind of comment" can test against the
//! `Comment` family instead of enumerating every sub-kind.
//!
//! # Examples
//!
//! ```
//! use relex::TokenKind;
//!
//! assert!(TokenKind::CommentSingle.is_a(TokenKind::Comment));
//! assert!(TokenKind::NameVariableInstance.is_a(TokenKind::Name));
//! assert_eq!(TokenKind::StringRegex.to_string(), "String.Regex");
//! ```

use std::fmt;

/// Token classification.
///
/// Family kinds (`Comment`, `Keyword`, `Name`, `String`, `Number`,
/// `Operator`) double as fallbacks: a rule may classify with the family when
/// no finer distinction is useful, and a consumer may match on the family to
/// catch every sub-kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    // Top-level
    Text,
    Whitespace,
    Error,
    Other,
    Punctuation,

    // Comment family
    Comment,
    CommentSingle,
    CommentMultiline,
    CommentHashbang,
    CommentPreproc,

    // Keyword family
    Keyword,
    KeywordConstant,
    KeywordDeclaration,
    KeywordReserved,

    // Name family
    Name,
    NameBuiltin,
    NameFunction,
    NameVariable,
    NameVariableInstance,
    NameOther,

    // String family
    String,
    StringSingle,
    StringDouble,
    StringBacktick,
    StringEscape,
    StringInterpol,
    StringRegex,

    // Number family
    Number,
    NumberInteger,
    NumberFloat,
    NumberHex,
    NumberOct,
    NumberBin,

    // Operator family
    Operator,
    OperatorWord,
}

impl TokenKind {
    /// One step up the hierarchy. Top-level kinds have no parent.
    pub fn parent(self) -> Option<TokenKind> {
        use TokenKind::*;
        Some(match self {
            CommentSingle | CommentMultiline | CommentHashbang | CommentPreproc => Comment,
            KeywordConstant | KeywordDeclaration | KeywordReserved => Keyword,
            NameBuiltin | NameFunction | NameVariable | NameOther => Name,
            NameVariableInstance => NameVariable,
            StringSingle | StringDouble | StringBacktick | StringEscape | StringInterpol
            | StringRegex => String,
            NumberInteger | NumberFloat | NumberHex | NumberOct | NumberBin => Number,
            OperatorWord => Operator,
            _ => return None,
        })
    }

    /// Whether `self` is `family` or a descendant of it.
    ///
    /// Reflexive and transitive: `NameVariableInstance.is_a(Name)` holds
    /// through `NameVariable`.
    pub fn is_a(self, family: TokenKind) -> bool {
        let mut kind = Some(self);
        while let Some(k) = kind {
            if k == family {
                return true;
            }
            kind = k.parent();
        }
        false
    }

    /// Dotted path name (`"Comment.Single"`).
    pub fn name(self) -> &'static str {
        use TokenKind::*;
        match self {
            Text => "Text",
            Whitespace => "Whitespace",
            Error => "Error",
            Other => "Other",
            Punctuation => "Punctuation",
            Comment => "Comment",
            CommentSingle => "Comment.Single",
            CommentMultiline => "Comment.Multiline",
            CommentHashbang => "Comment.Hashbang",
            CommentPreproc => "Comment.Preproc",
            Keyword => "Keyword",
            KeywordConstant => "Keyword.Constant",
            KeywordDeclaration => "Keyword.Declaration",
            KeywordReserved => "Keyword.Reserved",
            Name => "Name",
            NameBuiltin => "Name.Builtin",
            NameFunction => "Name.Function",
            NameVariable => "Name.Variable",
            NameVariableInstance => "Name.Variable.Instance",
            NameOther => "Name.Other",
            String => "String",
            StringSingle => "String.Single",
            StringDouble => "String.Double",
            StringBacktick => "String.Backtick",
            StringEscape => "String.Escape",
            StringInterpol => "String.Interpol",
            StringRegex => "String.Regex",
            Number => "Number",
            NumberInteger => "Number.Integer",
            NumberFloat => "Number.Float",
            NumberHex => "Number.Hex",
            NumberOct => "Number.Oct",
            NumberBin => "Number.Bin",
            Operator => "Operator",
            OperatorWord => "Operator.Word",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_is_its_own_family() {
        assert!(TokenKind::Comment.is_a(TokenKind::Comment));
    }

    #[test]
    fn test_sub_kind_matches_family() {
        assert!(TokenKind::CommentSingle.is_a(TokenKind::Comment));
        assert!(TokenKind::NumberHex.is_a(TokenKind::Number));
        assert!(TokenKind::StringBacktick.is_a(TokenKind::String));
    }

    #[test]
    fn test_two_level_ancestry() {
        assert!(TokenKind::NameVariableInstance.is_a(TokenKind::NameVariable));
        assert!(TokenKind::NameVariableInstance.is_a(TokenKind::Name));
    }

    #[test]
    fn test_unrelated_families_do_not_match() {
        assert!(!TokenKind::CommentSingle.is_a(TokenKind::String));
        assert!(!TokenKind::Name.is_a(TokenKind::NameVariable));
    }

    #[test]
    fn test_top_level_has_no_parent() {
        assert_eq!(TokenKind::Text.parent(), None);
        assert_eq!(TokenKind::Error.parent(), None);
    }

    #[test]
    fn test_display_is_dotted_path() {
        assert_eq!(TokenKind::KeywordDeclaration.to_string(), "Keyword.Declaration");
        assert_eq!(TokenKind::NameVariableInstance.to_string(), "Name.Variable.Instance");
        assert_eq!(TokenKind::Punctuation.to_string(), "Punctuation");
    }
}
