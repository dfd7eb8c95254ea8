//! Error recovery for the parser.
//!
//! Provides token sets and synchronization for continuing parsing after errors.
//! Membership is a single bit test on a `u128`.

use luna_lexer::TokenKind;

use crate::cursor::Cursor;

/// A set of token kinds, one bit per `TokenKind` discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TokenSet(u128);

impl TokenSet {
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline]
    #[must_use]
    pub const fn with(self, kind: TokenKind) -> Self {
        Self(self.0 | (1u128 << kind as u8))
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(&self, kind: TokenKind) -> bool {
        (self.0 & (1u128 << kind as u8)) != 0
    }
}

/// Tokens that start a statement.
pub const STMT_START: TokenSet = TokenSet::new()
    .with(TokenKind::Local)
    .with(TokenKind::Function)
    .with(TokenKind::If)
    .with(TokenKind::While)
    .with(TokenKind::For)
    .with(TokenKind::Repeat)
    .with(TokenKind::Return)
    .with(TokenKind::Do)
    .with(TokenKind::Break)
    .with(TokenKind::Goto)
    .with(TokenKind::DoubleColon);

/// Tokens that close a block.
pub const BLOCK_END: TokenSet = TokenSet::new()
    .with(TokenKind::End)
    .with(TokenKind::Else)
    .with(TokenKind::Elseif)
    .with(TokenKind::Until)
    .with(TokenKind::Eof);

/// Where to resume after a broken statement.
pub const STMT_BOUNDARY: TokenSet = STMT_START.union(BLOCK_END);

/// Advance the cursor until reaching a token in the recovery set or EOF.
///
/// Returns the number of skipped tokens.
pub fn synchronize(cursor: &mut Cursor<'_>, recovery: TokenSet) -> usize {
    let mut skipped = 0;
    while !cursor.is_at_end() && !recovery.contains(cursor.current_kind()) {
        cursor.advance();
        skipped += 1;
    }
    skipped
}
