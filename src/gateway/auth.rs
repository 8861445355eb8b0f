//! Who may send feedback for a post.

use std::collections::HashSet;

/// Identity attached to an incoming request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    pub token: Option<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

/// Decides whether a caller may edit (and so give feedback on) a post.
pub trait PostAuthorizer: Send + Sync {
    fn can_edit(&self, caller: &Caller, post_id: u64) -> bool;
}

/// Every caller may edit every post. For hosts that authenticate upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PostAuthorizer for AllowAll {
    fn can_edit(&self, _caller: &Caller, _post_id: u64) -> bool {
        true
    }
}

/// Callers presenting one of a fixed set of editor tokens may edit any post.
///
/// An empty set authorizes nobody.
#[derive(Debug, Clone, Default)]
pub struct TokenAuthorizer {
    tokens: HashSet<String>,
}

impl TokenAuthorizer {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
        }
    }
}

impl PostAuthorizer for TokenAuthorizer {
    fn can_edit(&self, caller: &Caller, _post_id: u64) -> bool {
        caller
            .token
            .as_ref()
            .is_some_and(|token| self.tokens.contains(token))
    }
}
