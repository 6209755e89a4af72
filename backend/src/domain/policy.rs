//! Deployment-selectable account policies.

/// Whether a soft-deleted identity's email may be registered again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmailReusePolicy {
    /// Soft-deleted identities keep their email reserved.
    #[default]
    RejectDeleted,
    /// Soft-deleted identities are ignored by the uniqueness check.
    AllowAfterSoftDelete,
}

impl EmailReusePolicy {
    /// Whether soft-deleted rows take part in the uniqueness check.
    #[must_use]
    pub const fn counts_deleted(self) -> bool {
        matches!(self, Self::RejectDeleted)
    }
}

/// Whether protected routes require a validated email.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Unvalidated identities may only reach the validation route.
    #[default]
    RequireValidated,
    /// Any non-deleted identity passes the gate.
    AllowUnvalidated,
}
