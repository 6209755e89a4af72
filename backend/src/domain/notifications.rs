//! Account emails and the frontend links they carry.

use url::Url;

use super::Email;

/// Rendered email ready for a [`Mailer`](super::ports::Mailer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: Email,
    pub subject: String,
    pub html: String,
}

impl OutboundEmail {
    /// Message carrying the email validation code.
    #[must_use]
    pub fn verification(to: Email, code: &str) -> Self {
        let html = format!(
            "<h1>Verify your account</h1>\
             <p>Thanks for signing up. Use the following code to verify your account:</p>\
             <h2 style=\"text-align: center;\">{code}</h2>\
             <p>If you did not request this, you can ignore this email.</p>",
            code = escape(code),
        );
        Self {
            to,
            subject: "Verify your account".to_owned(),
            html,
        }
    }

    /// Message carrying a password reset link.
    #[must_use]
    pub fn password_reset(to: Email, link: &str) -> Self {
        let html = format!(
            "<h1>Password reset</h1>\
             <p>You asked to reset your password. Follow the link below to choose a new one:</p>\
             <a href=\"{link}\">Reset password</a>\
             <p>If you did not request this change, you can ignore this email.</p>\
             <p>This link expires in 1 hour.</p>",
            link = escape(link),
        );
        Self {
            to,
            subject: "Password reset".to_owned(),
            html,
        }
    }

    /// Message inviting `to` to join the inviter's company.
    #[must_use]
    pub fn invitation(to: Email, link: &str, inviter: &Email) -> Self {
        let html = format!(
            "<h1>You have been invited</h1>\
             <p>{inviter} invited you to join their company.</p>\
             <p>Follow the link below to accept the invitation and set up your account:</p>\
             <a href=\"{link}\">Accept invitation</a>\
             <p>If you do not know this person, you can ignore this email.</p>",
            inviter = escape(inviter.as_ref()),
            link = escape(link),
        );
        Self {
            to,
            subject: "You have been invited".to_owned(),
            html,
        }
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Error raised when the configured frontend URL cannot host links.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrontendUrlError {
    #[error("frontend url is invalid: {0}")]
    Invalid(String),
    #[error("frontend url must be hierarchical (http or https)")]
    NotHierarchical,
}

/// Builds links into the frontend application.
///
/// # Examples
/// ```
/// use albaran::domain::FrontendLinks;
///
/// let links = FrontendLinks::new("https://app.example.com/").unwrap();
/// assert_eq!(
///     links.password_reset("abc123"),
///     "https://app.example.com/reset-password/abc123"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FrontendLinks {
    base: String,
    accept_invitation: Url,
}

impl FrontendLinks {
    /// Parse and validate the frontend base URL.
    pub fn new(base: &str) -> Result<Self, FrontendUrlError> {
        let parsed = Url::parse(base).map_err(|err| FrontendUrlError::Invalid(err.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(FrontendUrlError::NotHierarchical);
        }
        let base = parsed.as_str().trim_end_matches('/').to_owned();
        let accept_invitation = Url::parse(&format!("{base}/accept-invitation"))
            .map_err(|err| FrontendUrlError::Invalid(err.to_string()))?;
        Ok(Self {
            base,
            accept_invitation,
        })
    }

    /// `{base}/reset-password/{token}`.
    #[must_use]
    pub fn password_reset(&self, token: &str) -> String {
        format!("{}/reset-password/{token}", self.base)
    }

    /// `{base}/accept-invitation?email=..&code=..` with both values encoded.
    #[must_use]
    pub fn invitation(&self, email: &Email, code: &str) -> String {
        let mut url = self.accept_invitation.clone();
        url.query_pairs_mut()
            .append_pair("email", email.as_ref())
            .append_pair("code", code);
        url.into()
    }
}
