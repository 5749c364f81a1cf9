use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::config::ContactConfig;
use crate::dom::{FormValues, Page};
use crate::notify::{Notifier, Severity};
use crate::scheduler::{Scheduler, TaskOwner};

pub const CONTACT_FORM_ID: &str = "contactForm";
const SUBMIT_BUTTON_SELECTOR: &str = "button[type=\"submit\"]";

const REQUIRED_FIELDS: [&str; 3] = ["name", "email", "message"];
const SENDING_LABEL: &str = "Sending...";
const SENT_MESSAGE: &str = "Message sent! We'll be in touch soon.";

// What a browser's `\s` matches. The regex crate's `\s` adds U+0085 and
// drops U+FEFF.
const BROWSER_WHITESPACE: &str =
    r"\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}";

// local@domain.tld, no whitespace or '@' in either part
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let part = format!("[^{}@]+", BROWSER_WHITESPACE);
    Regex::new(&format!(r"^{part}@{part}\.{part}$", part = part)).expect("email pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid email format")]
    InvalidEmail,
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "Please fill in all fields.",
            ValidationError::InvalidEmail => "Please enter a valid email.",
        }
    }
}

/// A submission that passed the client-side checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Required fields first, then the email shape.
pub fn validate(values: &FormValues) -> Result<ContactMessage, ValidationError> {
    for field in REQUIRED_FIELDS {
        if values.filled(field).is_none() {
            return Err(ValidationError::MissingField(field));
        }
    }
    let field = |name| values.filled(name).unwrap_or_default().to_string();
    let email = field("email");
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(ContactMessage {
        name: field("name"),
        email,
        message: field("message"),
    })
}

/// The contact form. Sending is simulated: nothing leaves the page.
#[derive(Debug, Clone)]
pub struct ContactForm<N> {
    form: N,
    /// Submit button and its idle label, read once at resolve time.
    button: Option<(N, String)>,
    config: ContactConfig,
}

impl<N: Clone + 'static> ContactForm<N> {
    pub fn resolve<P: Page<Node = N>>(page: &P, config: ContactConfig) -> Option<Self> {
        let form = page.by_id(CONTACT_FORM_ID)?;
        let button = page.query_within(&form, SUBMIT_BUTTON_SELECTOR).map(|button| {
            let label = page.text(&button);
            (button, label)
        });
        Some(Self { form, button, config })
    }

    pub fn element(&self) -> &N {
        &self.form
    }

    pub fn submit<P, S>(
        &self,
        page: &P,
        scheduler: &S,
        notifier: &Notifier<P, S>,
    ) -> Result<ContactMessage, ValidationError>
    where
        P: Page<Node = N>,
        S: Scheduler,
    {
        let values = page.form_values(&self.form);
        let message = validate(&values).map_err(|err| {
            notifier.show(err.user_message(), Severity::Error);
            err
        })?;

        info!("Sending contact message from {}", message.email);
        if let Some((button, _)) = &self.button {
            page.set_text(button, SENDING_LABEL);
            page.set_disabled(button, true);
        }

        let page = page.clone();
        let form = self.form.clone();
        let button = self.button.clone();
        let notifier = notifier.clone();
        scheduler.after(TaskOwner::ContactForm, self.config.submit_latency_ms, move || {
            notifier.show(SENT_MESSAGE, Severity::Success);
            page.reset_form(&form);
            if let Some((button, label)) = button {
                page.set_text(&button, &label);
                page.set_disabled(&button, false);
            }
        });

        Ok(message)
    }
}
