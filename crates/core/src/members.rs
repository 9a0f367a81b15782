//! Members
//!
//! Donor records as the kiosk sees them: the registration form, the summary
//! shown in search results, and the masking applied before contact details
//! are put on a shared screen.

use crate::{
    ids::MemberId,
    validation::{ValidationError, ValidationErrors},
};

/// Minimum length of a phone number as typed.
pub const MIN_PHONE_LENGTH: usize = 8;

/// Placeholder shown when a member has no address on file.
pub const MISSING_ADDRESS: &str = "N/A";

/// Member gender as captured at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    /// Male
    #[default]
    Male,

    /// Female
    Female,
}

impl Gender {
    /// Lower-case wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostalAddress {
    /// Street line.
    pub address_line: String,

    /// City
    pub city: String,

    /// State or region.
    pub state: String,

    /// Country
    pub country: String,

    /// Postal code.
    pub zipcode: String,
}

impl PostalAddress {
    /// Whether every field is blank.
    pub fn is_blank(&self) -> bool {
        [
            &self.address_line,
            &self.city,
            &self.state,
            &self.country,
            &self.zipcode,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }

    /// Single-line rendering used in search results. Missing street lines
    /// read as `N/A`.
    pub fn one_line(&self) -> String {
        let line = if self.address_line.trim().is_empty() {
            MISSING_ADDRESS
        } else {
            self.address_line.as_str()
        };

        format!(
            "{line} {} {} {} {}",
            self.city, self.state, self.country, self.zipcode
        )
    }
}

/// The member registration form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewMember {
    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// Optional display name; derived from the names when blank.
    pub display_name: Option<String>,

    /// Gender
    pub gender: Gender,

    /// Personal email.
    pub email: String,

    /// Home phone as typed, possibly masked with separators.
    pub phone: String,

    /// Home address from autocomplete.
    pub address: PostalAddress,

    /// Apartment or suite, prefixed onto the street line.
    pub apt_or_suite: Option<String>,
}

impl NewMember {
    /// Check every required field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns every failing field when at least one check fails.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.first_name.trim().is_empty() {
            errors.push(ValidationError::MissingFirstName);
        }

        if self.last_name.trim().is_empty() {
            errors.push(ValidationError::MissingLastName);
        }

        if self.email.trim().is_empty() || !self.email.contains('@') {
            errors.push(ValidationError::InvalidEmail);
        }

        if self.phone.trim().is_empty() || self.phone.chars().count() < MIN_PHONE_LENGTH {
            errors.push(ValidationError::InvalidPhone);
        }

        errors.into_result()
    }

    /// The explicit display name, or `"<last> <first>"`.
    pub fn display_name(&self) -> String {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{} {}", self.last_name, self.first_name),
        }
    }

    /// The phone number with every non-digit removed.
    pub fn phone_digits(&self) -> String {
        self.phone.chars().filter(char::is_ascii_digit).collect()
    }

    /// The home address, with the apartment prefixed onto the street line.
    pub fn home_address(&self) -> PostalAddress {
        let address_line = match self.apt_or_suite.as_deref().map(str::trim) {
            Some(apt) if !apt.is_empty() => format!("{apt}, {}", self.address.address_line),
            _ => self.address.address_line.clone(),
        };

        PostalAddress {
            address_line,
            ..self.address.clone()
        }
    }
}

/// Which contact field matched a search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactMatch {
    /// Email matched.
    Email,

    /// Phone matched.
    Phone,
}

/// A member as listed in search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSummary {
    /// Backend id.
    pub id: MemberId,

    /// Display name.
    pub name: String,

    /// One-line address.
    pub address: String,

    /// First email on file, or empty.
    pub email: String,

    /// First phone on file, or empty.
    pub phone: String,
}

impl MemberSummary {
    /// Compare `term` against the email, then the phone, ignoring case and
    /// surrounding whitespace.
    pub fn contact_match(&self, term: &str) -> Option<ContactMatch> {
        let term = term.trim().to_lowercase();

        if term.is_empty() {
            return None;
        }

        if self.email.trim().to_lowercase() == term {
            Some(ContactMatch::Email)
        } else if self.phone.trim().to_lowercase() == term {
            Some(ContactMatch::Phone)
        } else {
            None
        }
    }
}

const MASK: &str = "• ";

/// Mask an email for display, keeping the first three and last two
/// characters of the mailbox and the first three of the domain.
pub fn mask_email(email: &str) -> String {
    if email.is_empty() {
        return MISSING_ADDRESS.to_string();
    }

    let (user, domain) = email.split_once('@').unwrap_or((email, ""));

    let user_chars: Vec<char> = user.chars().collect();

    let masked_user: String = if user_chars.len() <= 5 {
        user_chars.iter().take(3).collect()
    } else {
        let head: String = user_chars.iter().take(3).collect();
        let tail: String = user_chars.iter().skip(user_chars.len() - 2).collect();

        format!("{head}{}{tail}", MASK.repeat(user_chars.len() - 5))
    };

    let (domain_name, tld) = domain.split_once('.').unwrap_or((domain, ""));

    let domain_len = domain_name.chars().count();

    let masked_domain = if domain_len > 3 {
        let head: String = domain_name.chars().take(3).collect();

        format!("{head}{}", MASK.repeat(domain_len - 3))
    } else {
        domain_name.to_string()
    };

    if tld.is_empty() {
        format!("{masked_user}@{masked_domain}")
    } else {
        format!("{masked_user}@{masked_domain}.{tld}")
    }
}

/// Mask every run of digits in an address except the last, which is assumed
/// to be the postal code.
pub fn mask_address(address: &str) -> String {
    if address.is_empty() {
        return MISSING_ADDRESS.to_string();
    }

    let mut runs: Vec<(usize, usize)> = Vec::new();
    let mut start: Option<usize> = None;

    for (index, ch) in address.char_indices() {
        match (ch.is_ascii_digit(), start) {
            (true, None) => start = Some(index),
            (false, Some(run_start)) => {
                runs.push((run_start, index));
                start = None;
            }
            _ => {}
        }
    }

    if let Some(run_start) = start {
        runs.push((run_start, address.len()));
    }

    let Some((_zip, masked_runs)) = runs.split_last() else {
        return address.to_string();
    };

    let mut masked = String::with_capacity(address.len() * 2);

    for (index, ch) in address.char_indices() {
        if masked_runs
            .iter()
            .any(|&(run_start, run_end)| run_start <= index && index < run_end)
        {
            masked.push_str(MASK);
        } else {
            masked.push(ch);
        }
    }

    masked
}
