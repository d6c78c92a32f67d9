use crate::{CalendarConfig, DateRange};

/// Hands a confirmed stay over to the booking platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingLink {
    listing_url: String,
}

impl BookingLink {
    /// Creates a link builder for a listing page.
    pub fn new(listing_url: impl Into<String>) -> Self {
        Self {
            listing_url: listing_url.into(),
        }
    }

    /// Uses the listing page of a parsed configuration.
    pub fn from_config(config: &CalendarConfig) -> Self {
        Self::new(config.listing_url.clone())
    }

    /// The listing page without preselected dates.
    pub fn listing(&self) -> &str {
        &self.listing_url
    }

    /// The listing page with the stay's dates as query parameters.
    pub fn for_range(&self, range: &DateRange) -> String {
        let separator = if self.listing_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{separator}check_in={}&check_out={}",
            self.listing_url,
            range.check_in(),
            range.check_out()
        )
    }
}

/// "1 night", "4 nights".
pub fn nights_label(nights: u32) -> String {
    if nights == 1 {
        "1 night".to_owned()
    } else {
        format!("{nights} nights")
    }
}
