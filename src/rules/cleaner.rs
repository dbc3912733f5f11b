use serde::Deserialize;

/// Named text transforms applied to raw price text
///
/// Every variant trims the input first. A cleaner that leaves nothing behind
/// yields `None`, and the price is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceCleaner {
    /// Trimmed text as-is
    #[default]
    Trim,

    /// First whitespace-separated token ("1,200 AED" -> "1,200")
    FirstToken,

    /// First token with thousands separators removed ("1,200 AED" -> "1200")
    FirstTokenStripCommas,

    /// Whole text with commas removed
    StripCommas,

    /// ASCII digits only ("AED 1,200 / day" -> "1200")
    DigitsOnly,

    /// Token at the given index, or the first token when there are fewer
    TokenAtIndex(usize),
}

impl PriceCleaner {
    /// Applies the transform to raw element text
    ///
    /// # Examples
    ///
    /// ```
    /// use rent_scout::PriceCleaner;
    ///
    /// let cleaner = PriceCleaner::FirstTokenStripCommas;
    /// assert_eq!(cleaner.clean(" 3,200 AED"), Some("3200".to_string()));
    /// assert_eq!(cleaner.clean("   "), None);
    /// ```
    pub fn clean(&self, raw: &str) -> Option<String> {
        let text = raw.trim();

        let cleaned = match self {
            Self::Trim => text.to_string(),
            Self::FirstToken => text.split_whitespace().next()?.to_string(),
            Self::FirstTokenStripCommas => text.split_whitespace().next()?.replace(',', ""),
            Self::StripCommas => text.replace(',', ""),
            Self::DigitsOnly => text.chars().filter(|c| c.is_ascii_digit()).collect(),
            Self::TokenAtIndex(index) => {
                let tokens: Vec<&str> = text.split_whitespace().collect();
                tokens.get(*index).or(tokens.first())?.to_string()
            }
        };

        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }
}
