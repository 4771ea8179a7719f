use serde::{Deserialize, Serialize};

/// The acquisition channel through which a customer contact arrived.
///
/// The serialized form is the stable key (e.g. `GOOGLE_ADS`). Backups and persisted data only
/// ever use the key; the Polish display label returned by [`Source::label`] is for reports.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    Website,
    Facebook,
    Instagram,
    Linkedin,
    GoogleOrganic,
    GoogleAds,
    Allegro,
    Olx,
    Referral,
    Event,
    Mailing,
    /// The only category whose free-text note is meaningful.
    Other,
}

serde_plain::derive_display_from_serialize!(Source);
serde_plain::derive_fromstr_from_deserialize!(Source);

impl Source {
    /// Every category, in declaration order.
    pub const ALL: [Source; 12] = [
        Source::Website,
        Source::Facebook,
        Source::Instagram,
        Source::Linkedin,
        Source::GoogleOrganic,
        Source::GoogleAds,
        Source::Allegro,
        Source::Olx,
        Source::Referral,
        Source::Event,
        Source::Mailing,
        Source::Other,
    ];

    /// The stable key, e.g. `GOOGLE_ORGANIC`.
    pub fn key(&self) -> &'static str {
        match self {
            Source::Website => "WEBSITE",
            Source::Facebook => "FACEBOOK",
            Source::Instagram => "INSTAGRAM",
            Source::Linkedin => "LINKEDIN",
            Source::GoogleOrganic => "GOOGLE_ORGANIC",
            Source::GoogleAds => "GOOGLE_ADS",
            Source::Allegro => "ALLEGRO",
            Source::Olx => "OLX",
            Source::Referral => "REFERRAL",
            Source::Event => "EVENT",
            Source::Mailing => "MAILING",
            Source::Other => "OTHER",
        }
    }

    /// The display label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Source::Website => "Strona internetowa",
            Source::Facebook => "Facebook",
            Source::Instagram => "Instagram",
            Source::Linkedin => "LinkedIn",
            Source::GoogleOrganic => "Google (organiczne)",
            Source::GoogleAds => "Reklama Google Ads",
            Source::Allegro => "Allegro",
            Source::Olx => "OLX",
            Source::Referral => "Polecenie",
            Source::Event => "Wydarzenie / targi",
            Source::Mailing => "Mailing / newsletter",
            Source::Other => "Inne",
        }
    }

    /// Looks up a category by its exact stable key.
    pub fn from_key(key: &str) -> Option<Source> {
        Source::ALL.into_iter().find(|s| s.key() == key)
    }

    /// Looks up a category by key, ignoring case and accepting `-` in place of `_`. Intended for
    /// command line input such as `google-ads`.
    pub fn parse_loose(s: &str) -> Option<Source> {
        Source::from_key(&s.trim().to_uppercase().replace('-', "_"))
    }

    pub fn is_other(&self) -> bool {
        matches!(self, Source::Other)
    }
}
